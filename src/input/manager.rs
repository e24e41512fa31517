//! Reads CVs and staged job files from disk

use crate::error::{AnalyzerError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::storage::jobs::{parse_job_records, JobRecord};
use log::info;
use std::path::Path;

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Plain text of a CV. Empty documents are rejected.
    pub async fn read_cv(&self, path: &Path) -> Result<String> {
        ensure_exists(path)?;

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::JsonLines | FileType::Unknown => {
                return Err(AnalyzerError::UnsupportedFormat(format!(
                    "Unsupported CV format: {}",
                    path.display()
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(AnalyzerError::InvalidInput(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }
        Ok(text)
    }

    /// Job postings staged as JSON Lines.
    pub async fn read_job_records(&self, path: &Path) -> Result<Vec<JobRecord>> {
        ensure_exists(path)?;
        if FileType::from_path(path) != FileType::JsonLines {
            return Err(AnalyzerError::UnsupportedFormat(format!(
                "Job imports must be JSON Lines (.jsonl): {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let records = parse_job_records(&content);
        info!("Read {} job records from {}", records.len(), path.display());
        Ok(records)
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AnalyzerError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}

//! Plain text out of PDF, text and Markdown CVs

use crate::error::{AnalyzerError, Result};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;

static TAG_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"<[^>]*>"));

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            AnalyzerError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = fs::read_to_string(path).await?;
        markdown_to_text(&markdown)
    }
}

/// Render Markdown and strip the markup, keeping one non-empty line per block.
pub fn markdown_to_text(markdown: &str) -> Result<String> {
    let mut rendered = String::new();
    html::push_html(&mut rendered, Parser::new(markdown));

    let text = rendered
        .replace("<br />", "\n")
        .replace("</p>", "\n\n")
        .replace("</li>", "\n")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let tags = TAG_PATTERN.as_ref().map_err(|e| AnalyzerError::from(e.clone()))?;
    let stripped = tags.replace_all(&text, "").replace("&amp;", "&");

    let lines: Vec<&str> = stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_markup_removed() {
        let text = markdown_to_text("# Jane Doe\n\n- **Python** & SQL\n- Docker\n").unwrap();
        assert_eq!(text, "Jane Doe\nPython & SQL\nDocker");
    }

    #[test]
    fn test_markdown_conversion_is_repeatable() {
        let markdown = "## Experience\n\nBuilt <em>ETL</em> pipelines in `Airflow`\n";
        let first = markdown_to_text(markdown).unwrap();
        let second = markdown_to_text(markdown).unwrap();

        assert_eq!(first, "Experience\nBuilt ETL pipelines in Airflow");
        assert_eq!(first, second);
    }
}

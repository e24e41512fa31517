//! CLI interface for the job market analyzer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "job-market")]
#[command(about = "Job market skill analysis and CV gap matching")]
#[command(long_about = "Extract canonical skills from job postings, rank postings against a candidate's skills and analyze CVs against market demand")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: console, json
    #[arg(short, long, global = true)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the stored jobs with postings from a JSON Lines file
    Import {
        /// Path to the staged postings (.jsonl)
        file: PathBuf,
    },

    /// Extract skills from every stored job and rebuild the skill links
    Scan,

    /// Rank stored jobs against a set of skills
    Match {
        /// Candidate skills, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        skills: Vec<String>,

        /// Candidate experience level (e.g. "3-4 years")
        #[arg(short, long)]
        level: String,

        /// Minimum match ratio between 0 and 1
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Maximum number of jobs returned
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Guess the professional profile of a CV without calling the service
    Detect {
        /// Path to the CV (PDF, TXT, MD)
        cv: PathBuf,
    },

    /// Full CV analysis: classification, market gaps, matching jobs and advice
    Analyze {
        /// Path to the CV (PDF, TXT, MD)
        cv: PathBuf,
    },

    /// Skill popularity and experience level distribution
    Dashboard {
        /// Number of skills to show
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &std::path::Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed_extensions.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            allowed_extensions.join(", ")
        )),
        None => Err("File has no extension".to_string()),
    }
}

//! Configuration management for the job market analyzer

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub vocabulary: VocabularyConfig,
    pub scanning: ScanningConfig,
    pub matching: MatchingConfig,
    pub service: ServiceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub skill_keywords_path: PathBuf,
    pub profile_config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanningConfig {
    /// Upper bound on concurrently running extraction tasks
    pub max_workers: usize,
    /// Log a progress line every N completed documents
    pub progress_interval: usize,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub threshold: f64,
    pub limit: usize,
    /// Subtracted from the overlap ratio of jobs at an adjacent level
    pub cross_level_penalty: f64,
    pub market_skill_count: usize,
    pub max_gaps: usize,
    /// Target levels used when the candidate's level is unknown
    pub fallback_levels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from("data").join("jobs.db"),
            },
            vocabulary: VocabularyConfig {
                skill_keywords_path: PathBuf::from("config").join("skill_keywords.json"),
                profile_config_path: PathBuf::from("config").join("profile_config.json"),
            },
            scanning: ScanningConfig {
                max_workers: 10,
                progress_interval: 20,
                show_progress: true,
            },
            matching: MatchingConfig {
                threshold: 0.5,
                limit: 30,
                cross_level_penalty: 0.25,
                market_skill_count: 20,
                max_gaps: 10,
                fallback_levels: vec!["3-4 years".to_string(), "5-6 years".to_string()],
            },
            service: ServiceConfig {
                endpoint: "http://localhost:8080".to_string(),
                api_key_env: "CLASSIFIER_API_KEY".to_string(),
                timeout_secs: 60,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the configuration at `config_path`, writing defaults on first run
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| AnalyzerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AnalyzerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-market-analyzer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.scanning.max_workers == 0 {
            return Err(AnalyzerError::Configuration(
                "scanning.max_workers must be at least 1".to_string(),
            ));
        }
        if self.matching.limit == 0 {
            return Err(AnalyzerError::Configuration(
                "matching.limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matching.cross_level_penalty) {
            return Err(AnalyzerError::Configuration(format!(
                "matching.cross_level_penalty must be within [0, 1], got {}",
                self.matching.cross_level_penalty
            )));
        }
        Ok(())
    }

    /// Bearer token for the classification service, if the variable is set
    pub fn service_api_key(&self) -> Option<String> {
        std::env::var(&self.service.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

//! Canonical profiles and the experience level hierarchy

use crate::error::{AnalyzerError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const NON_TECH_PROFILE: &str = "Not a Tech Profile";
pub const UNKNOWN_TECH_PROFILE: &str = "Unknown Tech Profile";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub profiles: Vec<String>,
    /// Canonical level -> levels accepted as matches for it
    #[serde(default)]
    pub level_hierarchy: BTreeMap<String, Vec<String>>,
}

impl ProfileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::Configuration(format!(
                "Missing profile configuration: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;

        info!(
            "Loaded {} canonical profiles and {} hierarchy levels from {}",
            config.profiles.len(),
            config.level_hierarchy.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: ProfileConfig = serde_json::from_str(content).map_err(|e| {
            AnalyzerError::Configuration(format!("Corrupt profile configuration: {}", e))
        })?;

        if config.level_hierarchy.is_empty() {
            warn!("Profile configuration has no level hierarchy; matching will use the primary level only");
        }
        Ok(config)
    }

    pub fn canonical_levels(&self) -> Vec<String> {
        self.level_hierarchy.keys().cloned().collect()
    }

    /// Levels accepted for a candidate at `level`, or `[level]` when the
    /// hierarchy has no entry for it.
    pub fn target_levels(&self, level: &str) -> Vec<String> {
        match self.level_hierarchy.get(level) {
            Some(levels) if !levels.is_empty() => levels.clone(),
            _ => vec![level.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "profiles": ["Data Engineer", "Not a Tech Profile"],
        "level_hierarchy": {"Junior": ["Junior", "Mid"], "Mid": ["Junior", "Mid", "Senior"]}
    }"#;

    #[test]
    fn test_target_levels_from_hierarchy() {
        let config = ProfileConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.target_levels("Junior"), vec!["Junior", "Mid"]);
        assert_eq!(config.canonical_levels(), vec!["Junior", "Mid"]);
    }

    #[test]
    fn test_unknown_level_targets_itself() {
        let config = ProfileConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.target_levels("Principal"), vec!["Principal"]);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let config = ProfileConfig::from_json_str("{}").unwrap();
        assert!(config.profiles.is_empty());
        assert!(config.level_hierarchy.is_empty());
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        assert!(matches!(
            ProfileConfig::from_json_str("{\"profiles\": 3}"),
            Err(AnalyzerError::Configuration(_))
        ));
    }
}

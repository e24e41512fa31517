//! Skill keyword dictionary: canonical skill name -> synonym entries

use crate::error::{AnalyzerError, Result};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Key under which non-technical indicator phrases are stored
pub const NON_TECH_KEY: &str = "not a tech profile";

#[derive(Debug, Clone, Default)]
pub struct SkillDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl SkillDictionary {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::Configuration(format!(
                "Missing skill dictionary: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let dictionary = Self::from_json_str(&content).map_err(|e| match e {
            AnalyzerError::Configuration(msg) => {
                AnalyzerError::Configuration(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        info!(
            "Loaded skill dictionary with {} canonical entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Parse a dictionary document. Non-string synonym entries are skipped.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            AnalyzerError::Configuration(format!("Corrupt skill dictionary: {}", e))
        })?;

        let object = value.as_object().ok_or_else(|| {
            AnalyzerError::Configuration("Skill dictionary must be a JSON object".to_string())
        })?;

        let mut entries = BTreeMap::new();
        for (canonical, synonyms) in object {
            let list = synonyms.as_array().ok_or_else(|| {
                AnalyzerError::Configuration(format!(
                    "Synonyms for '{}' must be a JSON array",
                    canonical
                ))
            })?;

            let mut raw = Vec::with_capacity(list.len());
            for item in list {
                match item.as_str() {
                    Some(s) => raw.push(s.to_string()),
                    None => warn!("Skipping non-string synonym {} for '{}'", item, canonical),
                }
            }
            entries.insert(canonical.clone(), raw);
        }

        if entries.is_empty() {
            return Err(AnalyzerError::Configuration(
                "Skill dictionary is empty".to_string(),
            ));
        }

        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    pub fn synonyms(&self, canonical: &str) -> &[String] {
        self.entries
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn canonical_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_non_string_entries() {
        let dict = SkillDictionary::from_json_str(r#"{"python": ["python", 3, null, "py"]}"#).unwrap();
        assert_eq!(dict.synonyms("python"), &["python".to_string(), "py".to_string()]);
    }

    #[test]
    fn test_non_object_document_rejected() {
        let err = SkillDictionary::from_json_str(r#"["python"]"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::Configuration(_)));
    }

    #[test]
    fn test_non_array_synonyms_rejected() {
        let err = SkillDictionary::from_json_str(r#"{"python": "python"}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::Configuration(_)));
    }

    #[test]
    fn test_corrupt_json_rejected() {
        assert!(SkillDictionary::from_json_str("{not json").is_err());
        assert!(SkillDictionary::from_json_str("{}").is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = SkillDictionary::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, AnalyzerError::Configuration(_)));
    }

    #[test]
    fn test_unknown_canonical_has_no_synonyms() {
        let dict = SkillDictionary::from_entries(vec![("docker", vec!["docker"])]);
        assert!(dict.synonyms("kubernetes").is_empty());
        assert_eq!(dict.canonical_names(), vec!["docker".to_string()]);
    }
}

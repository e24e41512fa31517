//! Per-document skill extraction

use crate::error::Result;
use crate::extraction::engine::SkillEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A job description queued for scanning. Text may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobDocument {
    #[sqlx(rename = "job_id")]
    pub id: i64,
    #[sqlx(rename = "description")]
    pub text: Option<String>,
}

impl JobDocument {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: Some(text.into()),
        }
    }
}

/// Anything that can turn one document into a set of canonical skills.
pub trait SkillScanner: Send + Sync {
    fn scan(&self, document: &JobDocument) -> Result<BTreeSet<String>>;
}

#[derive(Debug, Clone)]
pub struct SkillExtractor {
    engine: Arc<SkillEngine>,
}

impl SkillExtractor {
    pub fn new(engine: Arc<SkillEngine>) -> Self {
        Self { engine }
    }

    pub fn extract(&self, document_id: i64, text: Option<&str>) -> (i64, BTreeSet<String>) {
        let skills = match text {
            Some(text) => self.engine.scan(text),
            None => BTreeSet::new(),
        };
        (document_id, skills)
    }
}

impl SkillScanner for SkillExtractor {
    fn scan(&self, document: &JobDocument) -> Result<BTreeSet<String>> {
        Ok(self.extract(document.id, document.text.as_deref()).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::SkillDictionary;

    fn extractor() -> SkillExtractor {
        let dict = SkillDictionary::from_entries(vec![
            ("python", vec!["python", "py"]),
            ("sql", vec!["sql", "postgresql"]),
        ]);
        SkillExtractor::new(Arc::new(SkillEngine::build(&dict).unwrap()))
    }

    #[test]
    fn test_empty_and_absent_text() {
        let extractor = extractor();
        assert_eq!(extractor.extract(7, Some("")), (7, BTreeSet::new()));
        assert_eq!(extractor.extract(8, None), (8, BTreeSet::new()));
    }

    #[test]
    fn test_extract_is_idempotent_subset_of_vocabulary() {
        let extractor = extractor();
        let text = "Python services on PostgreSQL, some Go";
        let (_, first) = extractor.extract(1, Some(text));
        let (_, second) = extractor.extract(1, Some(text));
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s == "python" || s == "sql"));
        assert_eq!(first.len(), 2);
    }
}

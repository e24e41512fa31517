//! Full extraction run: fetch jobs, scan in parallel, replace skill links

use crate::config::ScanningConfig;
use crate::error::Result;
use crate::extraction::extractor::{SkillExtractor, SkillScanner};
use crate::extraction::orchestrator::ScanOrchestrator;
use crate::storage::jobs::{JobRepository, LinkReplacement};
use crate::vocabulary::VocabularyStore;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub total_documents: usize,
    pub processed: usize,
    pub failed: usize,
    pub links_saved: usize,
    /// False when nothing was written (no documents, empty results or a storage failure)
    pub saved: bool,
    pub elapsed: Duration,
}

pub struct SkillProcessor {
    repository: JobRepository,
    orchestrator: ScanOrchestrator,
}

impl SkillProcessor {
    pub fn new(repository: JobRepository, vocabulary: &VocabularyStore, config: &ScanningConfig) -> Self {
        let extractor = SkillExtractor::new(vocabulary.current().engine());
        Self::with_scanner(repository, Arc::new(extractor), config)
    }

    pub fn with_scanner(
        repository: JobRepository,
        scanner: Arc<dyn SkillScanner>,
        config: &ScanningConfig,
    ) -> Self {
        Self {
            repository,
            orchestrator: ScanOrchestrator::new(scanner, config),
        }
    }

    /// A storage failure while saving is reported through `saved = false`;
    /// failing to read the jobs at all is an error.
    pub async fn run(&self) -> Result<ScanSummary> {
        info!("Starting skill processing...");
        let start = Instant::now();

        let documents = self.repository.fetch_documents().await?;
        if documents.is_empty() {
            info!("No jobs found in the database, nothing to process");
            return Ok(ScanSummary::default());
        }

        let total_documents = documents.len();
        let outcome = self.orchestrator.scan(documents).await;

        info!("Saving results to the database...");
        let (saved, links_saved) = match self.repository.replace_skill_links(&outcome.results).await {
            Ok(LinkReplacement::Replaced { links, .. }) => (true, links),
            Ok(LinkReplacement::NothingToSave) => (false, 0),
            Err(e) => {
                error!("Saving processed skills failed, previous links kept: {}", e);
                (false, 0)
            }
        };

        let summary = ScanSummary {
            total_documents,
            processed: outcome.results.len(),
            failed: outcome.failed.len(),
            links_saved,
            saved,
            elapsed: start.elapsed(),
        };

        if summary.saved {
            info!(
                "Skill processing finished: {} jobs, {} links in {:.2}s",
                summary.processed,
                summary.links_saved,
                summary.elapsed.as_secs_f64()
            );
        } else {
            warn!(
                "Skill processing finished without saving after {:.2}s",
                summary.elapsed.as_secs_f64()
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use crate::vocabulary::{ProfileConfig, SkillDictionary, Vocabulary};

    fn scanning() -> ScanningConfig {
        ScanningConfig {
            max_workers: 4,
            progress_interval: 20,
            show_progress: false,
        }
    }

    fn vocabulary() -> VocabularyStore {
        let dict = SkillDictionary::from_entries(vec![
            ("python", vec!["python"]),
            ("aws", vec!["aws", "amazon web services"]),
        ]);
        VocabularyStore::fixed(Vocabulary::new(dict, ProfileConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_run_links_detected_skills() {
        let db = Database::in_memory().await.unwrap();
        for (id, text) in [(1, "Python on AWS"), (2, "Amazon Web Services only"), (3, "Nothing relevant")] {
            sqlx::query("INSERT INTO jobs (job_id, description) VALUES (?, ?)")
                .bind(id)
                .bind(text)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let repository = JobRepository::new(db.pool().clone());
        let processor = SkillProcessor::new(repository.clone(), &vocabulary(), &scanning());
        let summary = processor.run().await.unwrap();

        assert!(summary.saved);
        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.links_saved, 3);
        assert_eq!(repository.skills_for_job(1).await.unwrap(), vec!["aws", "python"]);
        assert_eq!(repository.skills_for_job(2).await.unwrap(), vec!["aws"]);
    }

    #[tokio::test]
    async fn test_run_without_jobs_saves_nothing() {
        let db = Database::in_memory().await.unwrap();
        let processor = SkillProcessor::new(JobRepository::new(db.pool().clone()), &vocabulary(), &scanning());
        let summary = processor.run().await.unwrap();
        assert!(!summary.saved);
        assert_eq!(summary.total_documents, 0);
    }
}

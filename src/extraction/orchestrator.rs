//! Bounded parallel scan over a batch of job documents

use crate::config::ScanningConfig;
use crate::error::AnalyzerError;
use crate::extraction::extractor::{JobDocument, SkillScanner};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Skills per document for every document that scanned cleanly.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub results: HashMap<i64, BTreeSet<String>>,
    pub failed: Vec<i64>,
    pub elapsed: Duration,
}

pub struct ScanOrchestrator {
    scanner: Arc<dyn SkillScanner>,
    max_workers: usize,
    progress_interval: usize,
    show_progress: bool,
}

impl ScanOrchestrator {
    pub fn new(scanner: Arc<dyn SkillScanner>, config: &ScanningConfig) -> Self {
        Self {
            scanner,
            max_workers: config.max_workers.max(1),
            progress_interval: config.progress_interval.max(1),
            show_progress: config.show_progress,
        }
    }

    /// Scan every document on the blocking pool with at most `max_workers`
    /// in flight. Results are gathered in completion order. A document whose
    /// scan errors or panics is logged and left out of the results.
    pub async fn scan(&self, documents: Vec<JobDocument>) -> ScanOutcome {
        let start = Instant::now();
        let total = documents.len();
        if total == 0 {
            return ScanOutcome::default();
        }

        info!(
            "Scanning {} job descriptions using {} workers...",
            total, self.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for document in documents {
            let semaphore = Arc::clone(&semaphore);
            let scanner = Arc::clone(&self.scanner);

            tasks.spawn(async move {
                let document_id = document.id;
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (
                            document_id,
                            Err(AnalyzerError::Extraction {
                                document_id,
                                reason: e.to_string(),
                            }),
                        )
                    }
                };

                let joined =
                    tokio::task::spawn_blocking(move || scanner.scan(&document)).await;

                let result = match joined {
                    Ok(result) => result,
                    Err(join_error) => Err(AnalyzerError::Extraction {
                        document_id,
                        reason: join_error.to_string(),
                    }),
                };
                (document_id, result)
            });
        }

        let progress = self.progress_bar(total);
        let mut outcome = ScanOutcome::default();
        let mut completed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((document_id, Ok(skills))) => {
                    outcome.results.insert(document_id, skills);
                }
                Ok((document_id, Err(e))) => {
                    error!("Error processing job {}: {}", document_id, e);
                    outcome.failed.push(document_id);
                }
                Err(e) => {
                    error!("Scan task did not complete: {}", e);
                }
            }

            completed += 1;
            progress.inc(1);
            if completed % self.progress_interval == 0 || completed == total {
                info!("    ...Processing: {}/{} completed.", completed, total);
            }
        }

        progress.finish_and_clear();
        outcome.failed.sort_unstable();
        outcome.elapsed = start.elapsed();

        info!(
            "Text scanning complete in {:.2} seconds ({} ok, {} failed)",
            outcome.elapsed.as_secs_f64(),
            outcome.results.len(),
            outcome.failed.len()
        );
        outcome
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::engine::SkillEngine;
    use crate::extraction::extractor::SkillExtractor;
    use crate::vocabulary::SkillDictionary;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(max_workers: usize) -> ScanningConfig {
        ScanningConfig {
            max_workers,
            progress_interval: 20,
            show_progress: false,
        }
    }

    fn extractor() -> Arc<dyn SkillScanner> {
        let dict = SkillDictionary::from_entries(vec![
            ("python", vec!["python"]),
            ("docker", vec!["docker"]),
        ]);
        Arc::new(SkillExtractor::new(Arc::new(SkillEngine::build(&dict).unwrap())))
    }

    struct FailingScanner {
        inner: Arc<dyn SkillScanner>,
        fail_on: i64,
        panic_on: Option<i64>,
    }

    impl SkillScanner for FailingScanner {
        fn scan(&self, document: &JobDocument) -> crate::error::Result<BTreeSet<String>> {
            if Some(document.id) == self.panic_on {
                panic!("scanner blew up");
            }
            if document.id == self.fail_on {
                return Err(AnalyzerError::Extraction {
                    document_id: document.id,
                    reason: "bad document".to_string(),
                });
            }
            self.inner.scan(document)
        }
    }

    struct ConcurrencyProbe {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SkillScanner for ConcurrencyProbe {
        fn scan(&self, _document: &JobDocument) -> crate::error::Result<BTreeSet<String>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(BTreeSet::new())
        }
    }

    fn documents(n: i64) -> Vec<JobDocument> {
        (1..=n)
            .map(|id| JobDocument::new(id, if id % 2 == 0 { "python and docker" } else { "python" }))
            .collect()
    }

    #[tokio::test]
    async fn test_scan_covers_every_document() {
        let orchestrator = ScanOrchestrator::new(extractor(), &config(4));
        let outcome = orchestrator.scan(documents(50)).await;

        assert_eq!(outcome.results.len(), 50);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.results[&2].len(), 2);
        assert_eq!(outcome.results[&3].len(), 1);
    }

    #[tokio::test]
    async fn test_single_failure_is_skipped() {
        let scanner = Arc::new(FailingScanner {
            inner: extractor(),
            fail_on: 3,
            panic_on: None,
        });
        let orchestrator = ScanOrchestrator::new(scanner, &config(10));
        let outcome = orchestrator.scan(documents(10)).await;

        assert_eq!(outcome.results.len(), 9);
        assert!(!outcome.results.contains_key(&3));
        assert_eq!(outcome.failed, vec![3]);
    }

    #[tokio::test]
    async fn test_panicking_document_is_skipped() {
        let scanner = Arc::new(FailingScanner {
            inner: extractor(),
            fail_on: -1,
            panic_on: Some(5),
        });
        let orchestrator = ScanOrchestrator::new(scanner, &config(3));
        let outcome = orchestrator.scan(documents(8)).await;

        assert_eq!(outcome.results.len(), 7);
        assert_eq!(outcome.failed, vec![5]);
    }

    #[tokio::test]
    async fn test_worker_bound_respected() {
        let probe = Arc::new(ConcurrencyProbe {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let orchestrator = ScanOrchestrator::new(probe.clone(), &config(2));
        let outcome = orchestrator.scan(documents(12)).await;

        assert_eq!(outcome.results.len(), 12);
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_rescan_is_deterministic() {
        let orchestrator = ScanOrchestrator::new(extractor(), &config(10));
        let first = orchestrator.scan(documents(30)).await;
        let second = orchestrator.scan(documents(30)).await;
        assert_eq!(first.results, second.results);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let orchestrator = ScanOrchestrator::new(extractor(), &config(10));
        let outcome = orchestrator.scan(Vec::new()).await;
        assert!(outcome.results.is_empty());
        assert!(outcome.failed.is_empty());
    }
}

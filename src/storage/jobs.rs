//! Job rows and their skill associations

use crate::error::Result;
use crate::extraction::extractor::JobDocument;
use crate::storage::lookup::{get_or_create_id, LookupCache, LookupTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};

/// One scraped posting as staged for import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkReplacement {
    /// Previous links were cleared and these were written.
    Replaced { jobs: usize, links: usize },
    /// Nothing was handed over; existing links were left alone.
    NothingToSave,
}

impl LinkReplacement {
    pub fn is_saved(&self) -> bool {
        matches!(self, LinkReplacement::Replaced { .. })
    }
}

#[derive(Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every stored job with its description, ordered by id.
    pub async fn fetch_documents(&self) -> Result<Vec<JobDocument>> {
        let documents: Vec<JobDocument> =
            sqlx::query_as("SELECT job_id, description FROM jobs ORDER BY job_id")
                .fetch_all(&self.pool)
                .await?;
        info!("Found {} jobs to process for skills", documents.len());
        Ok(documents)
    }

    /// Swap the whole job_skills table for the links implied by `mapping`
    /// inside one transaction. Any storage error rolls everything back.
    pub async fn replace_skill_links(
        &self,
        mapping: &HashMap<i64, BTreeSet<String>>,
    ) -> Result<LinkReplacement> {
        if mapping.is_empty() {
            warn!("No processed skills received to save");
            return Ok(LinkReplacement::NothingToSave);
        }

        info!("Saving processed skills for {} jobs...", mapping.len());
        let mut tx = self.pool.begin().await?;
        let mut cache = LookupCache::new();

        sqlx::query("DELETE FROM job_skills").execute(&mut *tx).await?;

        let mut job_ids: Vec<&i64> = mapping.keys().collect();
        job_ids.sort_unstable();

        let mut pairs = BTreeSet::new();
        for job_id in job_ids {
            for skill in &mapping[job_id] {
                if let Some(skill_id) =
                    get_or_create_id(&mut tx, LookupTable::Skills, skill, &mut cache).await?
                {
                    pairs.insert((*job_id, skill_id));
                }
            }
        }

        let mut links = 0usize;
        for (job_id, skill_id) in &pairs {
            let result = sqlx::query("INSERT OR IGNORE INTO job_skills (job_id, skill_id) VALUES (?, ?)")
                .bind(job_id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await?;
            links += result.rows_affected() as usize;
        }

        tx.commit().await?;
        debug!("Resolved {} distinct skills", cache.len());

        let jobs = mapping.values().filter(|skills| !skills.is_empty()).count();
        info!("Saved {} skill links across {} jobs", links, jobs);
        Ok(LinkReplacement::Replaced { jobs, links })
    }

    /// Replace every job with `records`. Skill and location links for the
    /// old jobs go with them and id sequences restart.
    pub async fn replace_jobs(&self, records: &[JobRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut cache = LookupCache::new();

        info!("Clearing old data (jobs, job_skills, job_locations)...");
        sqlx::query("DELETE FROM job_skills").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM job_locations").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM jobs").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name IN ('jobs', 'job_skills', 'job_locations')")
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0usize;
        for record in records {
            let company_id = match record.company.as_deref() {
                Some(company) => {
                    get_or_create_id(&mut tx, LookupTable::Companies, company, &mut cache).await?
                }
                None => None,
            };
            let level_id = match record.experience.as_deref() {
                Some(level) => {
                    get_or_create_id(&mut tx, LookupTable::ExperienceLevels, level, &mut cache)
                        .await?
                }
                None => None,
            };

            let job_id = sqlx::query(
                "INSERT INTO jobs (title, description, link, company_id, level_id) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.link)
            .bind(company_id)
            .bind(level_id)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
            inserted += 1;

            for location in &record.locations {
                if let Some(location_id) =
                    get_or_create_id(&mut tx, LookupTable::Locations, location, &mut cache).await?
                {
                    sqlx::query("INSERT OR IGNORE INTO job_locations (job_id, location_id) VALUES (?, ?)")
                        .bind(job_id)
                        .bind(location_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        info!("Raw data load complete: inserted {} jobs", inserted);
        Ok(inserted)
    }

    pub async fn job_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Canonical skill names linked to one job, sorted.
    pub async fn skills_for_job(&self, job_id: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT s.skill_name FROM job_skills js \
             JOIN skills s ON s.skill_id = js.skill_id \
             WHERE js.job_id = ? ORDER BY s.skill_name",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

/// Parse staged JSON Lines. Malformed lines are logged and skipped.
pub fn parse_job_records(content: &str) -> Vec<JobRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str::<JobRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                let preview: String = line.chars().take(50).collect();
                warn!("Skipping malformed job record on line {}: {} ({}...)", index + 1, e, preview);
                None
            }
        })
        .collect()
}

//! Aggregate market statistics over the stored job corpus

use crate::error::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkillCount {
    #[sqlx(rename = "skill_name")]
    pub skill: String,
    pub job_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkillShare {
    pub skill: String,
    pub job_count: i64,
    /// Share of all stored jobs, rounded to one decimal place
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LevelCount {
    pub name: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct MarketQueries {
    pool: SqlitePool,
}

impl MarketQueries {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Skills ordered by the number of jobs requiring them.
    pub async fn popular_skills(&self, top_n: usize) -> Result<Vec<SkillCount>> {
        let rows: Vec<SkillCount> = sqlx::query_as(
            r#"
            SELECT s.skill_name, COUNT(js.job_id) AS job_count
            FROM skills AS s
            JOIN job_skills AS js ON s.skill_id = js.skill_id
            GROUP BY s.skill_name
            ORDER BY job_count DESC, s.skill_name
            LIMIT ?
            "#,
        )
        .bind(top_n as i64)
        .fetch_all(&self.pool)
        .await?;

        info!("Fetched {} popular skills", rows.len());
        Ok(rows)
    }

    pub async fn skill_popularity(&self, top_n: usize) -> Result<Vec<SkillShare>> {
        let rows: Vec<SkillShare> = sqlx::query_as(
            r#"
            WITH total_jobs AS (
                SELECT COUNT(*) AS total_count FROM jobs
            )
            SELECT
                s.skill_name AS skill,
                COUNT(js.job_id) AS job_count,
                ROUND((COUNT(js.job_id) * 100.0 / tj.total_count), 1) AS percentage
            FROM skills AS s
            JOIN job_skills AS js ON s.skill_id = js.skill_id
            CROSS JOIN total_jobs AS tj
            GROUP BY s.skill_name, tj.total_count
            ORDER BY job_count DESC, s.skill_name
            LIMIT ?
            "#,
        )
        .bind(top_n as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} skills with percentages", rows.len());
        Ok(rows)
    }

    pub async fn experience_level_distribution(&self) -> Result<Vec<LevelCount>> {
        let rows: Vec<LevelCount> = sqlx::query_as(
            r#"
            SELECT el.level_name AS name, COUNT(j.job_id) AS count
            FROM jobs AS j
            JOIN experience_levels AS el ON j.level_id = el.level_id
            GROUP BY el.level_name
            ORDER BY count DESC, el.level_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched experience level distribution: {:?}", rows);
        Ok(rows)
    }

    /// Most requested skills among jobs whose title fits `profile`: first
    /// the whole profile name inside the title, then any single word of it.
    pub async fn popular_skills_for_profile(&self, profile: &str, top_n: usize) -> Result<Vec<String>> {
        let profile = profile.trim();
        if profile.is_empty() {
            return Ok(Vec::new());
        }

        let whole_name = vec![format!("%{}%", profile.to_lowercase())];
        let rows = self.skills_by_title_patterns(&whole_name, top_n).await?;
        if !rows.is_empty() {
            info!("Found {} skills for profile '{}' (by title)", rows.len(), profile);
            return Ok(rows);
        }

        let keywords: Vec<String> = profile
            .to_lowercase()
            .split_whitespace()
            .map(|word| format!("%{}%", word))
            .collect();
        let rows = self.skills_by_title_patterns(&keywords, top_n).await?;
        if !rows.is_empty() {
            info!("Found {} skills for profile '{}' (by keywords)", rows.len(), profile);
            return Ok(rows);
        }

        warn!("No skills found at all for profile '{}'", profile);
        Ok(Vec::new())
    }

    async fn skills_by_title_patterns(&self, patterns: &[String], top_n: usize) -> Result<Vec<String>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT s.skill_name, COUNT(js.job_id) AS job_count \
             FROM skills s \
             JOIN job_skills js ON s.skill_id = js.skill_id \
             JOIN jobs j ON js.job_id = j.job_id \
             WHERE ",
        );

        {
            let mut clauses = query.separated(" OR ");
            for pattern in patterns {
                clauses.push("LOWER(j.title) LIKE ");
                clauses.push_bind_unseparated(pattern.clone());
            }
        }

        query.push(" GROUP BY s.skill_name ORDER BY job_count DESC, s.skill_name LIMIT ");
        query.push_bind(top_n as i64);

        let rows: Vec<SkillCount> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.skill).collect())
    }
}

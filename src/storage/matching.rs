//! Skill-overlap ranking of stored jobs against a candidate's skills

use crate::error::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub skills: Vec<String>,
    pub target_levels: Vec<String>,
    pub primary_level: String,
    pub threshold: f64,
    pub limit: usize,
    /// Subtracted from the ratio of jobs outside the primary level
    pub cross_level_penalty: f64,
}

impl MatchQuery {
    pub fn new(skills: Vec<String>, target_levels: Vec<String>, primary_level: impl Into<String>) -> Self {
        Self {
            skills,
            target_levels,
            primary_level: primary_level.into(),
            threshold: 0.0,
            limit: 30,
            cross_level_penalty: 0.25,
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn cross_level_penalty(mut self, penalty: f64) -> Self {
        self.cross_level_penalty = penalty;
        self
    }
}

/// Per-job overlap counts for jobs at one of the target levels.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct JobMatchStats {
    pub job_id: i64,
    pub title: Option<String>,
    pub link: Option<String>,
    pub level_id: i64,
    pub level_name: String,
    pub company_name: Option<String>,
    pub total_required: i64,
    pub matched: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: i64,
    pub title: Option<String>,
    pub link: Option<String>,
    pub level: String,
    pub company: Option<String>,
    /// Final ratio scaled to a percentage, truncated toward zero
    pub match_percentage: i64,
    #[serde(skip)]
    pub ratio: f64,
}

/// Rank jobs by the share of their required skills the candidate holds.
/// Unresolvable input is an empty answer, not an error.
///
/// The primary level is resolved on its own and need not be one of the
/// target levels. Only jobs at a target level are ranked, and any of those
/// not at the primary level take the cross-level penalty.
pub async fn find_matching_jobs(pool: &SqlitePool, query: &MatchQuery) -> Result<Vec<JobMatch>> {
    if query.skills.is_empty() {
        warn!("find_matching_jobs received an empty skill list");
        return Ok(Vec::new());
    }

    let skill_ids = resolve_ids(pool, "SELECT skill_id, skill_name FROM skills WHERE skill_name IN (", &query.skills).await?;
    if skill_ids.is_empty() {
        warn!("User skills {:?} not found in the database", query.skills);
        return Ok(Vec::new());
    }

    let mut level_names = query.target_levels.clone();
    level_names.push(query.primary_level.clone());
    let level_map = resolve_ids(
        pool,
        "SELECT level_id, level_name FROM experience_levels WHERE level_name IN (",
        &level_names,
    )
    .await?;
    debug!("Resolved levels for {:?}: {:?}", level_names, level_map);

    let Some(&primary_level_id) = level_map.get(&query.primary_level) else {
        warn!("Primary level '{}' not found in the database", query.primary_level);
        return Ok(Vec::new());
    };

    let target_level_ids: Vec<i64> = query
        .target_levels
        .iter()
        .filter_map(|name| level_map.get(name).copied())
        .collect();
    if target_level_ids.is_empty() {
        warn!("None of the target levels {:?} exist", query.target_levels);
        return Ok(Vec::new());
    }

    let skill_ids: Vec<i64> = skill_ids.into_values().collect();
    let stats = match_stats(pool, &skill_ids, &target_level_ids).await?;
    let matches = rank_matches(
        stats,
        primary_level_id,
        query.threshold,
        query.limit,
        query.cross_level_penalty,
    );

    info!("Found {} matching jobs", matches.len());
    Ok(matches)
}

/// Apply the level penalty, keep ratios at or above `threshold`, order by
/// ratio descending (job id ascending on ties) and cut to `limit`.
pub fn rank_matches(
    stats: Vec<JobMatchStats>,
    primary_level_id: i64,
    threshold: f64,
    limit: usize,
    cross_level_penalty: f64,
) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = stats
        .into_iter()
        .filter(|s| s.total_required > 0)
        .filter_map(|s| {
            let raw = s.matched as f64 / s.total_required as f64;
            let ratio = if s.level_id == primary_level_id {
                raw
            } else {
                raw - cross_level_penalty
            };

            (ratio >= threshold).then(|| JobMatch {
                job_id: s.job_id,
                title: s.title,
                link: s.link,
                level: s.level_name,
                company: s.company_name,
                match_percentage: (ratio * 100.0).trunc() as i64,
                ratio,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.ratio
            .partial_cmp(&a.ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
    matches.truncate(limit);
    matches
}

async fn resolve_ids(pool: &SqlitePool, prefix: &str, names: &[String]) -> Result<HashMap<String, i64>> {
    if names.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(prefix);
    {
        let mut values = query.separated(", ");
        for name in names {
            values.push_bind(name.clone());
        }
    }
    query.push(")");

    let rows: Vec<(i64, String)> = query.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
}

async fn match_stats(pool: &SqlitePool, skill_ids: &[i64], level_ids: &[i64]) -> Result<Vec<JobMatchStats>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT j.job_id, j.title, j.link, el.level_id, el.level_name, c.company_name, \
         COUNT(DISTINCT js.skill_id) AS total_required, \
         COUNT(DISTINCT CASE WHEN js.skill_id IN (",
    );
    {
        let mut ids = query.separated(", ");
        for id in skill_ids {
            ids.push_bind(*id);
        }
    }
    query.push(
        ") THEN js.skill_id END) AS matched \
         FROM job_skills AS js \
         JOIN jobs AS j ON js.job_id = j.job_id \
         JOIN experience_levels AS el ON j.level_id = el.level_id \
         LEFT JOIN companies AS c ON j.company_id = c.company_id \
         WHERE j.level_id IN (",
    );
    {
        let mut ids = query.separated(", ");
        for id in level_ids {
            ids.push_bind(*id);
        }
    }
    query.push(") GROUP BY j.job_id ORDER BY j.job_id");

    let stats: Vec<JobMatchStats> = query.build_query_as().fetch_all(pool).await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(job_id: i64, level_id: i64, total: i64, matched: i64) -> JobMatchStats {
        JobMatchStats {
            job_id,
            title: Some(format!("Job {}", job_id)),
            link: None,
            level_id,
            level_name: format!("L{}", level_id),
            company_name: None,
            total_required: total,
            matched,
        }
    }

    #[test]
    fn test_penalty_applies_off_primary_level() {
        let ranked = rank_matches(vec![stats(1, 1, 2, 1), stats(2, 2, 2, 1)], 1, 0.0, 30, 0.25);
        assert_eq!(ranked[0].match_percentage, 50);
        assert_eq!(ranked[1].match_percentage, 25);
    }

    #[test]
    fn test_threshold_filters_penalised_jobs() {
        let ranked = rank_matches(vec![stats(1, 1, 2, 1), stats(2, 2, 2, 1)], 1, 0.5, 30, 0.25);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].job_id, 1);
    }

    #[test]
    fn test_negative_ratio_dropped() {
        let ranked = rank_matches(vec![stats(1, 2, 10, 1)], 1, 0.0, 30, 0.25);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_percentage_truncates() {
        let ranked = rank_matches(vec![stats(1, 1, 3, 2), stats(2, 1, 1000, 999)], 1, 0.0, 30, 0.25);
        assert_eq!(ranked[0].match_percentage, 99);
        assert_eq!(ranked[1].match_percentage, 66);
    }

    #[test]
    fn test_ties_ordered_by_job_id_and_limit() {
        let ranked = rank_matches(
            vec![stats(9, 1, 2, 1), stats(3, 1, 2, 1), stats(5, 1, 1, 1)],
            1,
            0.0,
            2,
            0.25,
        );
        let ids: Vec<i64> = ranked.iter().map(|m| m.job_id).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[test]
    fn test_jobs_without_skills_never_divide() {
        assert!(rank_matches(vec![stats(1, 1, 0, 0)], 1, 0.0, 30, 0.25).is_empty());
    }
}

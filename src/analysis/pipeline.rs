//! CV gap analysis: heuristic hint, service classification, market gaps,
//! job matches and a written recommendation

use crate::config::MatchingConfig;
use crate::error::{AnalyzerError, Result};
use crate::profile::{DetectedProfile, ProfileDetector};
use crate::service::{
    ClassificationRequest, ClassificationService, Recommendation, RecommendationRequest,
};
use crate::storage::matching::{find_matching_jobs, JobMatch, MatchQuery};
use crate::storage::queries::MarketQueries;
use crate::vocabulary::VocabularyStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;

const UNKNOWN_LEVEL: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub profile: String,
    pub heuristic_profile: String,
    pub level: String,
    pub cv_skills: Vec<String>,
    pub market_gaps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysisReport {
    pub recommendation: Recommendation,
    pub analysis_details: AnalysisDetails,
    pub top_jobs: Vec<JobMatch>,
}

pub struct CvAnalyzer<S> {
    service: S,
    vocabulary: VocabularyStore,
    pool: SqlitePool,
    queries: MarketQueries,
    settings: MatchingConfig,
}

impl<S: ClassificationService> CvAnalyzer<S> {
    pub fn new(service: S, vocabulary: VocabularyStore, pool: SqlitePool, settings: MatchingConfig) -> Self {
        Self {
            service,
            vocabulary,
            queries: MarketQueries::new(pool.clone()),
            pool,
            settings,
        }
    }

    /// Any service or storage failure fails the whole analysis.
    pub async fn analyze(&self, cv_text: &str) -> Result<CvAnalysisReport> {
        if cv_text.trim().is_empty() {
            return Err(AnalyzerError::InvalidInput("CV text is empty".to_string()));
        }

        info!("Starting new CV analysis...");
        let vocabulary = self.vocabulary.current();

        let detector = ProfileDetector::new(vocabulary.canonical_profiles(), vocabulary.dictionary())?;
        let heuristic = detector.detect(cv_text);
        info!("Initial heuristic detection: {}", heuristic.label());

        let classification = self
            .service
            .classify(&ClassificationRequest {
                cv_text: cv_text.to_string(),
                canonical_skills: vocabulary.canonical_skills(),
                canonical_levels: vocabulary.canonical_levels(),
                canonical_profiles: vocabulary.canonical_profiles().to_vec(),
                hint_preferred_profile: Some(heuristic.label().to_string()),
            })
            .await?;

        let user_skills = classification.cv_analysis.extracted_skills;
        let user_level = non_empty(classification.cv_analysis.inferred_experience_level);
        let service_profile = non_empty(classification.profile_identification.profile)
            .map(|label| DetectedProfile::from_label(&label))
            .unwrap_or_else(|| heuristic.clone());
        let level_label = user_level.clone().unwrap_or_else(|| UNKNOWN_LEVEL.to_string());
        info!(
            "Service identification complete. Profile: {}, level: {}",
            service_profile.label(),
            level_label
        );

        if service_profile == DetectedProfile::NonTech || heuristic == DetectedProfile::NonTech {
            info!("Non-technical profile identified, skipping market analysis");
            let recommendation = self
                .service
                .recommend(&RecommendationRequest {
                    cv_text: cv_text.to_string(),
                    profile: service_profile.label().to_string(),
                    skills: Vec::new(),
                    level: level_label.clone(),
                    gaps: Vec::new(),
                })
                .await?;

            return Ok(CvAnalysisReport {
                recommendation,
                analysis_details: AnalysisDetails {
                    profile: service_profile.label().to_string(),
                    heuristic_profile: heuristic.label().to_string(),
                    level: level_label,
                    cv_skills: Vec::new(),
                    market_gaps: Vec::new(),
                },
                top_jobs: Vec::new(),
            });
        }

        let profile = if service_profile == DetectedProfile::Unknown && heuristic.is_specific() {
            info!("Service profile unknown, using heuristic profile '{}'", heuristic.label());
            heuristic.clone()
        } else {
            service_profile
        };

        let market_skills = self.market_skills(profile.label()).await?;
        let gaps = market_gaps(&market_skills, &user_skills, self.settings.max_gaps);
        info!("Market gaps: {:?}", gaps);

        let (target_levels, primary_level) = match &user_level {
            Some(level) => (vocabulary.profiles().target_levels(level), level.clone()),
            None => {
                warn!(
                    "No experience level identified, using fallback levels {:?}",
                    self.settings.fallback_levels
                );
                let primary = self
                    .settings
                    .fallback_levels
                    .first()
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_LEVEL.to_string());
                (self.settings.fallback_levels.clone(), primary)
            }
        };

        let query = MatchQuery::new(user_skills.clone(), target_levels, primary_level)
            .threshold(self.settings.threshold)
            .limit(self.settings.limit)
            .cross_level_penalty(self.settings.cross_level_penalty);
        let top_jobs = find_matching_jobs(&self.pool, &query).await?;
        info!("Found {} matching jobs", top_jobs.len());

        let recommendation = self
            .service
            .recommend(&RecommendationRequest {
                cv_text: cv_text.to_string(),
                profile: profile.label().to_string(),
                skills: user_skills.clone(),
                level: level_label.clone(),
                gaps: gaps.clone(),
            })
            .await?;

        Ok(CvAnalysisReport {
            recommendation,
            analysis_details: AnalysisDetails {
                profile: profile.label().to_string(),
                heuristic_profile: heuristic.label().to_string(),
                level: level_label,
                cv_skills: user_skills,
                market_gaps: gaps,
            },
            top_jobs,
        })
    }

    async fn market_skills(&self, profile: &str) -> Result<Vec<String>> {
        let count = self.settings.market_skill_count;
        let skills = self.queries.popular_skills_for_profile(profile, count).await?;
        if !skills.is_empty() {
            return Ok(skills);
        }

        info!("No profile-specific skills, falling back to global popular skills");
        let global = self.queries.popular_skills(count).await?;
        Ok(global.into_iter().map(|s| s.skill).collect())
    }
}

/// Market skills (in popularity order, lowercased) the candidate lacks.
pub fn market_gaps(market_skills: &[String], user_skills: &[String], max_gaps: usize) -> Vec<String> {
    let owned: HashSet<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();
    let mut seen = HashSet::new();

    market_skills
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !owned.contains(s) && seen.insert(s.clone()))
        .take(max_gaps)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gaps_exclude_owned_skills_case_insensitively() {
        let gaps = market_gaps(
            &strings(&["react", "Node.js", "aws", "c#"]),
            &strings(&["Python", "React"]),
            10,
        );
        assert_eq!(gaps, vec!["node.js", "aws", "c#"]);
    }

    #[test]
    fn test_gaps_capped() {
        let market: Vec<String> = (0..15).map(|i| format!("skill{}", i)).collect();
        let gaps = market_gaps(&market, &[], 10);
        assert_eq!(gaps.len(), 10);
        assert_eq!(gaps[0], "skill0");
    }

    #[test]
    fn test_gaps_deduplicate() {
        let gaps = market_gaps(&strings(&["AWS", "aws", "go"]), &[], 10);
        assert_eq!(gaps, vec!["aws", "go"]);
    }
}

//! Generative classification service: request/response shapes and the
//! client seam used by the analysis pipeline

pub mod http_client;

pub use http_client::HttpClassificationService;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRequest {
    pub cv_text: String,
    pub canonical_skills: Vec<String>,
    pub canonical_levels: Vec<String>,
    pub canonical_profiles: Vec<String>,
    pub hint_preferred_profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysis {
    #[serde(default)]
    pub extracted_skills: Vec<String>,
    #[serde(default)]
    pub inferred_experience_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileIdentification {
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvClassification {
    pub cv_analysis: CvAnalysis,
    pub profile_identification: ProfileIdentification,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRequest {
    pub cv_text: String,
    pub profile: String,
    pub skills: Vec<String>,
    pub level: String,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub gap_analysis_intro: String,
    #[serde(default)]
    pub cv_review_title: String,
    #[serde(default)]
    pub cv_review_points: Vec<String>,
    #[serde(default)]
    pub closing: String,
}

impl Recommendation {
    /// Placeholder shown when the service answered with something unusable.
    pub fn unavailable(title: &str, detail: Option<String>) -> Self {
        Self {
            opening: "An error occurred while generating the recommendation.".to_string(),
            cv_review_title: title.to_string(),
            cv_review_points: detail.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Remote classifier for CV text. Failures are returned, never retried.
pub trait ClassificationService: Send + Sync {
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> impl Future<Output = Result<CvClassification>> + Send;

    fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> impl Future<Output = Result<Recommendation>> + Send;
}

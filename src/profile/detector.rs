//! Keyword-scoring profile classifier used as a hint next to the
//! classification service

use crate::error::{AnalyzerError, Result};
use crate::vocabulary::dictionary::{SkillDictionary, NON_TECH_KEY};
use crate::vocabulary::profiles::{NON_TECH_PROFILE, UNKNOWN_TECH_PROFILE};
use aho_corasick::AhoCorasick;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tokens that veto the non-tech short-circuit.
const CLOUD_TOKENS: [&str; 4] = ["cloud", "azure", "aws", "gcp"];

/// Bonus for a CV that names the profile outright.
const NAME_BONUS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectedProfile {
    NonTech,
    Unknown,
    Profile(String),
}

impl DetectedProfile {
    pub fn label(&self) -> &str {
        match self {
            DetectedProfile::NonTech => NON_TECH_PROFILE,
            DetectedProfile::Unknown => UNKNOWN_TECH_PROFILE,
            DetectedProfile::Profile(name) => name,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            NON_TECH_PROFILE => DetectedProfile::NonTech,
            "" | UNKNOWN_TECH_PROFILE => DetectedProfile::Unknown,
            other => DetectedProfile::Profile(other.to_string()),
        }
    }

    pub fn is_specific(&self) -> bool {
        matches!(self, DetectedProfile::Profile(_))
    }
}

struct CandidateProfile {
    name: String,
    lowered_name: String,
    keywords: Option<AhoCorasick>,
}

pub struct ProfileDetector {
    candidates: Vec<CandidateProfile>,
    non_tech: Option<AhoCorasick>,
}

impl ProfileDetector {
    /// Candidate order is kept; on a tied score the earlier profile wins.
    pub fn new(profiles: &[String], dictionary: &SkillDictionary) -> Result<Self> {
        let candidates = profiles
            .iter()
            .filter(|profile| profile.as_str() != NON_TECH_PROFILE)
            .map(|profile| {
                let lowered_name = profile.to_lowercase();
                let keywords = build_matcher(dictionary.synonyms(&lowered_name))?;
                Ok(CandidateProfile {
                    name: profile.clone(),
                    lowered_name,
                    keywords,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let non_tech = build_matcher(dictionary.synonyms(NON_TECH_KEY))?;

        Ok(Self {
            candidates,
            non_tech,
        })
    }

    pub fn detect(&self, cv_text: &str) -> DetectedProfile {
        let text = normalize(cv_text);

        let non_tech_hits = distinct_hits(self.non_tech.as_ref(), &text);
        if non_tech_hits >= 1 && !CLOUD_TOKENS.iter().any(|token| text.contains(token)) {
            info!(
                "Heuristic: detected non-technical profile ({} keywords)",
                non_tech_hits
            );
            return DetectedProfile::NonTech;
        }

        let mut best: Option<(&CandidateProfile, usize)> = None;
        for (candidate, score) in self.candidates.iter().map(|c| (c, self.score(c, &text))) {
            debug!("Heuristic: '{}' scored {}", candidate.name, score);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) if score > 0 => {
                info!(
                    "Heuristic: winning profile is '{}' with score {}",
                    candidate.name, score
                );
                DetectedProfile::Profile(candidate.name.clone())
            }
            _ => {
                info!("Heuristic: no matching keywords found for any tech profile");
                DetectedProfile::Unknown
            }
        }
    }

    /// Per-candidate scores in candidate order, for reporting.
    pub fn scores(&self, cv_text: &str) -> Vec<(String, usize)> {
        let text = normalize(cv_text);
        self.candidates
            .iter()
            .map(|c| (c.name.clone(), self.score(c, &text)))
            .collect()
    }

    fn score(&self, candidate: &CandidateProfile, text: &str) -> usize {
        let mut score = distinct_hits(candidate.keywords.as_ref(), text);
        if text.contains(&candidate.lowered_name) {
            score += NAME_BONUS;
        }
        score
    }
}

/// Lowercase, trim and collapse runs of whitespace to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn build_matcher(keywords: &[String]) -> Result<Option<AhoCorasick>> {
    if keywords.is_empty() {
        return Ok(None);
    }

    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    AhoCorasick::new(&lowered)
        .map(Some)
        .map_err(|e| AnalyzerError::Configuration(format!("Failed to build profile matcher: {}", e)))
}

/// Number of configured phrases that occur at least once in `text`.
fn distinct_hits(matcher: Option<&AhoCorasick>, text: &str) -> usize {
    let Some(matcher) = matcher else {
        return 0;
    };

    matcher
        .find_overlapping_iter(text)
        .map(|m| m.pattern())
        .collect::<HashSet<_>>()
        .len()
}

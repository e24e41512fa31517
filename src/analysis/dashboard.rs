//! Dashboard statistics over the stored job corpus

use crate::error::Result;
use crate::storage::queries::{LevelCount, MarketQueries, SkillShare};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub skills: Vec<SkillShare>,
    pub levels: Vec<LevelCount>,
    /// Jobs with a known experience level
    pub total_jobs: i64,
}

pub struct DashboardService {
    queries: MarketQueries,
}

impl DashboardService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            queries: MarketQueries::new(pool),
        }
    }

    pub async fn dashboard(&self, top_n: usize) -> Result<DashboardStats> {
        info!("Fetching dashboard data...");
        let skills = self.queries.skill_popularity(top_n).await?;
        let levels = self.queries.experience_level_distribution().await?;
        let total_jobs = levels.iter().map(|level| level.count).sum();

        Ok(DashboardStats {
            skills,
            levels,
            total_jobs,
        })
    }
}

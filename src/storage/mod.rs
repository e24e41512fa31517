//! Relational storage: schema, lookups, job repository and read queries

pub mod database;
pub mod jobs;
pub mod lookup;
pub mod matching;
pub mod queries;

pub use database::Database;
pub use jobs::{JobRecord, JobRepository, LinkReplacement};
pub use lookup::{get_or_create_id, LookupCache, LookupTable};
pub use matching::{find_matching_jobs, JobMatch, MatchQuery};
pub use queries::{LevelCount, MarketQueries, SkillCount, SkillShare};

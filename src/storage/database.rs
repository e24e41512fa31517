//! SQLite connection management and schema setup

use crate::error::Result;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

const SCHEMA: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        company_id INTEGER PRIMARY KEY AUTOINCREMENT,
        company_name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        location_id INTEGER PRIMARY KEY AUTOINCREMENT,
        location_name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS experience_levels (
        level_id INTEGER PRIMARY KEY AUTOINCREMENT,
        level_name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS skills (
        skill_id INTEGER PRIMARY KEY AUTOINCREMENT,
        skill_name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        job_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        description TEXT,
        link TEXT,
        scraped_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        company_id INTEGER,
        level_id INTEGER,
        FOREIGN KEY (company_id) REFERENCES companies (company_id),
        FOREIGN KEY (level_id) REFERENCES experience_levels (level_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_skills (
        job_id INTEGER,
        skill_id INTEGER,
        FOREIGN KEY (job_id) REFERENCES jobs (job_id) ON DELETE CASCADE,
        FOREIGN KEY (skill_id) REFERENCES skills (skill_id) ON DELETE CASCADE,
        PRIMARY KEY (job_id, skill_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_locations (
        job_id INTEGER,
        location_id INTEGER,
        FOREIGN KEY (job_id) REFERENCES jobs (job_id) ON DELETE CASCADE,
        FOREIGN KEY (location_id) REFERENCES locations (location_id) ON DELETE CASCADE,
        PRIMARY KEY (job_id, location_id)
    );
    "#,
];

const INDEXES: [&str; 6] = [
    "CREATE INDEX IF NOT EXISTS idx_jobs_company_id ON jobs (company_id);",
    "CREATE INDEX IF NOT EXISTS idx_jobs_level_id ON jobs (level_id);",
    "CREATE INDEX IF NOT EXISTS idx_skills_name ON skills (skill_name);",
    "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies (company_name);",
    "CREATE INDEX IF NOT EXISTS idx_locations_name ON locations (location_name);",
    "CREATE INDEX IF NOT EXISTS idx_experience_name ON experience_levels (level_name);",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and ensure the schema exists
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Database connection established: {}", database_path.display());

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database on a single connection
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA.iter().chain(INDEXES.iter()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

//! Get-or-create helper for the name lookup tables

use crate::error::Result;
use sqlx::SqliteConnection;
use std::collections::HashMap;

/// Values that never resolve to a lookup row.
const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupTable {
    Companies,
    ExperienceLevels,
    Skills,
    Locations,
}

impl LookupTable {
    pub const fn table(self) -> &'static str {
        match self {
            LookupTable::Companies => "companies",
            LookupTable::ExperienceLevels => "experience_levels",
            LookupTable::Skills => "skills",
            LookupTable::Locations => "locations",
        }
    }

    pub const fn id_column(self) -> &'static str {
        match self {
            LookupTable::Companies => "company_id",
            LookupTable::ExperienceLevels => "level_id",
            LookupTable::Skills => "skill_id",
            LookupTable::Locations => "location_id",
        }
    }

    pub const fn name_column(self) -> &'static str {
        match self {
            LookupTable::Companies => "company_name",
            LookupTable::ExperienceLevels => "level_name",
            LookupTable::Skills => "skill_name",
            LookupTable::Locations => "location_name",
        }
    }
}

/// Per-run memo of resolved ids, keyed by table and exact value.
#[derive(Debug, Default)]
pub struct LookupCache {
    ids: HashMap<(LookupTable, String), i64>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolve `value` to its row id in `table`, inserting the row when absent.
/// Empty and `"N/A"` values resolve to `None`. Matching is exact.
pub async fn get_or_create_id(
    conn: &mut SqliteConnection,
    table: LookupTable,
    value: &str,
    cache: &mut LookupCache,
) -> Result<Option<i64>> {
    if value.is_empty() || value == MISSING_VALUE {
        return Ok(None);
    }

    let key = (table, value.to_string());
    if let Some(id) = cache.ids.get(&key) {
        return Ok(Some(*id));
    }

    let select = format!(
        "SELECT {id} FROM {table} WHERE {name} = ?",
        id = table.id_column(),
        table = table.table(),
        name = table.name_column()
    );
    let existing: Option<(i64,)> = sqlx::query_as(&select)
        .bind(value)
        .fetch_optional(&mut *conn)
        .await?;

    let id = match existing {
        Some((id,)) => id,
        None => {
            let insert = format!(
                "INSERT INTO {table} ({name}) VALUES (?) RETURNING {id}",
                table = table.table(),
                name = table.name_column(),
                id = table.id_column()
            );
            let (id,): (i64,) = sqlx::query_as(&insert)
                .bind(value)
                .fetch_one(&mut *conn)
                .await?;
            id
        }
    };

    cache.ids.insert(key, id);
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    #[tokio::test]
    async fn test_creates_then_reuses() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let mut cache = LookupCache::new();

        let first = get_or_create_id(&mut conn, LookupTable::Skills, "python", &mut cache)
            .await
            .unwrap();
        let second = get_or_create_id(&mut conn, LookupTable::Skills, "python", &mut cache)
            .await
            .unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        // a fresh cache must still find the existing row
        let mut fresh = LookupCache::new();
        let third = get_or_create_id(&mut conn, LookupTable::Skills, "python", &mut fresh)
            .await
            .unwrap();
        assert_eq!(first, third);
    }

    #[tokio::test]
    async fn test_missing_values_resolve_to_none() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let mut cache = LookupCache::new();

        for value in ["", "N/A"] {
            let id = get_or_create_id(&mut conn, LookupTable::Locations, value, &mut cache)
                .await
                .unwrap();
            assert_eq!(id, None);
        }
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_values_are_case_exact_and_tables_separate() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let mut cache = LookupCache::new();

        let lower = get_or_create_id(&mut conn, LookupTable::Companies, "acme", &mut cache)
            .await
            .unwrap();
        let upper = get_or_create_id(&mut conn, LookupTable::Companies, "ACME", &mut cache)
            .await
            .unwrap();
        let level = get_or_create_id(&mut conn, LookupTable::ExperienceLevels, "acme", &mut cache)
            .await
            .unwrap();

        assert_ne!(lower, upper);
        assert_eq!(level, Some(1));
        assert_eq!(cache.len(), 3);
    }
}

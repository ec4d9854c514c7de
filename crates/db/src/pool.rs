use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::DbError;

/// Tables the application cannot run without.
pub const REQUIRED_TABLES: &[&str] = &[
    "campaigns",
    "briefs",
    "phase_runs",
    "outputs",
    "agent_messages",
    "idea_routes",
    "heuristic_scores",
    "founder_notes",
    "market_category_benchmarks",
    "playbook_snippets",
    "knowledge_entries",
];

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30))
        .pragma("foreign_keys", "ON");

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Fail fast when any required table is absent instead of degrading at
/// request time.
pub async fn verify_schema(pool: &SqlitePool) -> Result<(), DbError> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    let missing: Vec<String> = REQUIRED_TABLES
        .iter()
        .filter(|table| !existing.iter().any(|name| name == *table))
        .map(|table| table.to_string())
        .collect();

    if missing.is_empty() {
        debug!(tables = REQUIRED_TABLES.len(), "Database schema verified");
        Ok(())
    } else {
        error!(missing = ?missing, "Database schema incomplete");
        Err(DbError::SchemaMissing(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:").await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_verify_schema_after_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        verify_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_schema_reports_missing_tables() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let err = verify_schema(&pool).await.unwrap_err();
        match err {
            DbError::SchemaMissing(missing) => {
                assert_eq!(missing.len(), REQUIRED_TABLES.len());
                assert!(missing.contains(&"outputs".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

use crate::error::DbError;
use crate::models::{datetime_to_millis, BenchmarkRow};
use sqlx::SqlitePool;
use trudy_core::MarketCategoryBenchmark;

const BENCHMARK_COLUMNS: &str =
    "market, category, median_winners, median_prize_pool, typical_duration_weeks, notes, updated_at";

#[derive(Clone)]
pub struct BenchmarkRepository {
    pool: SqlitePool,
}

impl BenchmarkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(
        &self,
        benchmark: &MarketCategoryBenchmark,
    ) -> Result<MarketCategoryBenchmark, DbError> {
        let stored: BenchmarkRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO market_category_benchmarks ({BENCHMARK_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(market, category) DO UPDATE SET
                median_winners = excluded.median_winners,
                median_prize_pool = excluded.median_prize_pool,
                typical_duration_weeks = excluded.typical_duration_weeks,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            RETURNING {BENCHMARK_COLUMNS}
            "#
        ))
        .bind(&benchmark.market)
        .bind(&benchmark.category)
        .bind(benchmark.median_winners)
        .bind(benchmark.median_prize_pool)
        .bind(benchmark.typical_duration_weeks)
        .bind(&benchmark.notes)
        .bind(datetime_to_millis(benchmark.updated_at))
        .fetch_one(&self.pool)
        .await?;

        Ok(stored.into_domain())
    }

    /// Category match is case-insensitive.
    pub async fn find(
        &self,
        market: &str,
        category: &str,
    ) -> Result<Option<MarketCategoryBenchmark>, DbError> {
        let row: Option<BenchmarkRow> = sqlx::query_as(&format!(
            "SELECT {BENCHMARK_COLUMNS} FROM market_category_benchmarks WHERE market = ? AND lower(category) = lower(?)"
        ))
        .bind(market)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    pub async fn find_all(&self) -> Result<Vec<MarketCategoryBenchmark>, DbError> {
        let rows: Vec<BenchmarkRow> = sqlx::query_as(&format!(
            "SELECT {BENCHMARK_COLUMNS} FROM market_category_benchmarks ORDER BY market, category"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;
    use chrono::Utc;

    fn benchmark(winners: i64) -> MarketCategoryBenchmark {
        MarketCategoryBenchmark {
            market: "AU".to_string(),
            category: "Wine".to_string(),
            median_winners: Some(winners),
            median_prize_pool: Some(25_000.0),
            typical_duration_weeks: Some(6),
            notes: String::new(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find() {
        let pool = setup_test_db().await;
        let repo = BenchmarkRepository::new(pool);

        repo.upsert(&benchmark(120)).await.unwrap();
        repo.upsert(&benchmark(300)).await.unwrap();

        let found = repo.find("AU", "wine").await.unwrap().unwrap();
        assert_eq!(found.median_winners, Some(300));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert!(repo.find("NZ", "Wine").await.unwrap().is_none());
    }
}

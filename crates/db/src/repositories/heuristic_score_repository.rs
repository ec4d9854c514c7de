use crate::error::DbError;
use crate::models::{datetime_to_millis, HeuristicScoreRow};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use trudy_core::HeuristicScore;
use uuid::Uuid;

#[derive(Clone)]
pub struct HeuristicScoreRepository {
    pool: SqlitePool,
}

impl HeuristicScoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One score per route; rescoring replaces it.
    pub async fn upsert(
        &self,
        campaign_id: Uuid,
        route_id: Uuid,
        total: u32,
        breakdown: &Value,
    ) -> Result<HeuristicScore, DbError> {
        let stored: HeuristicScoreRow = sqlx::query_as(
            r#"
            INSERT INTO heuristic_scores (id, campaign_id, route_id, total, breakdown, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(route_id) DO UPDATE SET
                total = excluded.total,
                breakdown = excluded.breakdown,
                created_at = excluded.created_at
            RETURNING id, campaign_id, route_id, total, breakdown, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(campaign_id.to_string())
        .bind(route_id.to_string())
        .bind(i64::from(total))
        .bind(breakdown.to_string())
        .bind(datetime_to_millis(Utc::now()))
        .fetch_one(&self.pool)
        .await?;

        Ok(stored.into_domain())
    }

    pub async fn find_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<HeuristicScore>, DbError> {
        let rows: Vec<HeuristicScoreRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, route_id, total, breakdown, created_at
            FROM heuristic_scores
            WHERE campaign_id = ?
            ORDER BY total DESC
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

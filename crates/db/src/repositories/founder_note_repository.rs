use crate::error::DbError;
use crate::models::{datetime_to_millis, FounderNoteRow};
use chrono::Utc;
use sqlx::SqlitePool;
use trudy_core::{FounderNote, UpsertFounderNoteRequest};
use uuid::Uuid;

#[derive(Clone)]
pub struct FounderNoteRepository {
    pool: SqlitePool,
}

impl FounderNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, note: &UpsertFounderNoteRequest) -> Result<FounderNote, DbError> {
        let now = datetime_to_millis(Utc::now());

        let stored: FounderNoteRow = sqlx::query_as(
            r#"
            INSERT INTO founder_notes (id, market, category, title, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(market, category, title) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            RETURNING id, market, category, title, body, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(note.market.as_deref().map(str::trim).unwrap_or_default())
        .bind(note.category.as_deref().map(str::trim).unwrap_or_default())
        .bind(note.title.trim())
        .bind(&note.body)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored.into_domain())
    }

    /// Notes matching a market and category. Notes stored without a market
    /// or category apply everywhere and are always included.
    pub async fn find_for(
        &self,
        market: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<FounderNote>, DbError> {
        let rows: Vec<FounderNoteRow> = sqlx::query_as(
            r#"
            SELECT id, market, category, title, body, created_at, updated_at
            FROM founder_notes
            WHERE (? IS NULL OR market = '' OR market = ?)
              AND (? IS NULL OR category = '' OR lower(category) = lower(?))
            ORDER BY updated_at DESC
            "#,
        )
        .bind(market)
        .bind(market)
        .bind(category)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

use crate::error::DbError;
use crate::models::{datetime_to_millis, PlaybookSnippetRow};
use sqlx::SqlitePool;
use trudy_core::PlaybookSnippet;

#[derive(Clone)]
pub struct PlaybookSnippetRepository {
    pool: SqlitePool,
}

impl PlaybookSnippetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, snippet: &PlaybookSnippet) -> Result<PlaybookSnippet, DbError> {
        let tags = serde_json::to_string(&snippet.tags).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let stored: PlaybookSnippetRow = sqlx::query_as(
            r#"
            INSERT INTO playbook_snippets (key, title, body, tags, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                tags = excluded.tags,
                updated_at = excluded.updated_at
            RETURNING key, title, body, tags, updated_at
            "#,
        )
        .bind(&snippet.key)
        .bind(&snippet.title)
        .bind(&snippet.body)
        .bind(tags)
        .bind(datetime_to_millis(snippet.updated_at))
        .fetch_one(&self.pool)
        .await?;

        Ok(stored.into_domain())
    }

    pub async fn find_all(&self) -> Result<Vec<PlaybookSnippet>, DbError> {
        let rows: Vec<PlaybookSnippetRow> = sqlx::query_as(
            "SELECT key, title, body, tags, updated_at FROM playbook_snippets ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

use crate::error::DbError;
use crate::models::{datetime_to_millis, KnowledgeEntryRow};
use sqlx::SqlitePool;
use trudy_core::{KnowledgeEntry, KnowledgeKind};

/// Cached brand and prize summaries.
#[derive(Clone)]
pub struct KnowledgeRepository {
    pool: SqlitePool,
}

impl KnowledgeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        kind: KnowledgeKind,
        slug: &str,
    ) -> Result<Option<KnowledgeEntry>, DbError> {
        let row: Option<KnowledgeEntryRow> = sqlx::query_as(
            r#"
            SELECT kind, slug, subject, market, summary, payload, updated_at
            FROM knowledge_entries
            WHERE kind = ? AND slug = ?
            "#,
        )
        .bind(kind.as_str())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    pub async fn upsert(&self, entry: &KnowledgeEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO knowledge_entries (kind, slug, subject, market, summary, payload, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(kind, slug) DO UPDATE SET
                subject = excluded.subject,
                market = excluded.market,
                summary = excluded.summary,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(&entry.slug)
        .bind(&entry.subject)
        .bind(&entry.market)
        .bind(&entry.summary)
        .bind(entry.payload.to_string())
        .bind(datetime_to_millis(entry.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_test_db;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_and_find_by_kind() {
        let pool = setup_test_db().await;
        let repo = KnowledgeRepository::new(pool);

        let entry = KnowledgeEntry {
            kind: KnowledgeKind::Brand,
            slug: KnowledgeEntry::slug_for("Grant Burge", "AU"),
            subject: "Grant Burge".to_string(),
            market: "AU".to_string(),
            summary: "Barossa winemaker.".to_string(),
            payload: json!({"tone": "heritage"}),
            updated_at: Utc::now(),
        };
        repo.upsert(&entry).await.unwrap();

        let found = repo
            .find(KnowledgeKind::Brand, "grant-burge-au")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.summary, "Barossa winemaker.");
        assert_eq!(found.payload["tone"], "heritage");

        assert!(repo
            .find(KnowledgeKind::Prize, "grant-burge-au")
            .await
            .unwrap()
            .is_none());
    }
}

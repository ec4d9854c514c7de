use crate::error::DbError;
use crate::models::{datetime_to_millis, BriefRow};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use trudy_core::Brief;
use uuid::Uuid;

#[derive(Clone)]
pub struct BriefRepository {
    pool: SqlitePool,
}

impl BriefRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_campaign(&self, campaign_id: Uuid) -> Result<Option<Brief>, DbError> {
        let row: Option<BriefRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, raw_text, parsed_json, assets, created_at, updated_at
            FROM briefs
            WHERE campaign_id = ?
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    /// Insert or replace the campaign's brief. The first row's id and
    /// `created_at` survive later upserts.
    pub async fn upsert(&self, brief: &Brief) -> Result<Brief, DbError> {
        let row = BriefRow::from(brief);

        sqlx::query(
            r#"
            INSERT INTO briefs (id, campaign_id, raw_text, parsed_json, assets, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(campaign_id) DO UPDATE SET
                raw_text = excluded.raw_text,
                parsed_json = excluded.parsed_json,
                assets = excluded.assets,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&row.id)
        .bind(&row.campaign_id)
        .bind(&row.raw_text)
        .bind(&row.parsed_json)
        .bind(&row.assets)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        self.find_by_campaign(brief.campaign_id)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    pub async fn update_assets(
        &self,
        campaign_id: Uuid,
        assets: &Value,
    ) -> Result<Option<Brief>, DbError> {
        let result = sqlx::query("UPDATE briefs SET assets = ?, updated_at = ? WHERE campaign_id = ?")
            .bind(assets.to_string())
            .bind(datetime_to_millis(Utc::now()))
            .bind(campaign_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_campaign(campaign_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{seed_campaign, setup_test_db};
    use crate::CampaignRepository;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = BriefRepository::new(pool);

        let first = repo
            .upsert(&Brief::new(campaign.id, "v1", json!({"hook": "Win"})))
            .await
            .unwrap();
        let second = repo
            .upsert(&Brief::new(campaign.id, "v2", json!({"hook": "Win big"})))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.raw_text, "v2");
        assert_eq!(second.parsed_json["hook"], "Win big");
    }

    #[tokio::test]
    async fn test_update_assets() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = BriefRepository::new(pool);

        assert!(repo
            .update_assets(campaign.id, &json!({"exceptions": ["x"]}))
            .await
            .unwrap()
            .is_none());

        repo.upsert(&Brief::new(campaign.id, "text", json!({})))
            .await
            .unwrap();
        let updated = repo
            .update_assets(campaign.id, &json!({"exceptions": ["No alcohol imagery"]}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.asset_strings("exceptions"), vec!["No alcohol imagery"]);
    }

    #[tokio::test]
    async fn test_brief_removed_with_campaign() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = BriefRepository::new(pool.clone());

        repo.upsert(&Brief::new(campaign.id, "text", json!({})))
            .await
            .unwrap();
        CampaignRepository::new(pool)
            .delete(campaign.id)
            .await
            .unwrap();

        assert!(repo.find_by_campaign(campaign.id).await.unwrap().is_none());
    }
}

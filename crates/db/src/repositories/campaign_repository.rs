use crate::error::DbError;
use crate::models::{datetime_to_millis, CampaignRow};
use chrono::Utc;
use sqlx::SqlitePool;
use trudy_core::{Campaign, CampaignStatus, UpdateCampaignRequest};
use uuid::Uuid;

const CAMPAIGN_COLUMNS: &str =
    "id, title, client, market, category, mode, status, created_at, updated_at";

#[derive(Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, campaign: &Campaign) -> Result<Campaign, DbError> {
        let row = CampaignRow::from(campaign);

        sqlx::query(
            r#"
            INSERT INTO campaigns (id, title, client, market, category, mode, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(&row.client)
        .bind(&row.market)
        .bind(&row.category)
        .bind(&row.mode)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(campaign.clone())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, DbError> {
        let row: Option<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    pub async fn find_all(&self) -> Result<Vec<Campaign>, DbError> {
        let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateCampaignRequest,
    ) -> Result<Option<Campaign>, DbError> {
        let Some(mut campaign) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(title) = &update.title {
            campaign.title = title.clone();
        }
        if let Some(client) = &update.client {
            campaign.client = client.clone();
        }
        if let Some(market) = &update.market {
            campaign.market = market.clone();
        }
        if let Some(category) = &update.category {
            campaign.category = category.clone();
        }
        if let Some(mode) = update.mode {
            campaign.mode = mode;
        }
        if let Some(status) = update.status {
            campaign.status = status;
        }

        campaign.updated_at = Utc::now();
        let row = CampaignRow::from(&campaign);

        sqlx::query(
            r#"
            UPDATE campaigns
            SET title = ?, client = ?, market = ?, category = ?, mode = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.title)
        .bind(&row.client)
        .bind(&row.market)
        .bind(&row.category)
        .bind(&row.mode)
        .bind(&row.status)
        .bind(row.updated_at)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(campaign))
    }

    pub async fn set_status(&self, id: Uuid, status: CampaignStatus) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE campaigns SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(datetime_to_millis(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::CampaignNotFound(id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaigns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

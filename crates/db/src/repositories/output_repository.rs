use crate::error::DbError;
use crate::models::{datetime_to_millis, millis_to_datetime, OutputRow};
use chrono::Utc;
use sqlx::SqlitePool;
use trudy_core::{NewOutput, Output};
use uuid::Uuid;

const OUTPUT_COLUMNS: &str = "id, campaign_id, phase_run_id, type, content, params, created_at";

/// Append-only store of generated artifacts.
#[derive(Clone)]
pub struct OutputRepository {
    pool: SqlitePool,
}

impl OutputRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, output: &NewOutput) -> Result<Output, DbError> {
        let created_at = datetime_to_millis(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO outputs (campaign_id, phase_run_id, type, content, params, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(output.campaign_id.to_string())
        .bind(output.phase_run_id.map(|id| id.to_string()))
        .bind(&output.output_type)
        .bind(&output.content)
        .bind(output.params.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Output {
            id: result.last_insert_rowid(),
            campaign_id: output.campaign_id,
            phase_run_id: output.phase_run_id,
            output_type: output.output_type.clone(),
            content: output.content.clone(),
            params: output.params.clone(),
            created_at: millis_to_datetime(created_at),
        })
    }

    /// Outputs for a campaign, oldest first, optionally restricted to one type.
    pub async fn find_by_campaign(
        &self,
        campaign_id: Uuid,
        output_type: Option<&str>,
    ) -> Result<Vec<Output>, DbError> {
        let rows: Vec<OutputRow> = sqlx::query_as(&format!(
            r#"
            SELECT {OUTPUT_COLUMNS}
            FROM outputs
            WHERE campaign_id = ? AND (? IS NULL OR type = ?)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(campaign_id.to_string())
        .bind(output_type)
        .bind(output_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    pub async fn find_latest(
        &self,
        campaign_id: Uuid,
        output_type: &str,
    ) -> Result<Option<Output>, DbError> {
        let row: Option<OutputRow> = sqlx::query_as(&format!(
            r#"
            SELECT {OUTPUT_COLUMNS}
            FROM outputs
            WHERE campaign_id = ? AND type = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(campaign_id.to_string())
        .bind(output_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{seed_campaign, setup_test_db};
    use serde_json::json;
    use trudy_core::output_types;

    #[tokio::test]
    async fn test_latest_breaks_timestamp_ties_by_id() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = OutputRepository::new(pool.clone());

        repo.create(&NewOutput::new(campaign.id, output_types::FRAMING_NARRATIVE, "first"))
            .await
            .unwrap();
        let second = repo
            .create(&NewOutput::new(campaign.id, output_types::FRAMING_NARRATIVE, "second"))
            .await
            .unwrap();

        // Force identical timestamps.
        sqlx::query("UPDATE outputs SET created_at = 1000")
            .execute(&pool)
            .await
            .unwrap();

        let latest = repo
            .find_latest(campaign.id, output_types::FRAMING_NARRATIVE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.content, "second");
    }

    #[tokio::test]
    async fn test_find_by_campaign_filters_type() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = OutputRepository::new(pool);

        repo.create(
            &NewOutput::new(campaign.id, output_types::IDEA_ROUTES, "{}")
                .with_params(json!({"count": 3})),
        )
        .await
        .unwrap();
        repo.create(&NewOutput::new(campaign.id, output_types::OPINION, "Looks fine"))
            .await
            .unwrap();

        let all = repo.find_by_campaign(campaign.id, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let routes = repo
            .find_by_campaign(campaign.id, Some(output_types::IDEA_ROUTES))
            .await
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].params["count"], 3);
    }

    #[tokio::test]
    async fn test_latest_missing_type_is_none() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = OutputRepository::new(pool);

        let latest = repo
            .find_latest(campaign.id, output_types::JUDGE_VERDICT)
            .await
            .unwrap();
        assert!(latest.is_none());
    }
}

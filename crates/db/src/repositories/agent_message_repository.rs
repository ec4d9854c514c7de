use crate::error::DbError;
use crate::models::{datetime_to_millis, millis_to_datetime, AgentMessageRow};
use chrono::Utc;
use sqlx::SqlitePool;
use trudy_core::{AgentMessage, NewAgentMessage};
use uuid::Uuid;

#[derive(Clone)]
pub struct AgentMessageRepository {
    pool: SqlitePool,
}

impl AgentMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, message: &NewAgentMessage) -> Result<AgentMessage, DbError> {
        let created_at = datetime_to_millis(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO agent_messages (campaign_id, phase_run_id, agent, content, payload, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.campaign_id.to_string())
        .bind(message.phase_run_id.map(|id| id.to_string()))
        .bind(message.agent.as_str())
        .bind(&message.content)
        .bind(message.payload.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(AgentMessage {
            id: result.last_insert_rowid(),
            campaign_id: message.campaign_id,
            phase_run_id: message.phase_run_id,
            agent: message.agent.as_str().to_string(),
            content: message.content.clone(),
            payload: message.payload.clone(),
            created_at: millis_to_datetime(created_at),
        })
    }

    /// Oldest first.
    pub async fn find_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<AgentMessage>, DbError> {
        let rows: Vec<AgentMessageRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, phase_run_id, agent, content, payload, created_at
            FROM agent_messages
            WHERE campaign_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

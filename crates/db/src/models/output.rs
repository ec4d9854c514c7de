use serde_json::Value;
use trudy_core::{AgentMessage, Output};
use uuid::Uuid;

use super::{empty_object, millis_to_datetime, parse_json, parse_uuid};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutputRow {
    pub id: i64,
    pub campaign_id: String,
    pub phase_run_id: Option<String>,
    #[sqlx(rename = "type")]
    pub output_type: String,
    pub content: String,
    pub params: String,
    pub created_at: i64,
}

impl OutputRow {
    pub fn into_domain(self) -> Output {
        Output {
            id: self.id,
            campaign_id: parse_uuid(&self.campaign_id),
            phase_run_id: self.phase_run_id.and_then(|s| Uuid::parse_str(&s).ok()),
            output_type: self.output_type,
            content: self.content,
            params: parse_json(&self.params, empty_object()),
            created_at: millis_to_datetime(self.created_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentMessageRow {
    pub id: i64,
    pub campaign_id: String,
    pub phase_run_id: Option<String>,
    pub agent: String,
    pub content: String,
    pub payload: String,
    pub created_at: i64,
}

impl AgentMessageRow {
    pub fn into_domain(self) -> AgentMessage {
        AgentMessage {
            id: self.id,
            campaign_id: parse_uuid(&self.campaign_id),
            phase_run_id: self.phase_run_id.and_then(|s| Uuid::parse_str(&s).ok()),
            agent: self.agent,
            content: self.content,
            payload: parse_json(&self.payload, Value::Null),
            created_at: millis_to_datetime(self.created_at),
        }
    }
}

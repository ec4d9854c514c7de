use db::DbError;
use llm::LlmError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(Uuid),

    #[error("Brief not found for campaign: {0}")]
    BriefNotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Run '{label}' is already in progress for campaign {campaign_id}")]
    PhaseInProgress { campaign_id: Uuid, label: String },

    #[error("Model returned unusable output for {runner}: {reason}")]
    InvalidOutput { runner: &'static str, reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn invalid_output(runner: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOutput {
            runner,
            reason: reason.into(),
        }
    }
}

impl From<DbError> for OrchestratorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::CampaignNotFound(id) => Self::CampaignNotFound(id),
            DbError::PhaseRunActive { campaign_id, label } => {
                Self::PhaseInProgress { campaign_id, label }
            }
            other => Self::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::CoreError;

pub mod output_types {
    pub const FRAMING_NARRATIVE: &str = "framingNarrative";
    pub const IDEA_ROUTES: &str = "ideaRoutes";
    pub const EVALUATION_NARRATIVE: &str = "evaluationNarrative";
    pub const EVALUATION_SCORES: &str = "evaluationScores";
    pub const SYNTHESIS_NARRATIVE: &str = "synthesisNarrative";
    pub const STRATEGIST_NOTES: &str = "strategistNotes";
    pub const OPINION: &str = "opinion";
    pub const JUDGE_VERDICT: &str = "judgeVerdict";
}

/// An append-only generated artifact. The latest output of a type is the one
/// with the greatest `(created_at, id)`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Output {
    pub id: i64,
    pub campaign_id: Uuid,
    pub phase_run_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub output_type: String,
    pub content: String,
    pub params: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOutput {
    pub campaign_id: Uuid,
    pub phase_run_id: Option<Uuid>,
    pub output_type: String,
    pub content: String,
    pub params: Value,
}

impl NewOutput {
    pub fn new(campaign_id: Uuid, output_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            campaign_id,
            phase_run_id: None,
            output_type: output_type.into(),
            content: content.into(),
            params: Value::Object(Default::default()),
        }
    }

    pub fn with_phase_run(mut self, phase_run_id: Uuid) -> Self {
        self.phase_run_id = Some(phase_run_id);
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// Named prompt persona flavouring a model call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Agent {
    /// Strategy lead: framing and synthesis.
    Clara,
    /// Commercial realist: evaluation.
    Bruce,
    /// Creative lead: idea routes.
    Iris,
    Strategist,
    Judge,
    /// Knowledge lookups for brands and prizes.
    Researcher,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clara => "CLARA",
            Self::Bruce => "BRUCE",
            Self::Iris => "IRIS",
            Self::Strategist => "STRATEGIST",
            Self::Judge => "JUDGE",
            Self::Researcher => "RESEARCHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLARA" => Some(Self::Clara),
            "BRUCE" => Some(Self::Bruce),
            "IRIS" => Some(Self::Iris),
            "STRATEGIST" => Some(Self::Strategist),
            "JUDGE" => Some(Self::Judge),
            "RESEARCHER" => Some(Self::Researcher),
            _ => None,
        }
    }
}

impl std::str::FromStr for Agent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownVariant {
            kind: "agent",
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AgentMessage {
    pub id: i64,
    pub campaign_id: Uuid,
    pub phase_run_id: Option<Uuid>,
    pub agent: String,
    pub content: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAgentMessage {
    pub campaign_id: Uuid,
    pub phase_run_id: Option<Uuid>,
    pub agent: Agent,
    pub content: String,
    pub payload: Value,
}

impl NewAgentMessage {
    pub fn new(campaign_id: Uuid, agent: Agent, content: impl Into<String>) -> Self {
        Self {
            campaign_id,
            phase_run_id: None,
            agent,
            content: content.into(),
            payload: Value::Null,
        }
    }

    pub fn with_phase_run(mut self, phase_run_id: Uuid) -> Self {
        self.phase_run_id = Some(phase_run_id);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stage of the campaign pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Framing,
    Create,
    Evaluate,
    Synthesis,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Framing => "FRAMING",
            Self::Create => "CREATE",
            Self::Evaluate => "EVALUATE",
            Self::Synthesis => "SYNTHESIS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FRAMING" => Some(Self::Framing),
            "CREATE" => Some(Self::Create),
            "EVALUATE" => Some(Self::Evaluate),
            "SYNTHESIS" => Some(Self::Synthesis),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseRunStatus {
    #[default]
    Running,
    Complete,
    Failed,
    Abandoned,
}

impl PhaseRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Abandoned => "ABANDONED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RUNNING" => Some(Self::Running),
            "COMPLETE" => Some(Self::Complete),
            "FAILED" => Some(Self::Failed),
            "ABANDONED" => Some(Self::Abandoned),
            _ => None,
        }
    }
}

/// Log row for one orchestrator invocation. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PhaseRun {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub phase: Phase,
    pub status: PhaseRunStatus,
    /// Which runner produced the row (e.g. "judge"), since several share a phase.
    pub label: String,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PhaseRun {
    pub fn start(campaign_id: Uuid, phase: Phase, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            phase,
            status: PhaseRunStatus::Running,
            label: label.into(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = PhaseRunStatus::Complete;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = PhaseRunStatus::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parsing() {
        assert_eq!(Phase::parse("FRAMING"), Some(Phase::Framing));
        assert_eq!(Phase::parse("SYNTHESIS"), Some(Phase::Synthesis));
        assert_eq!(Phase::parse("framing"), None);
        assert_eq!(Phase::Evaluate.to_string(), "EVALUATE");
    }

    #[test]
    fn test_phase_run_lifecycle() {
        let mut run = PhaseRun::start(Uuid::new_v4(), Phase::Create, "create");
        assert_eq!(run.status, PhaseRunStatus::Running);
        assert!(run.finished_at.is_none());
        assert!(run.duration_ms().is_none());

        run.fail("provider timed out");
        assert_eq!(run.status, PhaseRunStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("provider timed out"));
        assert!(run.duration_ms().unwrap() >= 0);
    }
}

use trudy_core::{Phase, PhaseRun, PhaseRunStatus};

use super::{datetime_to_millis, millis_to_datetime, parse_uuid};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhaseRunRow {
    pub id: String,
    pub campaign_id: String,
    pub phase: String,
    pub status: String,
    pub label: String,
    pub error: Option<String>,
    pub started_at: i64,
    pub finished_at: Option<i64>,
}

impl PhaseRunRow {
    pub fn into_domain(self) -> PhaseRun {
        PhaseRun {
            id: parse_uuid(&self.id),
            campaign_id: parse_uuid(&self.campaign_id),
            phase: Phase::parse(&self.phase).unwrap_or(Phase::Framing),
            status: PhaseRunStatus::parse(&self.status).unwrap_or_default(),
            label: self.label,
            error: self.error,
            started_at: millis_to_datetime(self.started_at),
            finished_at: self.finished_at.map(millis_to_datetime),
        }
    }
}

impl From<&PhaseRun> for PhaseRunRow {
    fn from(run: &PhaseRun) -> Self {
        Self {
            id: run.id.to_string(),
            campaign_id: run.campaign_id.to_string(),
            phase: run.phase.as_str().to_string(),
            status: run.status.as_str().to_string(),
            label: run.label.clone(),
            error: run.error.clone(),
            started_at: datetime_to_millis(run.started_at),
            finished_at: run.finished_at.map(datetime_to_millis),
        }
    }
}

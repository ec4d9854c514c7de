//! The trait every phase runner implements.
//!
//! The [`Orchestrator`] owns the run lifecycle: it loads the campaign
//! context, records the phase run, moves the campaign status and handles
//! failure. Runners only build prompts and persist what the model returned.

use async_trait::async_trait;
use serde::Serialize;
use trudy_core::{CampaignStatus, HeuristicBreakdown, IdeaRoute, Output, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;

/// An idea route with its heuristic score.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScoredRoute {
    pub route: IdeaRoute,
    pub score: HeuristicBreakdown,
}

/// What a runner produced.
#[derive(Debug, Clone, Default)]
pub struct PhaseArtifacts {
    pub outputs: Vec<Output>,
    pub routes: Vec<ScoredRoute>,
}

impl PhaseArtifacts {
    pub fn output(output: Output) -> Self {
        Self {
            outputs: vec![output],
            routes: Vec::new(),
        }
    }
}

#[async_trait]
pub trait PhaseRunner: Send + Sync {
    fn phase(&self) -> Phase;

    /// Name the run is recorded under. At most one run per label is RUNNING
    /// for a campaign.
    fn label(&self) -> &'static str;

    /// Campaign status after a successful run.
    fn completion_status(&self) -> CampaignStatus {
        CampaignStatus::Review
    }

    /// Checks made before a run is recorded. An error here leaves no trace.
    async fn preflight(&self, _orch: &Orchestrator, _ctx: &CampaignContext) -> Result<()> {
        Ok(())
    }

    async fn execute(
        &self,
        orch: &Orchestrator,
        ctx: &CampaignContext,
        run: &PhaseRun,
    ) -> Result<PhaseArtifacts>;
}

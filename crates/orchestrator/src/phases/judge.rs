use async_trait::async_trait;
use tracing::warn;
use trudy_core::{markdown_to_html, output_types, Agent, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::{OrchestratorError, Result};
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::payloads::JudgePayload;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "judge";

/// Picks a winning idea route. Needs routes from a create run.
pub struct JudgePhase;

#[async_trait]
impl PhaseRunner for JudgePhase {
    fn phase(&self) -> Phase {
        Phase::Evaluate
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    async fn preflight(&self, orch: &Orchestrator, ctx: &CampaignContext) -> Result<()> {
        if orch.routes.find_by_campaign(ctx.campaign.id).await?.is_empty() {
            return Err(OrchestratorError::Validation(
                "no idea routes to judge; run create first".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute(
        &self,
        orch: &Orchestrator,
        ctx: &CampaignContext,
        run: &PhaseRun,
    ) -> Result<PhaseArtifacts> {
        let routes = orch.routes.find_by_campaign(ctx.campaign.id).await?;
        let scores: Vec<(String, u32)> = orch
            .scores
            .find_by_campaign(ctx.campaign.id)
            .await?
            .into_iter()
            .filter_map(|score| {
                routes
                    .iter()
                    .find(|r| r.id == score.route_id)
                    .map(|r| (r.name.clone(), score.total))
            })
            .collect();

        let model = orch.config().models.judge();
        let request = orch
            .request(ctx, run, Agent::Judge, model)
            .with_user(PhasePrompts::judge(ctx, &routes, &scores))
            .with_json();
        let content = orch.model().complete(request).await?;
        let payload: JudgePayload = ResponseParser::parse(LABEL, &content)?;

        let winner = routes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(payload.winner.trim()));
        if winner.is_none() {
            warn!(
                campaign_id = %ctx.campaign.id,
                winner = %payload.winner,
                "Judge picked a route that is not on file"
            );
        }

        let verdict = payload.verdict.trim().to_string();
        let mut params = serde_json::to_value(&payload)?;
        params["winnerRouteId"] = winner.map(|r| r.id.to_string()).into();
        params["html"] = markdown_to_html(&verdict).into();
        params["model"] = model.into();

        let output = orch
            .save_output(
                NewOutput::new(ctx.campaign.id, output_types::JUDGE_VERDICT, verdict.as_str())
                    .with_phase_run(run.id)
                    .with_params(params),
            )
            .await?;
        orch.record_message(run, Agent::Judge, &verdict, serde_json::to_value(&payload)?)
            .await?;

        Ok(PhaseArtifacts::output(output))
    }
}

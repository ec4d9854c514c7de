use async_trait::async_trait;
use serde_json::json;
use trudy_core::{markdown_to_html, output_types, Agent, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::payloads::EvaluationPayload;
use crate::phases::push_section;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "evaluation";

/// Critiques the stored idea routes, or the brief's own idea when there are
/// none.
pub struct EvaluationPhase;

#[async_trait]
impl PhaseRunner for EvaluationPhase {
    fn phase(&self) -> Phase {
        Phase::Evaluate
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    async fn execute(
        &self,
        orch: &Orchestrator,
        ctx: &CampaignContext,
        run: &PhaseRun,
    ) -> Result<PhaseArtifacts> {
        let routes = orch.routes.find_by_campaign(ctx.campaign.id).await?;
        let model = orch.config().models.evaluation();
        let request = orch
            .request(ctx, run, Agent::Bruce, model)
            .with_user(PhasePrompts::evaluation(ctx, &routes))
            .with_json();
        let content = orch.model().complete(request).await?;
        let payload: EvaluationPayload = ResponseParser::parse(LABEL, &content)?;

        let mut narrative = payload.summary.trim().to_string();
        push_section(&mut narrative, "Risks", &payload.risks);
        push_section(&mut narrative, "Recommendations", &payload.recommendations);

        let narrative_output = orch
            .save_output(
                NewOutput::new(ctx.campaign.id, output_types::EVALUATION_NARRATIVE, narrative.as_str())
                    .with_phase_run(run.id)
                    .with_params(json!({
                        "html": markdown_to_html(&narrative),
                        "overall": payload.overall,
                        "routeCount": routes.len(),
                        "model": model,
                    })),
            )
            .await?;
        let scores_output = orch
            .save_output(
                NewOutput::new(
                    ctx.campaign.id,
                    output_types::EVALUATION_SCORES,
                    serde_json::to_string(&payload.scores)?,
                )
                .with_phase_run(run.id)
                .with_params(json!({ "overall": payload.overall })),
            )
            .await?;

        orch.record_message(run, Agent::Bruce, &narrative, serde_json::to_value(&payload)?)
            .await?;

        Ok(PhaseArtifacts {
            outputs: vec![narrative_output, scores_output],
            routes: Vec::new(),
        })
    }
}

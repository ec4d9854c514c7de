use async_trait::async_trait;
use serde_json::json;
use tracing::warn;
use trudy_core::{
    markdown_to_html, output_types, polish_text, Agent, CampaignStatus, NewOutput, Output, Phase,
    PhaseRun,
};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::prompts::{PhasePrompts, SynthesisInputs};
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "synthesis";

/// Final recommendation drawn from the latest framing, evaluation, routes
/// and judge verdict. Completes the campaign.
pub struct SynthesisPhase;

#[async_trait]
impl PhaseRunner for SynthesisPhase {
    fn phase(&self) -> Phase {
        Phase::Synthesis
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    fn completion_status(&self) -> CampaignStatus {
        CampaignStatus::Complete
    }

    async fn execute(
        &self,
        orch: &Orchestrator,
        ctx: &CampaignContext,
        run: &PhaseRun,
    ) -> Result<PhaseArtifacts> {
        let id = ctx.campaign.id;
        let framing = orch.outputs.find_latest(id, output_types::FRAMING_NARRATIVE).await?;
        let evaluation = orch.outputs.find_latest(id, output_types::EVALUATION_NARRATIVE).await?;
        let idea_routes = orch.outputs.find_latest(id, output_types::IDEA_ROUTES).await?;
        let judge = orch.outputs.find_latest(id, output_types::JUDGE_VERDICT).await?;

        let inputs = SynthesisInputs {
            framing: content(&framing),
            evaluation: content(&evaluation),
            idea_routes: content(&idea_routes),
            judge: content(&judge),
        };

        let model = orch.config().models.synthesis();
        let request = orch
            .request(ctx, run, Agent::Clara, model)
            .with_user(PhasePrompts::synthesis(ctx, &inputs));
        let raw = ResponseParser::text(LABEL, &orch.model().complete(request).await?)?;
        let narrative = polish_text(&raw);

        let mut params = json!({
            "html": markdown_to_html(&narrative),
            "model": model,
            "sources": {
                "framing": framing.as_ref().map(|o| o.id),
                "evaluation": evaluation.as_ref().map(|o| o.id),
                "ideaRoutes": idea_routes.as_ref().map(|o| o.id),
                "judge": judge.as_ref().map(|o| o.id),
            },
        });

        if let Some(exporter) = orch.exporter() {
            match exporter
                .write_synthesis(id, &ctx.campaign.title, &narrative)
                .await
            {
                Ok(proof) => {
                    params["proofPath"] = json!(proof.proof_path);
                    params["proofUrl"] = json!(proof.proof_url);
                }
                Err(e) => warn!(campaign_id = %id, error = %e, "Synthesis proof export failed"),
            }
        }

        let output = orch
            .save_output(
                NewOutput::new(id, output_types::SYNTHESIS_NARRATIVE, narrative.as_str())
                    .with_phase_run(run.id)
                    .with_params(params),
            )
            .await?;
        orch.record_message(run, Agent::Clara, &narrative, json!({ "outputId": output.id }))
            .await?;

        Ok(PhaseArtifacts::output(output))
    }
}

fn content(output: &Option<Output>) -> Option<&str> {
    output.as_ref().map(|o| o.content.as_str())
}

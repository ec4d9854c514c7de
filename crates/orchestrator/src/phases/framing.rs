use async_trait::async_trait;
use serde_json::json;
use trudy_core::{markdown_to_html, output_types, Agent, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "framing";

pub struct FramingPhase;

#[async_trait]
impl PhaseRunner for FramingPhase {
    fn phase(&self) -> Phase {
        Phase::Framing
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
        let model = orch.config().models.framing();
        let request = orch
            .request(ctx, run, Agent::Clara, model)
            .with_user(PhasePrompts::framing(ctx));
        let narrative = ResponseParser::text(LABEL, &orch.model().complete(request).await?)?;

        let output = orch
            .save_output(
                NewOutput::new(ctx.campaign.id, output_types::FRAMING_NARRATIVE, narrative.as_str())
                    .with_phase_run(run.id)
                    .with_params(json!({
                        "html": markdown_to_html(&narrative),
                        "model": model,
                    })),
            )
            .await?;
        orch.record_message(run, Agent::Clara, &narrative, json!({ "outputId": output.id }))
            .await?;

        Ok(PhaseArtifacts::output(output))
    }
}

use async_trait::async_trait;
use trudy_core::{markdown_to_html, output_types, Agent, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::payloads::StrategistPayload;
use crate::phases::push_section;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "strategist";

pub struct StrategistPhase;

#[async_trait]
impl PhaseRunner for StrategistPhase {
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
        let evaluation = orch
            .outputs
            .find_latest(ctx.campaign.id, output_types::EVALUATION_NARRATIVE)
            .await?;

        let model = orch.config().models.evaluation();
        let request = orch
            .request(ctx, run, Agent::Strategist, model)
            .with_user(PhasePrompts::strategist(
                ctx,
                evaluation.as_ref().map(|o| o.content.as_str()),
            ))
            .with_json();
        let content = orch.model().complete(request).await?;
        let payload: StrategistPayload = ResponseParser::parse(LABEL, &content)?;

        let mut notes = payload.summary.trim().to_string();
        push_section(&mut notes, "Recommendations", &payload.recommendations);
        push_section(&mut notes, "Risks", &payload.risks);

        let mut params = serde_json::to_value(&payload)?;
        params["html"] = markdown_to_html(&notes).into();
        params["model"] = model.into();

        let output = orch
            .save_output(
                NewOutput::new(ctx.campaign.id, output_types::STRATEGIST_NOTES, notes.as_str())
                    .with_phase_run(run.id)
                    .with_params(params),
            )
            .await?;
        orch.record_message(run, Agent::Strategist, &notes, serde_json::to_value(&payload)?)
            .await?;

        Ok(PhaseArtifacts::output(output))
    }
}

use async_trait::async_trait;
use serde_json::json;
use trudy_core::{markdown_to_html, output_types, Agent, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner};

const LABEL: &str = "opinion";

/// A single agent's view, optionally answering a caller's question.
pub struct OpinionPhase {
    agent: Agent,
    question: Option<String>,
}

impl OpinionPhase {
    pub fn new(agent: Agent, question: Option<String>) -> Self {
        Self { agent, question }
    }
}

#[async_trait]
impl PhaseRunner for OpinionPhase {
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
        let model = orch.config().models.evaluation();
        let request = orch
            .request(ctx, run, self.agent, model)
            .with_user(PhasePrompts::opinion(ctx, self.question.as_deref()));
        let opinion = ResponseParser::text(LABEL, &orch.model().complete(request).await?)?;

        let output = orch
            .save_output(
                NewOutput::new(ctx.campaign.id, output_types::OPINION, opinion.as_str())
                    .with_phase_run(run.id)
                    .with_params(json!({
                        "agent": self.agent.as_str(),
                        "question": self.question,
                        "html": markdown_to_html(&opinion),
                        "model": model,
                    })),
            )
            .await?;
        orch.record_message(
            run,
            self.agent,
            &opinion,
            json!({ "outputId": output.id, "question": self.question }),
        )
        .await?;

        Ok(PhaseArtifacts::output(output))
    }
}

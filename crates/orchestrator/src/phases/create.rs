use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use trudy_core::{output_types, score_route, Agent, IdeaRoute, NewOutput, Phase, PhaseRun};

use crate::context::CampaignContext;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::parse::ResponseParser;
use crate::payloads::IdeaRoutesPayload;
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseArtifacts, PhaseRunner, ScoredRoute};

const LABEL: &str = "create";

/// Generates idea routes, stores each one and scores it against the
/// campaign rules.
pub struct CreatePhase;

#[async_trait]
impl PhaseRunner for CreatePhase {
    fn phase(&self) -> Phase {
        Phase::Create
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
        let model = orch.config().models.create();
        let request = orch
            .request(ctx, run, Agent::Iris, model)
            .with_user(PhasePrompts::create(ctx))
            .with_json();
        let content = orch.model().complete(request).await?;
        let payload: IdeaRoutesPayload = ResponseParser::parse(LABEL, &content)?;

        let mut routes = Vec::with_capacity(payload.routes.len());
        for item in &payload.routes {
            let mut route = IdeaRoute::new(ctx.campaign.id, item.name.trim());
            route.hook = item.hook.trim().to_string();
            route.mechanic = item.mechanic.trim().to_string();
            route.prize = item
                .prize
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string);
            route.rationale = item.rationale.trim().to_string();
            let route = orch.routes.upsert(&route).await?;

            let score = score_route(&route.hook, &route.mechanic, route.prize.as_deref(), &ctx.rules);
            orch.scores
                .upsert(ctx.campaign.id, route.id, score.total, &serde_json::to_value(&score)?)
                .await?;
            debug!(route = %route.name, total = score.total, "Route scored");

            routes.push(ScoredRoute { route, score });
        }

        let output = orch
            .save_output(
                NewOutput::new(
                    ctx.campaign.id,
                    output_types::IDEA_ROUTES,
                    serde_json::to_string_pretty(&payload)?,
                )
                .with_phase_run(run.id)
                .with_params(json!({
                    "summary": payload.summary,
                    "routeCount": routes.len(),
                    "missing": ctx.classification.missing,
                    "model": model,
                })),
            )
            .await?;

        let names: Vec<&str> = routes.iter().map(|r| r.route.name.as_str()).collect();
        orch.record_message(
            run,
            Agent::Iris,
            &format!("{} routes: {}", routes.len(), names.join(", ")),
            json!({ "outputId": output.id, "summary": payload.summary }),
        )
        .await?;

        Ok(PhaseArtifacts {
            outputs: vec![output],
            routes,
        })
    }
}

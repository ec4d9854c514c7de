use chrono::Utc;
use db::{
    with_retry, AgentMessageRepository, BriefRepository, CampaignRepository,
    HeuristicScoreRepository, IdeaRouteRepository, OutputRepository, PhaseRunRepository,
};
use llm::{ChatModel, ChatRequest};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use trudy_core::{
    Agent, AgentMessage, CampaignStatus, KnowledgeEntry, NewAgentMessage, NewOutput, Output,
    PhaseRun,
};
use uuid::Uuid;

use crate::context::CampaignContext;
use crate::enrich::ContextEnricher;
use crate::error::{OrchestratorError, Result};
use crate::export::ProofExporter;
use crate::knowledge::KnowledgeService;
use crate::phases::{
    CreatePhase, EvaluationPhase, FramingPhase, JudgePhase, OpinionPhase, StrategistPhase,
    SynthesisPhase,
};
use crate::prompts::PhasePrompts;
use crate::runner::{PhaseRunner, ScoredRoute};

pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_STALE_MINUTES: i64 = 15;
const DEFAULT_MAX_TOKENS: u32 = 2_000;

/// Model names per phase. Unset phases use `default`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub default: String,
    pub framing: Option<String>,
    pub create: Option<String>,
    pub evaluation: Option<String>,
    pub synthesis: Option<String>,
    pub judge: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelConfig {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            framing: None,
            create: None,
            evaluation: None,
            synthesis: None,
            judge: None,
        }
    }

    fn pick<'a>(&'a self, model: &'a Option<String>) -> &'a str {
        model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default)
    }

    pub fn framing(&self) -> &str {
        self.pick(&self.framing)
    }

    pub fn create(&self) -> &str {
        self.pick(&self.create)
    }

    /// Also used by the strategist and opinion runners.
    pub fn evaluation(&self) -> &str {
        self.pick(&self.evaluation)
    }

    pub fn synthesis(&self) -> &str {
        self.pick(&self.synthesis)
    }

    pub fn judge(&self) -> &str {
        self.pick(&self.judge)
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub models: ModelConfig,
    /// RUNNING rows older than this are abandoned before a new start.
    pub stale_after: Duration,
    /// Write synthesis proofs here when set.
    pub proof_export_dir: Option<PathBuf>,
    pub max_tokens: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            stale_after: Duration::from_secs(DEFAULT_STALE_MINUTES as u64 * 60),
            proof_export_dir: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_proof_export(mut self, dir: impl Into<PathBuf>) -> Self {
        self.proof_export_dir = Some(dir.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Result of a completed phase run.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PhaseOutcome {
    pub run: PhaseRun,
    pub outputs: Vec<Output>,
    pub routes: Vec<ScoredRoute>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResearchRefresh {
    pub brand: Option<KnowledgeEntry>,
    pub prize: Option<KnowledgeEntry>,
}

/// Runs campaign phases against a chat model and records the results.
pub struct Orchestrator {
    config: OrchestratorConfig,
    model: Arc<dyn ChatModel>,
    pub(crate) campaigns: CampaignRepository,
    pub(crate) briefs: BriefRepository,
    pub(crate) phase_runs: PhaseRunRepository,
    pub(crate) outputs: OutputRepository,
    pub(crate) messages: AgentMessageRepository,
    pub(crate) routes: IdeaRouteRepository,
    pub(crate) scores: HeuristicScoreRepository,
    enricher: ContextEnricher,
    knowledge: KnowledgeService,
    exporter: Option<ProofExporter>,
}

impl Orchestrator {
    pub fn new(pool: SqlitePool, model: Arc<dyn ChatModel>, config: OrchestratorConfig) -> Self {
        let knowledge =
            KnowledgeService::new(pool.clone(), Arc::clone(&model), config.models.default.clone());
        let exporter = config.proof_export_dir.clone().map(ProofExporter::new);

        Self {
            campaigns: CampaignRepository::new(pool.clone()),
            briefs: BriefRepository::new(pool.clone()),
            phase_runs: PhaseRunRepository::new(pool.clone()),
            outputs: OutputRepository::new(pool.clone()),
            messages: AgentMessageRepository::new(pool.clone()),
            routes: IdeaRouteRepository::new(pool.clone()),
            scores: HeuristicScoreRepository::new(pool.clone()),
            enricher: ContextEnricher::new(pool),
            knowledge,
            exporter,
            config,
            model,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }

    pub(crate) fn exporter(&self) -> Option<&ProofExporter> {
        self.exporter.as_ref()
    }

    /// Campaign and brief for a run, without enrichment. Missing campaign or
    /// brief is a not-found error.
    async fn load_bare_context(&self, campaign_id: Uuid) -> Result<CampaignContext> {
        let campaign = self
            .campaigns
            .find_by_id(campaign_id)
            .await?
            .ok_or(OrchestratorError::CampaignNotFound(campaign_id))?;
        let brief = self
            .briefs
            .find_by_campaign(campaign_id)
            .await?
            .ok_or(OrchestratorError::BriefNotFound(campaign_id))?;

        Ok(CampaignContext::build(campaign, brief))
    }

    pub async fn run_framing(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &FramingPhase).await
    }

    pub async fn run_create(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &CreatePhase).await
    }

    pub async fn run_evaluation(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &EvaluationPhase).await
    }

    pub async fn run_synthesis(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &SynthesisPhase).await
    }

    pub async fn run_strategist(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &StrategistPhase).await
    }

    pub async fn run_opinion(
        &self,
        campaign_id: Uuid,
        agent: Agent,
        question: Option<String>,
    ) -> Result<PhaseOutcome> {
        self.run(campaign_id, &OpinionPhase::new(agent, question)).await
    }

    pub async fn run_judge(&self, campaign_id: Uuid) -> Result<PhaseOutcome> {
        self.run(campaign_id, &JudgePhase).await
    }

    /// Re-ask the model about the brief's brand and prize, replacing any
    /// cached entries.
    pub async fn refresh_research(&self, campaign_id: Uuid) -> Result<ResearchRefresh> {
        let ctx = self.load_bare_context(campaign_id).await?;
        let market = ctx.market();

        let brand = match ctx.spec.brand.as_deref() {
            Some(brand) => self.knowledge.brand(brand, market, true).await,
            None => None,
        };
        let prize = match ctx.spec.prize.as_deref() {
            Some(prize) => self.knowledge.prize(prize, market, true).await,
            None => None,
        };

        info!(
            %campaign_id,
            brand = brand.is_some(),
            prize = prize.is_some(),
            "Research refreshed"
        );
        Ok(ResearchRefresh { brand, prize })
    }

    /// Preflight, stale cleanup and the run row all happen before enrichment,
    /// so a rejected start makes no model calls. Once the row exists, any
    /// failure marks both the run and the campaign FAILED.
    pub async fn run<R: PhaseRunner>(&self, campaign_id: Uuid, runner: &R) -> Result<PhaseOutcome> {
        let ctx = self.load_bare_context(campaign_id).await?;
        runner.preflight(self, &ctx).await?;

        let label = runner.label();
        let stale_after = chrono::Duration::from_std(self.config.stale_after)
            .unwrap_or_else(|_| chrono::Duration::minutes(DEFAULT_STALE_MINUTES));
        let abandoned = self
            .phase_runs
            .abandon_stale(campaign_id, label, Utc::now() - stale_after)
            .await?;
        if abandoned > 0 {
            warn!(%campaign_id, label, abandoned, "Abandoned stale phase runs");
        }

        let run = self
            .phase_runs
            .start(&PhaseRun::start(campaign_id, runner.phase(), label))
            .await?;

        info!(
            %campaign_id,
            run_id = %run.id,
            phase = %runner.phase(),
            label,
            "Phase run started"
        );

        match self.drive(runner, ctx, run.clone()).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let mut run = run;
                run.fail(err.to_string());
                error!(
                    %campaign_id,
                    run_id = %run.id,
                    label,
                    error = %err,
                    "Phase run failed"
                );

                if let Err(e) = self.phase_runs.finish(&run).await {
                    error!(run_id = %run.id, error = %e, "Failed to record phase run failure");
                }
                if let Err(e) = self
                    .campaigns
                    .set_status(campaign_id, CampaignStatus::Failed)
                    .await
                {
                    error!(%campaign_id, error = %e, "Failed to mark campaign failed");
                }

                Err(err)
            }
        }
    }

    /// Everything after the run row is recorded.
    async fn drive<R: PhaseRunner>(
        &self,
        runner: &R,
        ctx: CampaignContext,
        mut run: PhaseRun,
    ) -> Result<PhaseOutcome> {
        let campaign_id = run.campaign_id;
        let label = runner.label();

        with_retry("campaigns.set_status", || {
            self.campaigns.set_status(campaign_id, CampaignStatus::Running)
        })
        .await?;

        let ctx = self.enricher.enrich(ctx, &self.knowledge).await;
        let artifacts = runner.execute(self, &ctx, &run).await?;

        run.complete();
        with_retry("phase_runs.finish", || self.phase_runs.finish(&run)).await?;
        let status = runner.completion_status();
        with_retry("campaigns.set_status", || {
            self.campaigns.set_status(campaign_id, status)
        })
        .await?;

        info!(
            %campaign_id,
            run_id = %run.id,
            label,
            outputs = artifacts.outputs.len(),
            routes = artifacts.routes.len(),
            duration_ms = run.duration_ms().unwrap_or_default(),
            "Phase run complete"
        );

        Ok(PhaseOutcome {
            run,
            outputs: artifacts.outputs,
            routes: artifacts.routes,
        })
    }

    /// A chat request for a runner: agent persona as the system instruction
    /// and run identifiers in the log metadata.
    pub(crate) fn request(
        &self,
        ctx: &CampaignContext,
        run: &PhaseRun,
        agent: Agent,
        model: &str,
    ) -> ChatRequest {
        ChatRequest::new(model)
            .with_system(PhasePrompts::persona(agent))
            .with_max_tokens(self.config.max_tokens)
            .with_metadata("runner", run.label.as_str())
            .with_metadata("campaignId", ctx.campaign.id.to_string())
            .with_metadata("phaseRunId", run.id.to_string())
            .with_metadata("agent", agent.as_str())
    }

    pub(crate) async fn save_output(&self, output: NewOutput) -> Result<Output> {
        Ok(with_retry("outputs.create", || self.outputs.create(&output)).await?)
    }

    pub(crate) async fn record_message(
        &self,
        run: &PhaseRun,
        agent: Agent,
        content: &str,
        payload: Value,
    ) -> Result<AgentMessage> {
        let message = NewAgentMessage::new(run.campaign_id, agent, content)
            .with_phase_run(run.id)
            .with_payload(payload);
        Ok(with_retry("agent_messages.create", || self.messages.create(&message)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_briefed_campaign, setup_test_db, ScriptedModel};
    use serde_json::json;
    use trudy_core::{output_types, PhaseRunStatus};

    #[test]
    fn test_model_config_falls_back_to_default() {
        let mut models = ModelConfig::new("gpt-4o");
        models.judge = Some("gpt-5".to_string());
        models.create = Some("  ".to_string());

        assert_eq!(models.judge(), "gpt-5");
        assert_eq!(models.create(), "gpt-4o");
        assert_eq!(models.framing(), "gpt-4o");
    }

    #[tokio::test]
    async fn test_missing_campaign_and_brief_are_not_found() {
        let pool = setup_test_db().await;
        let orch = Orchestrator::new(
            pool.clone(),
            Arc::new(ScriptedModel::new()),
            OrchestratorConfig::default(),
        );

        let err = orch.run_framing(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::CampaignNotFound(_)));

        let campaign = trudy_core::Campaign::new("No brief", "Client");
        CampaignRepository::new(pool).create(&campaign).await.unwrap();
        let err = orch.run_framing(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::BriefNotFound(id) if id == campaign.id));
    }

    #[tokio::test]
    async fn test_failed_run_marks_run_and_campaign_failed() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        let model = ScriptedModel::new().fail("framing", "provider down");
        let orch = Orchestrator::new(pool.clone(), Arc::new(model), OrchestratorConfig::default());

        let err = orch.run_framing(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Llm(_)));

        let runs = PhaseRunRepository::new(pool.clone())
            .find_by_campaign(campaign.id)
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, PhaseRunStatus::Failed);
        assert!(runs[0].error.as_deref().unwrap_or_default().contains("provider down"));

        let stored = CampaignRepository::new(pool).find_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Failed);
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        PhaseRunRepository::new(pool.clone())
            .start(&PhaseRun::start(campaign.id, trudy_core::Phase::Framing, "framing"))
            .await
            .unwrap();

        let model = Arc::new(
            ScriptedModel::new()
                .on("framing", "## Frame")
                .on("strategist", llm::FAKE_RUN_RESPONSE),
        );
        let orch = Orchestrator::new(pool.clone(), model.clone(), OrchestratorConfig::default());

        let err = orch.run_framing(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::PhaseInProgress { ref label, .. } if label == "framing"));
        assert_eq!(model.calls(), 0);

        // Other runners on the same campaign are unaffected.
        orch.run_strategist(campaign.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_start_makes_no_model_calls() {
        let pool = setup_test_db().await;
        let campaign =
            seed_briefed_campaign(&pool, json!({"brand": "Grant Burge", "prize": "Weekend away"}))
                .await;
        PhaseRunRepository::new(pool.clone())
            .start(&PhaseRun::start(campaign.id, trudy_core::Phase::Framing, "framing"))
            .await
            .unwrap();

        let model = Arc::new(
            ScriptedModel::new()
                .on("framing", "## Frame")
                .on("knowledge", r#"{"summary": "Barossa winemaker."}"#),
        );
        let orch = Orchestrator::new(pool.clone(), model.clone(), OrchestratorConfig::default());

        let err = orch.run_framing(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::PhaseInProgress { .. }));

        let err = orch.run_judge(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Validation(_)));

        assert_eq!(model.calls(), 0);
        let cached = db::KnowledgeRepository::new(pool.clone())
            .find(trudy_core::KnowledgeKind::Brand, "grant-burge-au")
            .await
            .unwrap();
        assert!(cached.is_none());
        let runs = PhaseRunRepository::new(pool).find_by_campaign(campaign.id).await.unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_runs_after_start() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({"brand": "Grant Burge"})).await;
        let model = Arc::new(
            ScriptedModel::new()
                .on("framing", "## Frame")
                .on("knowledge", r#"{"summary": "Barossa winemaker."}"#),
        );
        let orch = Orchestrator::new(pool, model.clone(), OrchestratorConfig::default());

        orch.run_framing(campaign.id).await.unwrap();
        assert!(model.last_request("knowledge").is_some());
        let prompt = &model.last_request("framing").unwrap().messages[0].content;
        assert!(prompt.contains("Barossa winemaker."));
    }

    /// Blocks campaign status updates to `status` with a constraint error.
    async fn block_campaign_status(pool: &SqlitePool, status: &str) {
        sqlx::query(&format!(
            "CREATE TRIGGER block_status BEFORE UPDATE OF status ON campaigns \
             WHEN NEW.status = '{status}' BEGIN SELECT RAISE(ABORT, 'status blocked'); END"
        ))
        .execute(pool)
        .await
        .unwrap();
    }

    async fn unblock_campaign_status(pool: &SqlitePool) {
        sqlx::query("DROP TRIGGER block_status").execute(pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_failure_after_success_marks_run_failed() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        let model = Arc::new(ScriptedModel::new().on("framing", "## Frame"));
        let orch = Orchestrator::new(pool.clone(), model, OrchestratorConfig::default());

        block_campaign_status(&pool, "REVIEW").await;
        let err = orch.run_framing(campaign.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Database(_)));

        let runs = PhaseRunRepository::new(pool.clone());
        let recorded = runs.find_by_campaign(campaign.id).await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].status, PhaseRunStatus::Failed);
        let stored = CampaignRepository::new(pool.clone())
            .find_by_id(campaign.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, CampaignStatus::Failed);

        // The label is free again without waiting for the stale window.
        unblock_campaign_status(&pool).await;
        let outcome = orch.run_framing(campaign.id).await.unwrap();
        assert_eq!(outcome.run.status, PhaseRunStatus::Complete);
    }

    #[tokio::test]
    async fn test_status_failure_before_execute_marks_run_failed() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        let model = Arc::new(ScriptedModel::new().on("framing", "## Frame"));
        let orch = Orchestrator::new(pool.clone(), model.clone(), OrchestratorConfig::default());

        block_campaign_status(&pool, "RUNNING").await;
        orch.run_framing(campaign.id).await.unwrap_err();
        assert_eq!(model.calls(), 0);

        let recorded = PhaseRunRepository::new(pool.clone())
            .find_by_campaign(campaign.id)
            .await
            .unwrap();
        assert_eq!(recorded[0].status, PhaseRunStatus::Failed);

        unblock_campaign_status(&pool).await;
        orch.run_framing(campaign.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_run_is_abandoned_before_start() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        let runs = PhaseRunRepository::new(pool.clone());
        let mut stale = PhaseRun::start(campaign.id, trudy_core::Phase::Framing, "framing");
        stale.started_at = Utc::now() - chrono::Duration::minutes(30);
        runs.start(&stale).await.unwrap();

        let model = Arc::new(ScriptedModel::new().on("framing", "## Frame"));
        let orch = Orchestrator::new(pool.clone(), model, OrchestratorConfig::default());
        let outcome = orch.run_framing(campaign.id).await.unwrap();

        assert_eq!(outcome.run.status, PhaseRunStatus::Complete);
        assert_eq!(
            runs.find_by_id(stale.id).await.unwrap().unwrap().status,
            PhaseRunStatus::Abandoned
        );
    }

    #[tokio::test]
    async fn test_request_metadata_identifies_run() {
        let pool = setup_test_db().await;
        let campaign = seed_briefed_campaign(&pool, json!({})).await;
        let model = Arc::new(ScriptedModel::new().on("framing", "## Frame"));
        let orch = Orchestrator::new(pool, model.clone(), OrchestratorConfig::default());

        let outcome = orch.run_framing(campaign.id).await.unwrap();
        assert_eq!(outcome.outputs[0].output_type, output_types::FRAMING_NARRATIVE);

        let request = model.last_request("framing").unwrap();
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.metadata["campaignId"], json!(campaign.id.to_string()));
        assert_eq!(request.metadata["phaseRunId"], json!(outcome.run.id.to_string()));
        assert_eq!(request.system.as_deref(), Some(PhasePrompts::persona(Agent::Clara)));
    }
}

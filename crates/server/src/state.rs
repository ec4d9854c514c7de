use crate::config::Settings;
use db::{
    AgentMessageRepository, BenchmarkRepository, BriefRepository, CampaignRepository,
    FounderNoteRepository, HeuristicScoreRepository, IdeaRouteRepository, OutputRepository,
    PhaseRunRepository, PlaybookSnippetRepository,
};
use llm::{ChatGateway, ChatModel};
use orchestrator::Orchestrator;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pool: SqlitePool,
    pub campaign_repository: CampaignRepository,
    pub brief_repository: BriefRepository,
    pub output_repository: OutputRepository,
    pub phase_run_repository: PhaseRunRepository,
    pub agent_message_repository: AgentMessageRepository,
    pub idea_route_repository: IdeaRouteRepository,
    pub heuristic_score_repository: HeuristicScoreRepository,
    pub founder_note_repository: FounderNoteRepository,
    pub benchmark_repository: BenchmarkRepository,
    pub playbook_repository: PlaybookSnippetRepository,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// State backed by the HTTP gateway described by `settings`.
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        let gateway: Arc<dyn ChatModel> = Arc::new(ChatGateway::new(settings.gateway_config()));
        Self::with_model(pool, settings, gateway)
    }

    pub fn with_model(pool: SqlitePool, settings: Settings, model: Arc<dyn ChatModel>) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            pool.clone(),
            model,
            settings.orchestrator_config(),
        ));

        Self {
            settings: Arc::new(settings),
            campaign_repository: CampaignRepository::new(pool.clone()),
            brief_repository: BriefRepository::new(pool.clone()),
            output_repository: OutputRepository::new(pool.clone()),
            phase_run_repository: PhaseRunRepository::new(pool.clone()),
            agent_message_repository: AgentMessageRepository::new(pool.clone()),
            idea_route_repository: IdeaRouteRepository::new(pool.clone()),
            heuristic_score_repository: HeuristicScoreRepository::new(pool.clone()),
            founder_note_repository: FounderNoteRepository::new(pool.clone()),
            benchmark_repository: BenchmarkRepository::new(pool.clone()),
            playbook_repository: PlaybookSnippetRepository::new(pool.clone()),
            orchestrator,
            pool,
        }
    }
}

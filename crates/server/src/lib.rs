pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trudy API",
        version = "0.1.0",
        description = "Promotional campaign planning: briefs, model-driven phases and reference data"
    ),
    paths(
        routes::health_check,
        routes::list_campaigns,
        routes::create_campaign,
        routes::get_campaign,
        routes::update_campaign,
        routes::delete_campaign,
        routes::get_brief,
        routes::upsert_brief,
        routes::update_variants,
        routes::get_exceptions,
        routes::put_exceptions,
        routes::get_rules,
        routes::run_framing,
        routes::run_create,
        routes::run_evaluation,
        routes::run_synthesis,
        routes::run_strategist,
        routes::run_opinion,
        routes::run_judge,
        routes::refresh_research,
        routes::list_outputs,
        routes::get_latest_output,
        routes::list_phase_runs,
        routes::list_agent_messages,
        routes::list_idea_routes,
        routes::list_founder_notes,
        routes::upsert_founder_note,
        routes::list_benchmarks,
        routes::upsert_benchmark,
        routes::list_playbook_snippets,
        routes::upsert_playbook_snippet,
        routes::polish,
        routes::markdown,
        routes::market_code,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::BriefResponse,
        routes::UpdateVariantsRequest,
        routes::ExceptionsBody,
        routes::RulesResponse,
        routes::OpinionRequest,
        routes::IdeaRouteWithScore,
        routes::TextRequest,
        routes::PolishResponse,
        routes::MarkdownResponse,
        routes::MarketCodeResponse,
        error::ErrorResponse,
        error::ErrorBody,
        error::FieldError,
        orchestrator::PhaseOutcome,
        orchestrator::ResearchRefresh,
        orchestrator::ScoredRoute,
        trudy_core::Campaign,
        trudy_core::CampaignMode,
        trudy_core::CampaignStatus,
        trudy_core::CreateCampaignRequest,
        trudy_core::UpdateCampaignRequest,
        trudy_core::Brief,
        trudy_core::UpsertBriefRequest,
        trudy_core::BriefSpec,
        trudy_core::BriefClassification,
        trudy_core::BriefMode,
        trudy_core::CampaignRules,
        trudy_core::VariantDefinition,
        trudy_core::Output,
        trudy_core::AgentMessage,
        trudy_core::Agent,
        trudy_core::PhaseRun,
        trudy_core::Phase,
        trudy_core::PhaseRunStatus,
        trudy_core::IdeaRoute,
        trudy_core::HeuristicScore,
        trudy_core::HeuristicBreakdown,
        trudy_core::FounderNote,
        trudy_core::UpsertFounderNoteRequest,
        trudy_core::MarketCategoryBenchmark,
        trudy_core::PlaybookSnippet,
        trudy_core::KnowledgeEntry,
        trudy_core::KnowledgeKind,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "campaigns", description = "Campaign management endpoints"),
        (name = "briefs", description = "Brief, variants, exceptions and derived rules"),
        (name = "phases", description = "Model-driven phase runs"),
        (name = "outputs", description = "Generated outputs and run logs"),
        (name = "reference", description = "Founder notes, benchmarks and playbook snippets"),
        (name = "tools", description = "Stateless text helpers"),
    )
)]
pub struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: AppState) -> Router {
    let export_dir = state.settings.export_dir.clone();
    let cors = cors_layer(&state.settings.cors_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route(
            "/api/campaigns",
            get(routes::list_campaigns).post(routes::create_campaign),
        )
        .route(
            "/api/campaigns/{id}",
            get(routes::get_campaign)
                .patch(routes::update_campaign)
                .delete(routes::delete_campaign),
        )
        .route(
            "/api/campaigns/{id}/brief",
            get(routes::get_brief).post(routes::upsert_brief),
        )
        .route(
            "/api/campaigns/{id}/brief/variants",
            put(routes::update_variants),
        )
        .route(
            "/api/campaigns/{id}/exceptions",
            get(routes::get_exceptions).put(routes::put_exceptions),
        )
        .route("/api/campaigns/{id}/rules", get(routes::get_rules))
        .route("/api/campaigns/{id}/framing/run", post(routes::run_framing))
        .route("/api/campaigns/{id}/create/run", post(routes::run_create))
        .route(
            "/api/campaigns/{id}/evaluate/run",
            post(routes::run_evaluation),
        )
        .route(
            "/api/campaigns/{id}/synthesis/run",
            post(routes::run_synthesis),
        )
        .route(
            "/api/campaigns/{id}/strategist/run",
            post(routes::run_strategist),
        )
        .route("/api/campaigns/{id}/opinion/run", post(routes::run_opinion))
        .route("/api/campaigns/{id}/judge/run", post(routes::run_judge))
        .route(
            "/api/campaigns/{id}/research/refresh",
            post(routes::refresh_research),
        )
        .route("/api/campaigns/{id}/outputs", get(routes::list_outputs))
        .route(
            "/api/campaigns/{id}/outputs/latest/{type}",
            get(routes::get_latest_output),
        )
        .route(
            "/api/campaigns/{id}/phase-runs",
            get(routes::list_phase_runs),
        )
        .route(
            "/api/campaigns/{id}/agent-messages",
            get(routes::list_agent_messages),
        )
        .route(
            "/api/campaigns/{id}/idea-routes",
            get(routes::list_idea_routes),
        )
        .route(
            "/api/founder-notes",
            get(routes::list_founder_notes).post(routes::upsert_founder_note),
        )
        .route(
            "/api/benchmarks",
            get(routes::list_benchmarks).put(routes::upsert_benchmark),
        )
        .route(
            "/api/playbook-snippets",
            get(routes::list_playbook_snippets).put(routes::upsert_playbook_snippet),
        )
        .route("/api/tools/polish", post(routes::polish))
        .route("/api/tools/markdown", post(routes::markdown))
        .route("/api/tools/market-code", post(routes::market_code))
        .nest_service("/exports", ServeDir::new(export_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

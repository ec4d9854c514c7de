use axum::extract::State;
use axum::Json;
use orchestrator::{PhaseOutcome, ResearchRefresh};
use serde::Deserialize;
use trudy_core::Agent;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpinionRequest {
    /// Persona to answer as, e.g. `BRUCE`.
    pub agent: String,
    #[serde(default)]
    pub question: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/framing/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Framing narrative written", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_framing(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_framing(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/create/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Idea routes generated and scored", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_create(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_create(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/evaluate/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Evaluation written", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_evaluation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_evaluation(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/synthesis/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Synthesis written", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_synthesis(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_synthesis(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/strategist/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Strategist notes written", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_strategist(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_strategist(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/judge/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Routes judged", body = PhaseOutcome),
        (status = 400, description = "Campaign not ready", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Same run already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed or returned unusable output", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_judge(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let outcome = state.orchestrator.run_judge(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/opinion/run",
    params(("id" = Uuid, Path, description = "Campaign id")),
    request_body = OpinionRequest,
    responses(
        (status = 200, description = "Opinion recorded", body = PhaseOutcome),
        (status = 400, description = "Unknown agent", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse),
        (status = 409, description = "Opinion already in progress", body = ErrorResponse),
        (status = 502, description = "Model failed", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn run_opinion(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<OpinionRequest>,
) -> Result<Json<PhaseOutcome>, AppError> {
    let agent: Agent = payload.agent.parse()?;
    let question = payload
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let outcome = state.orchestrator.run_opinion(id, agent, question).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/research/refresh",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Brand and prize knowledge refreshed", body = ResearchRefresh),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "phases"
)]
pub async fn refresh_research(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ResearchRefresh>, AppError> {
    let refreshed = state.orchestrator.refresh_research(id).await?;
    Ok(Json(refreshed))
}

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trudy_core::{AgentMessage, HeuristicScore, IdeaRoute, Output, PhaseRun};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::campaigns::require_campaign;
use crate::error::{ApiPath, ApiQuery, AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct OutputsQuery {
    /// Only outputs of this type, e.g. `framingNarrative`.
    #[serde(default, rename = "type")]
    pub output_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaRouteWithScore {
    pub route: IdeaRoute,
    pub score: Option<HeuristicScore>,
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/outputs",
    params(("id" = Uuid, Path, description = "Campaign id"), OutputsQuery),
    responses(
        (status = 200, description = "Outputs, oldest first", body = [Output]),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    ),
    tag = "outputs"
)]
pub async fn list_outputs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<OutputsQuery>,
) -> Result<Json<Vec<Output>>, AppError> {
    require_campaign(&state, id).await?;

    let output_type = query
        .output_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let outputs = state
        .output_repository
        .find_by_campaign(id, output_type)
        .await?;
    Ok(Json(outputs))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/outputs/latest/{type}",
    params(
        ("id" = Uuid, Path, description = "Campaign id"),
        ("type" = String, Path, description = "Output type")
    ),
    responses(
        (status = 200, description = "Most recent output of the type", body = Output),
        (status = 404, description = "No such output", body = ErrorResponse)
    ),
    tag = "outputs"
)]
pub async fn get_latest_output(
    State(state): State<AppState>,
    ApiPath((id, output_type)): ApiPath<(Uuid, String)>,
) -> Result<Json<Output>, AppError> {
    require_campaign(&state, id).await?;

    state
        .output_repository
        .find_latest(id, &output_type)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No {} output for campaign: {}", output_type, id)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/phase-runs",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Phase run log", body = [PhaseRun]),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    ),
    tag = "outputs"
)]
pub async fn list_phase_runs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<PhaseRun>>, AppError> {
    require_campaign(&state, id).await?;
    let runs = state.phase_run_repository.find_by_campaign(id).await?;
    Ok(Json(runs))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/agent-messages",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Agent message audit log", body = [AgentMessage]),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    ),
    tag = "outputs"
)]
pub async fn list_agent_messages(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<AgentMessage>>, AppError> {
    require_campaign(&state, id).await?;
    let messages = state.agent_message_repository.find_by_campaign(id).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/idea-routes",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Idea routes with their heuristic scores", body = [IdeaRouteWithScore]),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    ),
    tag = "outputs"
)]
pub async fn list_idea_routes(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<IdeaRouteWithScore>>, AppError> {
    require_campaign(&state, id).await?;

    let routes = state.idea_route_repository.find_by_campaign(id).await?;
    let mut scores: HashMap<Uuid, HeuristicScore> = state
        .heuristic_score_repository
        .find_by_campaign(id)
        .await?
        .into_iter()
        .map(|s| (s.route_id, s))
        .collect();

    let mut listed: Vec<IdeaRouteWithScore> = routes
        .into_iter()
        .map(|route| {
            let score = scores.remove(&route.id);
            IdeaRouteWithScore { route, score }
        })
        .collect();
    listed.sort_by_key(|r| std::cmp::Reverse(r.score.as_ref().map_or(0, |s| s.total)));

    Ok(Json(listed))
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use trudy_core::{Brief, Campaign, CampaignMode, CreateCampaignRequest, UpdateCampaignRequest};
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError, ErrorResponse};
use crate::state::AppState;

pub(crate) async fn require_campaign(state: &AppState, id: Uuid) -> Result<Campaign, AppError> {
    state
        .campaign_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign not found: {}", id)))
}

pub(crate) async fn require_brief(state: &AppState, campaign_id: Uuid) -> Result<Brief, AppError> {
    state
        .brief_repository
        .find_by_campaign(campaign_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Brief not found for campaign: {}", campaign_id)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns",
    responses((status = 200, description = "All campaigns, newest first", body = [Campaign])),
    tag = "campaigns"
)]
pub async fn list_campaigns(State(state): State<AppState>) -> Result<Json<Vec<Campaign>>, AppError> {
    let campaigns = state.campaign_repository.find_all().await?;
    Ok(Json(campaigns))
}

#[utoipa::path(
    post,
    path = "/api/campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = Campaign),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::invalid("title", "Title cannot be empty"));
    }

    let campaign = Campaign::new(payload.title.trim(), payload.client.trim())
        .with_market(payload.market.trim())
        .with_category(payload.category.trim())
        .with_mode(payload.mode.unwrap_or(CampaignMode::Create));
    let created = state.campaign_repository.create(&campaign).await?;

    tracing::info!(campaign_id = %created.id, title = %created.title, "Campaign created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Campaign", body = Campaign),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "campaigns"
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Campaign>, AppError> {
    Ok(Json(require_campaign(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/campaigns/{id}",
    params(("id" = Uuid, Path, description = "Campaign id")),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "Updated campaign", body = Campaign),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "campaigns"
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCampaignRequest>,
) -> Result<Json<Campaign>, AppError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::invalid("title", "Title cannot be empty"));
    }

    match state.campaign_repository.update(id, &payload).await? {
        Some(campaign) => Ok(Json(campaign)),
        None => Err(AppError::NotFound(format!("Campaign not found: {}", id))),
    }
}

#[utoipa::path(
    delete,
    path = "/api/campaigns/{id}",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 204, description = "Campaign and its records deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "campaigns"
)]
pub async fn delete_campaign(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.campaign_repository.delete(id).await? {
        tracing::info!(campaign_id = %id, "Campaign deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Campaign not found: {}", id)))
    }
}

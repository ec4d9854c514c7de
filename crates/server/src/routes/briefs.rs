use axum::extract::State;
use axum::Json;
use db::with_retry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trudy_core::{
    build_campaign_rules, build_variant_assets, classify_brief, validate_variants, Brief,
    BriefClassification, CampaignMode, CampaignRules, CampaignStatus, SparkUpdate,
    UpdateCampaignRequest, UpsertBriefRequest, VariantDefinition, ASSET_EXCEPTIONS,
};
use utoipa::ToSchema;
use uuid::Uuid;

use super::campaigns::{require_brief, require_campaign};
use crate::error::{ApiJson, ApiPath, AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct BriefResponse {
    pub brief: Brief,
    pub classification: BriefClassification,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVariantsRequest {
    pub variants: Vec<VariantDefinition>,
    /// Absent keeps the stored `__spark`, `null` removes it.
    #[serde(default, rename = "__spark", deserialize_with = "present")]
    #[schema(value_type = Option<Object>)]
    pub spark: Option<Value>,
}

/// Distinguishes an explicit `null` (`Some(Null)`) from an absent field (`None`).
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExceptionsBody {
    pub exceptions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RulesResponse {
    pub rules: CampaignRules,
    pub classification: BriefClassification,
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/brief",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Stored brief", body = Brief),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn get_brief(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Brief>, AppError> {
    require_campaign(&state, id).await?;
    Ok(Json(require_brief(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/brief",
    params(("id" = Uuid, Path, description = "Campaign id")),
    request_body = UpsertBriefRequest,
    responses(
        (status = 200, description = "Brief saved and classified", body = BriefResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn upsert_brief(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpsertBriefRequest>,
) -> Result<Json<BriefResponse>, AppError> {
    require_campaign(&state, id).await?;

    let parsed = match payload.parsed_json {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value @ Value::Object(_)) => value,
        Some(_) => return Err(AppError::invalid("parsedJson", "parsedJson must be an object")),
    };
    let assets = match payload.assets {
        Some(value @ Value::Object(_)) => Some(value),
        None | Some(Value::Null) => None,
        Some(_) => return Err(AppError::invalid("assets", "assets must be an object")),
    };

    let existing = state.brief_repository.find_by_campaign(id).await?;
    let mut brief = Brief::new(id, payload.raw_text, parsed);
    brief.assets = assets
        .or_else(|| existing.map(|b| b.assets))
        .unwrap_or_else(|| Value::Object(Map::new()));

    let saved = with_retry("briefs.upsert", || state.brief_repository.upsert(&brief)).await?;
    let classification = classify_brief(&saved.spec());

    let update = UpdateCampaignRequest {
        mode: Some(CampaignMode::from(classification.mode)),
        status: Some(CampaignStatus::Briefed),
        ..Default::default()
    };
    with_retry("campaigns.update", || state.campaign_repository.update(id, &update)).await?;

    tracing::info!(
        campaign_id = %id,
        mode = ?classification.mode,
        missing = ?classification.missing,
        "Brief saved"
    );
    Ok(Json(BriefResponse {
        brief: saved,
        classification,
    }))
}

#[utoipa::path(
    put,
    path = "/api/campaigns/{id}/brief/variants",
    params(("id" = Uuid, Path, description = "Campaign id")),
    request_body = UpdateVariantsRequest,
    responses(
        (status = 200, description = "Brief with rewritten variants", body = Brief),
        (status = 400, description = "Invalid variants", body = ErrorResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn update_variants(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateVariantsRequest>,
) -> Result<Json<Brief>, AppError> {
    validate_variants(&payload.variants)?;
    let brief = require_brief(&state, id).await?;

    let assets = build_variant_assets(
        &brief.assets,
        &payload.variants,
        SparkUpdate::from_field(payload.spark),
    );
    save_assets(&state, id, &assets).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/exceptions",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Exceptions recorded on the brief", body = ExceptionsBody),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn get_exceptions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ExceptionsBody>, AppError> {
    let brief = require_brief(&state, id).await?;
    Ok(Json(ExceptionsBody {
        exceptions: brief.asset_strings(ASSET_EXCEPTIONS),
    }))
}

#[utoipa::path(
    put,
    path = "/api/campaigns/{id}/exceptions",
    params(("id" = Uuid, Path, description = "Campaign id")),
    request_body = ExceptionsBody,
    responses(
        (status = 200, description = "Exceptions replaced", body = ExceptionsBody),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn put_exceptions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ExceptionsBody>,
) -> Result<Json<ExceptionsBody>, AppError> {
    let brief = require_brief(&state, id).await?;

    let exceptions: Vec<String> = payload
        .exceptions
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    let mut assets = match brief.assets {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    assets.insert(
        ASSET_EXCEPTIONS.to_string(),
        Value::Array(exceptions.iter().cloned().map(Value::String).collect()),
    );

    save_assets(&state, id, &Value::Object(assets)).await?;
    Ok(Json(ExceptionsBody { exceptions }))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/rules",
    params(("id" = Uuid, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Derived campaign rules", body = RulesResponse),
        (status = 404, description = "No campaign or brief", body = ErrorResponse)
    ),
    tag = "briefs"
)]
pub async fn get_rules(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<RulesResponse>, AppError> {
    let campaign = require_campaign(&state, id).await?;
    let brief = require_brief(&state, id).await?;
    let spec = brief.spec();

    Ok(Json(RulesResponse {
        rules: build_campaign_rules(&spec, &campaign.market),
        classification: classify_brief(&spec),
    }))
}

async fn save_assets(state: &AppState, id: Uuid, assets: &Value) -> Result<Brief, AppError> {
    with_retry("briefs.update_assets", || {
        state.brief_repository.update_assets(id, assets)
    })
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Brief not found for campaign: {}", id)))
}

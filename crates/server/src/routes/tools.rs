//! Stateless text helpers exposed for the UI.

use axum::Json;
use serde::{Deserialize, Serialize};
use trudy_core::{markdown_to_html, normalise_market_code, polish_text};
use utoipa::ToSchema;

use crate::error::{ApiJson, AppError, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolishResponse {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkdownResponse {
    pub html: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarketCodeResponse {
    pub code: String,
}

#[utoipa::path(
    post,
    path = "/api/tools/polish",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Polished text", body = PolishResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "tools"
)]
pub async fn polish(ApiJson(payload): ApiJson<TextRequest>) -> Result<Json<PolishResponse>, AppError> {
    Ok(Json(PolishResponse {
        text: polish_text(&payload.text),
    }))
}

#[utoipa::path(
    post,
    path = "/api/tools/markdown",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Rendered HTML", body = MarkdownResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "tools"
)]
pub async fn markdown(
    ApiJson(payload): ApiJson<TextRequest>,
) -> Result<Json<MarkdownResponse>, AppError> {
    Ok(Json(MarkdownResponse {
        html: markdown_to_html(&payload.text),
    }))
}

#[utoipa::path(
    post,
    path = "/api/tools/market-code",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Normalised market code", body = MarketCodeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "tools"
)]
pub async fn market_code(
    ApiJson(payload): ApiJson<TextRequest>,
) -> Result<Json<MarketCodeResponse>, AppError> {
    Ok(Json(MarketCodeResponse {
        code: normalise_market_code(&payload.text),
    }))
}

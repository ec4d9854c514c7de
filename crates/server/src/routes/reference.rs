use axum::extract::State;
use axum::Json;
use db::with_retry;
use serde::Deserialize;
use trudy_core::{
    normalise_market_code, FounderNote, MarketCategoryBenchmark, PlaybookSnippet,
    UpsertFounderNoteRequest,
};
use utoipa::IntoParams;

use crate::error::{ApiJson, ApiQuery, AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FounderNotesQuery {
    pub market: Option<String>,
    pub category: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/founder-notes",
    params(FounderNotesQuery),
    responses((status = 200, description = "Notes for the market and category, plus global notes", body = [FounderNote])),
    tag = "reference"
)]
pub async fn list_founder_notes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FounderNotesQuery>,
) -> Result<Json<Vec<FounderNote>>, AppError> {
    let market = non_blank(query.market.as_deref()).map(normalise_market_code);
    let category = non_blank(query.category.as_deref());

    let notes = state
        .founder_note_repository
        .find_for(market.as_deref(), category)
        .await?;
    Ok(Json(notes))
}

#[utoipa::path(
    post,
    path = "/api/founder-notes",
    request_body = UpsertFounderNoteRequest,
    responses(
        (status = 200, description = "Note stored", body = FounderNote),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "reference"
)]
pub async fn upsert_founder_note(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<UpsertFounderNoteRequest>,
) -> Result<Json<FounderNote>, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::invalid("title", "Title cannot be empty"));
    }
    if payload.body.trim().is_empty() {
        return Err(AppError::invalid("body", "Body cannot be empty"));
    }
    payload.market = non_blank(payload.market.as_deref()).map(normalise_market_code);
    payload.category = non_blank(payload.category.as_deref()).map(str::to_string);

    let note = with_retry("founder_notes.upsert", || {
        state.founder_note_repository.upsert(&payload)
    })
    .await?;
    Ok(Json(note))
}

#[utoipa::path(
    get,
    path = "/api/benchmarks",
    responses((status = 200, description = "All market/category benchmarks", body = [MarketCategoryBenchmark])),
    tag = "reference"
)]
pub async fn list_benchmarks(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketCategoryBenchmark>>, AppError> {
    let benchmarks = state.benchmark_repository.find_all().await?;
    Ok(Json(benchmarks))
}

#[utoipa::path(
    put,
    path = "/api/benchmarks",
    request_body = MarketCategoryBenchmark,
    responses(
        (status = 200, description = "Benchmark stored", body = MarketCategoryBenchmark),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "reference"
)]
pub async fn upsert_benchmark(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<MarketCategoryBenchmark>,
) -> Result<Json<MarketCategoryBenchmark>, AppError> {
    if payload.market.trim().is_empty() {
        return Err(AppError::invalid("market", "Market cannot be empty"));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::invalid("category", "Category cannot be empty"));
    }
    payload.market = normalise_market_code(&payload.market);
    payload.category = payload.category.trim().to_string();
    payload.updated_at = chrono::Utc::now();

    let stored = with_retry("benchmarks.upsert", || {
        state.benchmark_repository.upsert(&payload)
    })
    .await?;
    Ok(Json(stored))
}

#[utoipa::path(
    get,
    path = "/api/playbook-snippets",
    responses((status = 200, description = "All playbook snippets", body = [PlaybookSnippet])),
    tag = "reference"
)]
pub async fn list_playbook_snippets(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaybookSnippet>>, AppError> {
    let snippets = state.playbook_repository.find_all().await?;
    Ok(Json(snippets))
}

#[utoipa::path(
    put,
    path = "/api/playbook-snippets",
    request_body = PlaybookSnippet,
    responses(
        (status = 200, description = "Snippet stored", body = PlaybookSnippet),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "reference"
)]
pub async fn upsert_playbook_snippet(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<PlaybookSnippet>,
) -> Result<Json<PlaybookSnippet>, AppError> {
    if payload.key.trim().is_empty() {
        return Err(AppError::invalid("key", "Key cannot be empty"));
    }
    payload.key = payload.key.trim().to_string();
    payload.tags.retain(|t| !t.trim().is_empty());
    payload.updated_at = chrono::Utc::now();

    let stored = with_retry("playbook_snippets.upsert", || {
        state.playbook_repository.upsert(&payload)
    })
    .await?;
    Ok(Json(stored))
}

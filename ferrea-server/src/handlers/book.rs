//! Book lookup handlers

use super::{correlation_id, Detail};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use ferrea_core::BookRecord;

type LookupResult = Result<Json<BookRecord>, (StatusCode, Json<Detail>)>;

fn not_found(detail: &'static str) -> (StatusCode, Json<Detail>) {
    (StatusCode::NOT_FOUND, Json(Detail { detail }))
}

/// Look an ISBN up across every configured provider
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    headers: HeaderMap,
) -> LookupResult {
    let ctx = state.request_context(correlation_id(&headers).as_deref());

    state
        .aggregator
        .lookup(&isbn, &ctx)
        .await
        .map(Json)
        .ok_or_else(|| not_found("not found"))
}

/// Look an ISBN up with one named provider
pub async fn get_book_from(
    State(state): State<AppState>,
    Path((name, isbn)): Path<(String, String)>,
    headers: HeaderMap,
) -> LookupResult {
    let ctx = state.request_context(correlation_id(&headers).as_deref());

    let Some(provider) = state.aggregator.provider(&name) else {
        tracing::debug!(provider = %name, "unknown provider requested");
        return Err(not_found("unknown provider"));
    };

    state
        .aggregator
        .lookup_with(provider, &isbn, &ctx)
        .await
        .map(Json)
        .ok_or_else(|| not_found("not found"))
}

use crate::error::AppResult;
use crate::models::{CustomRequest, ShortenRequest};
use crate::services::links;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect};
use serde_json::json;
use std::sync::Arc;

use super::helpers::AppJson;
use super::AppState;

/// Static acknowledgment
pub async fn index() -> impl IntoResponse {
    (StatusCode::ACCEPTED, Json(json!({ "message": "Hello World!" })))
}

/// Create a short URL under a generated code
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<ShortenRequest>,
) -> AppResult<impl IntoResponse> {
    let response = links::shorten(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Create a short URL under a caller-chosen code
pub async fn custom(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CustomRequest>,
) -> AppResult<impl IntoResponse> {
    let response = links::shorten_custom(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Count the visit and redirect permanently to the long URL
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> AppResult<Redirect> {
    let long_url = links::visit(state.store.as_ref(), &code, state.enforce_expiry).await?;
    Ok(Redirect::permanent(&long_url))
}

/// Visit statistics for a code
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let response = links::stats(state.store.as_ref(), &code).await?;
    Ok(Json(response))
}

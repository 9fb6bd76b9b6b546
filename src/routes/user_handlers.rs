use crate::error::AppResult;
use crate::models::{ApiKeyRequest, ApiKeyResponse, GenerateUserResponse};
use crate::services::accounts;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use std::sync::Arc;

use super::helpers::AppJson;
use super::AppState;

/// Issue a new user ID and API key
pub async fn generate_user(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let user = accounts::register(&state).await?;
    Ok((StatusCode::CREATED, Json(GenerateUserResponse::from(user))))
}

/// Look up the API key of a user
pub async fn get_api_key(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<ApiKeyRequest>,
) -> AppResult<impl IntoResponse> {
    let api_key = accounts::api_key_for(state.store.as_ref(), &payload.user_id).await?;
    Ok(Json(ApiKeyResponse { api_key }))
}

//! Short link creation, redirect counting and statistics.

use crate::db::UrlRepository;
use crate::error::{AppError, AppResult};
use crate::models::{CustomRequest, ShortenRequest, ShortenResponse, StatsResponse, UrlRecord, UserRecord};
use crate::services::accounts;
use crate::state::AppState;
use crate::util::compose_short_url;
use chrono::{Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url as UrlParser;
use uuid::Uuid;
use validator::Validate;

/// Custom codes are limited to the generator alphabet so they stay a single path segment.
static CUSTOM_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code pattern is valid"));

/// Codes shadowed by the router's static paths.
pub const RESERVED_CODES: &[&str] = &[
    "shorten",
    "custom",
    "stats",
    "generateUser",
    "getAPIKey",
    "_health",
];

pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Check that `raw` is an absolute URL.
pub fn validate_long_url(raw: &str, strict: bool) -> AppResult<()> {
    let parsed = UrlParser::parse(raw)
        .map_err(|e| AppError::InvalidInput(format!("Invalid URL: {}", e)))?;

    if strict && !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidInput(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_custom_code(request: &CustomRequest) -> AppResult<()> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(format!("Validation failed: {}", e)))?;

    if !CUSTOM_CODE_PATTERN.is_match(&request.custom_code) {
        return Err(AppError::InvalidInput(
            "Custom code may only contain letters, digits, underscores or hyphens".to_string(),
        ));
    }

    if is_reserved_code(&request.custom_code) {
        return Err(AppError::InvalidInput(format!(
            "Custom code is reserved: {}",
            request.custom_code
        )));
    }

    Ok(())
}

/// Create a short link under a generated code.
pub async fn shorten(state: &AppState, request: ShortenRequest) -> AppResult<ShortenResponse> {
    validate_long_url(&request.long_url, state.strict_url_validation)?;

    let code = state.ids.generate()?;
    let owner = accounts::authorize(state.store.as_ref(), &request.user_id, &request.api_key).await?;

    create_link(state, code, request.long_url, request.url_category, owner).await
}

/// Create a short link under a caller-chosen code.
pub async fn shorten_custom(state: &AppState, request: CustomRequest) -> AppResult<ShortenResponse> {
    validate_long_url(&request.long_url, state.strict_url_validation)?;
    validate_custom_code(&request)?;

    let owner = accounts::authorize(state.store.as_ref(), &request.user_id, &request.api_key).await?;

    create_link(
        state,
        request.custom_code,
        request.long_url,
        request.url_category,
        owner,
    )
    .await
}

/// Insert the record; a taken code surfaces as `Conflict` from the store.
async fn create_link(
    state: &AppState,
    code: String,
    long_url: String,
    url_category: String,
    owner: UserRecord,
) -> AppResult<ShortenResponse> {
    if is_reserved_code(&code) {
        return Err(AppError::Conflict(format!("Code in use: {}", code)));
    }

    let now = Utc::now();
    let record = UrlRecord {
        id: Uuid::new_v4(),
        short_url: compose_short_url(&state.base_url, &code),
        url_code: code,
        long_url,
        url_category,
        count: 0,
        created_at: now,
        expires_at: now + Duration::days(state.expiry_days),
    };

    state.store.insert_url(&record).await?;

    info!(
        code = %record.url_code,
        user_id = %owner.user_id,
        "short link created"
    );

    Ok(ShortenResponse::new(record, owner.user_id))
}

/// Count one visit to `code` and return the target URL.
pub async fn visit<R>(urls: &R, code: &str, enforce_expiry: bool) -> AppResult<String>
where
    R: UrlRepository + ?Sized,
{
    let live_at = enforce_expiry.then(Utc::now);
    let record = urls
        .record_visit(code, live_at)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No URL with code: {}", code)))?;

    debug!(code, long_url = %record.long_url, previous_count = record.count, "redirecting");
    Ok(record.long_url)
}

/// Current statistics for `code`.
pub async fn stats<R>(urls: &R, code: &str) -> AppResult<StatsResponse>
where
    R: UrlRepository + ?Sized,
{
    urls.find_url(code)
        .await?
        .map(StatsResponse::from)
        .ok_or_else(|| AppError::NotFound(format!("No URL with code: {}", code)))
}

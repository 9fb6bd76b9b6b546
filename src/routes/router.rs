use crate::config::RateLimitConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::{request_id_middleware, ClientIpKeyExtractor};
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::url_handlers;
use super::user_handlers;
use super::AppState;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Create application router
pub fn create_router(
    state: Arc<AppState>,
    allowed_origins: Vec<String>,
    rate_limit_config: RateLimitConfig,
) -> AppResult<axum::Router> {
    // Rate limiting for endpoints that write or reveal credentials
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(60000 / rate_limit_config.requests_per_minute)
        .burst_size(rate_limit_config.burst_size)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .ok_or_else(|| AppError::Configuration("Invalid rate limit settings".to_string()))?;
    let governor_layer = GovernorLayer::new(governor_config);

    // Configure CORS with specific origins
    let cors = if allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| s.parse::<http::HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let limited_routes = axum::Router::new()
        .route("/shorten", post(url_handlers::shorten))
        .route("/custom", post(url_handlers::custom))
        .route("/generateUser", get(user_handlers::generate_user))
        .route("/getAPIKey", post(user_handlers::get_api_key))
        .layer(governor_layer);

    // Redirects stay unthrottled
    let public_routes = axum::Router::new()
        .route("/", get(url_handlers::index))
        .route("/{code}", get(url_handlers::redirect))
        .route("/stats/{code}", get(url_handlers::get_stats))
        .route("/_health", get(health::health_check));

    let router = limited_routes
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    Ok(router)
}

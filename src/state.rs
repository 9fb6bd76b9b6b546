use crate::config::UrlConfig;
use crate::db::Store;
use crate::error::AppResult;
use crate::services::identifier::{IdGenerator, NanoIdGenerator};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Wrapped in `Arc` and handed to every handler through Axum's State
/// extraction. The store and generator are built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// URL and user documents
    pub store: Arc<dyn Store>,

    /// Source of codes, user IDs and API keys
    pub ids: Arc<dyn IdGenerator>,

    /// Base URL for constructing short URLs (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Lifetime of newly created short URLs, in days
    pub expiry_days: i64,

    /// Whether redirects refuse expired links
    pub enforce_expiry: bool,

    /// Whether long URLs must use http:// or https://
    pub strict_url_validation: bool,
}

impl AppState {
    /// Build state from URL settings with the default `nanoid` generator.
    pub fn new(store: Arc<dyn Store>, url: &UrlConfig) -> AppResult<Self> {
        let ids = NanoIdGenerator::new(url.short_code_length)?;
        Ok(Self::with_generator(store, Arc::new(ids), url))
    }

    pub fn with_generator(
        store: Arc<dyn Store>,
        ids: Arc<dyn IdGenerator>,
        url: &UrlConfig,
    ) -> Self {
        Self {
            store,
            ids,
            base_url: url.base_url.clone(),
            expiry_days: url.expiry_days,
            enforce_expiry: url.enforce_expiry,
            strict_url_validation: url.strict_url_validation,
        }
    }
}

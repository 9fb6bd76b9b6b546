//! Persistence for URL and user documents.
//!
//! Both backends enforce uniqueness of `url_code`, `user_id` and `api_key`
//! at insert time and report violations as [`AppError::Conflict`].

pub mod memory;
pub mod postgres;

use crate::config::DatabaseConfig;
use crate::error::AppResult;
use crate::models::{UrlRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// `DATABASE_URL` prefix selecting the in-process store
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Access to short link documents.
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Look up a record by code. `None` when no document matches.
    async fn find_url(&self, url_code: &str) -> AppResult<Option<UrlRecord>>;

    /// Insert a new record; `Conflict` if the code is taken.
    async fn insert_url(&self, record: &UrlRecord) -> AppResult<()>;

    /// Atomically increment the visit counter and return the document as it
    /// was before the increment.
    ///
    /// With `live_at` set, records expired at that instant are treated as
    /// absent and left untouched.
    async fn record_visit(
        &self,
        url_code: &str,
        live_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<UrlRecord>>;

    /// Remove every record whose expiry is at or before `now`.
    async fn delete_expired_urls(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Access to API key holders.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_api_key(&self, api_key: &str) -> AppResult<Option<UserRecord>>;

    async fn find_user_by_user_id(&self, user_id: &str) -> AppResult<Option<UserRecord>>;

    /// Insert a new user; `Conflict` if the user ID or API key is taken.
    async fn insert_user(&self, user: &UserRecord) -> AppResult<()>;
}

/// A complete backend, injected into handlers through `AppState`.
#[async_trait]
pub trait Store: UrlRepository + UserRepository {
    /// Short name for logs
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;

    async fn run_migrations(&self) -> AppResult<()>;

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<StoreSummary>;
}

/// Aggregate counts used by the admin `stats` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub active_urls: i64,
    pub expired_urls: i64,
    pub total_users: i64,
}

/// Open the backend named by the connection string.
pub async fn connect(config: &DatabaseConfig) -> AppResult<Arc<dyn Store>> {
    if config.url.starts_with(MEMORY_URL_SCHEME) {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::new(
        &config.url,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_seconds,
    )
    .await?;

    Ok(Arc::new(store))
}

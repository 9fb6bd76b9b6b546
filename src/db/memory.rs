//! In-process store used for local runs and tests.

use super::{Store, StoreSummary, UrlRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{UrlRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// Store keeping every document in concurrent maps.
///
/// Each map entry is locked while it is read and modified, which gives
/// `insert_url` and `record_visit` the same atomicity as the database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    urls: Arc<DashMap<String, UrlRecord>>,
    users: Arc<DashMap<String, UserRecord>>,
    /// api_key -> user_id
    api_keys: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryStore {
    async fn find_url(&self, url_code: &str) -> AppResult<Option<UrlRecord>> {
        Ok(self.urls.get(url_code).map(|entry| entry.value().clone()))
    }

    async fn insert_url(&self, record: &UrlRecord) -> AppResult<()> {
        match self.urls.entry(record.url_code.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Code in use: {}",
                record.url_code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn record_visit(
        &self,
        url_code: &str,
        live_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<UrlRecord>> {
        let Some(mut entry) = self.urls.get_mut(url_code) else {
            return Ok(None);
        };

        if live_at.is_some_and(|now| entry.is_expired(now)) {
            return Ok(None);
        }

        let before = entry.value().clone();
        entry.count += 1;
        Ok(Some(before))
    }

    async fn delete_expired_urls(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut deleted = 0u64;
        self.urls.retain(|_, record| {
            let expired = record.is_expired(now);
            if expired {
                deleted += 1;
            }
            !expired
        });
        Ok(deleted)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_api_key(&self, api_key: &str) -> AppResult<Option<UserRecord>> {
        let Some(user_id) = self.api_keys.get(api_key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        self.find_user_by_user_id(&user_id).await
    }

    async fn find_user_by_user_id(&self, user_id: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn insert_user(&self, user: &UserRecord) -> AppResult<()> {
        // Reserve the key first, then the user ID; lock order is always api_keys -> users.
        match self.api_keys.entry(user.api_key.clone()) {
            Entry::Occupied(_) => return Err(AppError::Conflict("api key in use".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.user_id.clone());
            }
        }

        match self.users.entry(user.user_id.clone()) {
            Entry::Occupied(_) => {
                self.api_keys.remove(&user.api_key);
                Err(AppError::Conflict(format!("user id in use: {}", user.user_id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn run_migrations(&self) -> AppResult<()> {
        Ok(())
    }

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<StoreSummary> {
        let mut summary = StoreSummary {
            total_users: self.users.len() as i64,
            ..StoreSummary::default()
        };

        for entry in self.urls.iter() {
            summary.total_urls += 1;
            summary.total_clicks += entry.count;
            if entry.is_expired(now) {
                summary.expired_urls += 1;
            } else {
                summary.active_urls += 1;
            }
        }

        Ok(summary)
    }
}

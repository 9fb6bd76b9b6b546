//! API key holders: creation, lookup and request authorization.

use crate::db::UserRepository;
use crate::error::{AppError, AppResult};
use crate::models::UserRecord;
use crate::state::AppState;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Resolve the user owning `api_key` and check it is `user_id`.
pub async fn authorize<R>(users: &R, user_id: &str, api_key: &str) -> AppResult<UserRecord>
where
    R: UserRepository + ?Sized,
{
    match users.find_user_by_api_key(api_key).await? {
        Some(user) if user.user_id == user_id => Ok(user),
        _ => {
            warn!(user_id, "API key rejected");
            Err(AppError::Unauthorized(format!("API KEY Invalid for : {}", user_id)))
        }
    }
}

/// Create a user with a fresh user ID and API key.
///
/// A collision on either value surfaces as `Conflict`; no retry is made.
pub async fn register(state: &AppState) -> AppResult<UserRecord> {
    let user_id = state.ids.generate()?;
    let api_key = state.ids.generate()?;

    let user = UserRecord {
        id: Uuid::new_v4(),
        user_id,
        api_key,
        created_at: Utc::now(),
        expires_at: None,
    };
    state.store.insert_user(&user).await?;

    info!(user_id = %user.user_id, "user created");
    Ok(user)
}

/// Return the API key issued to `user_id`.
pub async fn api_key_for<R>(users: &R, user_id: &str) -> AppResult<String>
where
    R: UserRepository + ?Sized,
{
    users
        .find_user_by_user_id(user_id)
        .await?
        .map(|user| user.api_key)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::NotFound(format!("No user with id: {}", user_id)))
}

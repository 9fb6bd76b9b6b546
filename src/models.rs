use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::util::format_expiry;

/// Short link document
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: Uuid,
    pub url_code: String,
    pub long_url: String,
    pub short_url: String,
    pub url_category: String,
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UrlRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// API key holder
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub user_id: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body of `POST /shorten`
#[derive(Debug, Clone, Deserialize)]
pub struct ShortenRequest {
    #[serde(rename = "longUrl")]
    pub long_url: String,

    #[serde(rename = "urlCategory", default)]
    pub url_category: String,

    #[serde(rename = "userId")]
    pub user_id: String,

    pub api_key: String,
}

/// Body of `POST /custom`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomRequest {
    #[serde(rename = "longUrl")]
    pub long_url: String,

    #[serde(rename = "customCode")]
    #[validate(length(min = 3, message = "Custom code should be at least 3 characters"))]
    pub custom_code: String,

    #[serde(rename = "urlCategory", default)]
    pub url_category: String,

    #[serde(rename = "userId")]
    pub user_id: String,

    pub api_key: String,
}

/// Body of `POST /getAPIKey`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response after creating a short URL
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    #[serde(rename = "newUrl")]
    pub new_url: String,

    #[serde(rename = "urlCategory")]
    pub url_category: String,

    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub expires: String,

    pub db_id: Uuid,
    pub count: i64,
    pub userid: String,
}

impl ShortenResponse {
    pub fn new(record: UrlRecord, user_id: String) -> Self {
        ShortenResponse {
            new_url: record.short_url,
            url_category: record.url_category,
            expires: format_expiry(record.expires_at),
            db_id: record.id,
            count: record.count,
            userid: user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateUserResponse {
    #[serde(rename = "User_id")]
    pub user_id: String,
    pub api_key: String,
    pub message: String,
}

impl From<UserRecord> for GenerateUserResponse {
    fn from(user: UserRecord) -> Self {
        GenerateUserResponse {
            user_id: user.user_id,
            api_key: user.api_key,
            message: "use following api key for auth".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    #[serde(rename = "API_KEY")]
    pub api_key: String,
}

/// Visit statistics for one code
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(rename = "Long Url")]
    pub long_url: String,

    /// Counter rendered as a decimal string
    #[serde(rename = "Clicks")]
    pub clicks: String,

    pub category: String,
}

impl From<UrlRecord> for StatsResponse {
    fn from(record: UrlRecord) -> Self {
        StatsResponse {
            long_url: record.long_url,
            clicks: record.count.to_string(),
            category: record.url_category,
        }
    }
}

use super::{Store, StoreSummary, UrlRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{UrlRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use std::str::FromStr;
use std::time::Duration;

const USERS_API_KEY_CONSTRAINT: &str = "users_api_key_key";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store with a connection pool
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_seconds: u64,
    ) -> AppResult<Self> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Configuration(format!("Invalid database URL: {}", e)))?
            .disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

/// Map a unique-constraint violation to `Conflict`, leaving other failures as
/// database errors.
fn conflict_or(err: sqlx::Error, describe: impl FnOnce(Option<&str>) -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(describe(db_err.constraint()));
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl UrlRepository for PgStore {
    async fn find_url(&self, url_code: &str) -> AppResult<Option<UrlRecord>> {
        let result = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, url_code, long_url, short_url, url_category, count, created_at, expires_at
            FROM urls
            WHERE url_code = $1
            "#,
        )
        .bind(url_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn insert_url(&self, record: &UrlRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO urls (id, url_code, long_url, short_url, url_category, count, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&record.url_code)
        .bind(&record.long_url)
        .bind(&record.short_url)
        .bind(&record.url_category)
        .bind(record.count)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, |_| format!("Code in use: {}", record.url_code)))?;

        Ok(())
    }

    async fn record_visit(
        &self,
        url_code: &str,
        live_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<UrlRecord>> {
        // A single statement so concurrent redirects never lose an increment.
        let result = sqlx::query_as::<_, UrlRecord>(
            r#"
            UPDATE urls
            SET count = count + 1
            WHERE url_code = $1
              AND ($2::timestamptz IS NULL OR expires_at > $2)
            RETURNING id, url_code, long_url, short_url, url_category,
                      count - 1 AS count, created_at, expires_at
            "#,
        )
        .bind(url_code)
        .bind(live_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn delete_expired_urls(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM urls WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_api_key(&self, api_key: &str) -> AppResult<Option<UserRecord>> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, user_id, api_key, created_at, expires_at
            FROM users
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn find_user_by_user_id(&self, user_id: &str) -> AppResult<Option<UserRecord>> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, user_id, api_key, created_at, expires_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn insert_user(&self, user: &UserRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, user_id, api_key, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.user_id)
        .bind(&user.api_key)
        .bind(user.created_at)
        .bind(user.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_or(e, |constraint| match constraint {
                Some(USERS_API_KEY_CONSTRAINT) => "api key in use".to_string(),
                _ => format!("user id in use: {}", user.user_id),
            })
        })?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<StoreSummary> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total_urls,
                COALESCE(CAST(SUM(count) AS BIGINT), 0) AS total_clicks,
                COUNT(*) FILTER (WHERE expires_at > $1) AS active_urls,
                COUNT(*) FILTER (WHERE expires_at <= $1) AS expired_urls
            FROM urls
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreSummary {
            total_urls: row.0,
            total_clicks: row.1,
            active_urls: row.2,
            expired_urls: row.3,
            total_users,
        })
    }
}

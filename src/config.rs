use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub url: UrlConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string, or `memory://` for the in-process store
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    /// Length of generated codes, user IDs and API keys
    pub short_code_length: usize,
    pub base_url: String,
    /// Whether `base_url` came from `BASE_URL` rather than host and port
    pub base_url_explicit: bool,
    pub expiry_days: i64,
    pub enforce_expiry: bool,
    pub strict_url_validation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: u64,
    pub burst_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Configuration(format!("Invalid LOG_FORMAT: {}", other))),
        }
    }
}

/// Read `name`, falling back to `default`, and parse it.
fn parse_var<T: FromStr>(name: &str, default: &str) -> AppResult<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port: u16 = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("Invalid SERVER_PORT".to_string()))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", "10")?;
        let db_min_connections = parse_var("DB_MIN_CONNECTIONS", "1")?;
        let db_acquire_timeout = parse_var("DB_ACQUIRE_TIMEOUT_SECONDS", "30")?;

        let (base_url, base_url_explicit) = match env::var("BASE_URL") {
            Ok(url) => (url, true),
            Err(_) => (format!("http://{}:{}", server_host, server_port), false),
        };
        let short_code_length = parse_var("SHORT_CODE_LENGTH", "8")?;
        let expiry_days = parse_var("URL_EXPIRY_DAYS", "5")?;
        let enforce_expiry = parse_var("ENFORCE_EXPIRY", "true")?;
        let strict_url_validation = parse_var("STRICT_URL_VALIDATION", "false")?;

        // Rate limit config
        let requests_per_minute = parse_var("RATE_LIMIT_PER_MINUTE", "60")?;
        let burst_size = parse_var("RATE_LIMIT_BURST", "10")?;

        // CORS config
        let allowed_origins_str = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let allowed_origins = parse_origins(&allowed_origins_str);

        let log_format = parse_var("LOG_FORMAT", "text")?;

        let config = Config {
            server: ServerConfig {
                host: server_host,
                port: server_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
                acquire_timeout_seconds: db_acquire_timeout,
            },
            url: UrlConfig {
                short_code_length,
                base_url,
                base_url_explicit,
                expiry_days,
                enforce_expiry,
                strict_url_validation,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute,
                burst_size,
            },
            cors: CorsConfig { allowed_origins },
            log: LogConfig { format: log_format },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::Configuration(
                "DB_MIN_CONNECTIONS cannot be greater than DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if self.database.acquire_timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "DB_ACQUIRE_TIMEOUT_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.url.short_code_length < 4 || self.url.short_code_length > 16 {
            return Err(AppError::Configuration(
                "SHORT_CODE_LENGTH must be between 4 and 16".to_string(),
            ));
        }

        if self.url.expiry_days < 1 {
            return Err(AppError::Configuration(
                "URL_EXPIRY_DAYS must be at least 1".to_string(),
            ));
        }

        if url::Url::parse(&self.url.base_url).is_err() {
            return Err(AppError::Configuration(
                "BASE_URL must be an absolute URL".to_string(),
            ));
        }

        // The governor period is 60000 / requests_per_minute milliseconds.
        if self.rate_limit.requests_per_minute == 0 || self.rate_limit.requests_per_minute > 60_000
        {
            return Err(AppError::Configuration(
                "RATE_LIMIT_PER_MINUTE must be between 1 and 60000".to_string(),
            ));
        }

        if self.rate_limit.burst_size == 0 {
            return Err(AppError::Configuration(
                "RATE_LIMIT_BURST must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Split a comma separated origin list; `*` allows any origin.
pub fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        vec!["*".to_string()]
    } else {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

//! Integration tests for the curelink HTTP API.
//!
//! Each test drives the real router over an in-memory store.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use curelink::config::{RateLimitConfig, UrlConfig};
use curelink::db::{MemoryStore, Store, UrlRepository};
use curelink::models::UrlRecord;
use curelink::routes::create_router;
use curelink::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const LONG_URL: &str = "https://example.com/articles/2024/a-rather-long-slug?ref=home";

fn url_config() -> UrlConfig {
    UrlConfig {
        short_code_length: 8,
        base_url: "https://sho.rt".to_string(),
        base_url_explicit: true,
        expiry_days: 5,
        enforce_expiry: true,
        strict_url_validation: false,
    }
}

fn test_app() -> (TestServer, Arc<MemoryStore>) {
    test_app_with(RateLimitConfig {
        requests_per_minute: 60_000,
        burst_size: 1_000,
    })
}

fn test_app_with(rate_limit: RateLimitConfig) -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), &url_config()).unwrap();
    let router = create_router(Arc::new(state), vec!["*".to_string()], rate_limit).unwrap();

    (TestServer::new(router).unwrap(), store)
}

fn link(code: &str) -> UrlRecord {
    let now = Utc::now();
    UrlRecord {
        id: Uuid::new_v4(),
        url_code: code.to_string(),
        long_url: LONG_URL.to_string(),
        short_url: format!("https://sho.rt/{}", code),
        url_category: String::new(),
        count: 0,
        created_at: now,
        expires_at: now + Duration::days(5),
    }
}

/// Create a user and return (userId, api_key)
async fn register(server: &TestServer) -> (String, String) {
    let response = server.get("/generateUser").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    (
        body["User_id"].as_str().unwrap().to_string(),
        body["api_key"].as_str().unwrap().to_string(),
    )
}

fn code_of(new_url: &str) -> String {
    new_url.rsplit('/').next().unwrap().to_string()
}

mod general {
    use super::*;

    #[tokio::test]
    async fn test_index_acknowledges() {
        let (server, _) = test_app();

        let response = server.get("/").await;
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        assert_eq!(response.json::<Value>()["message"], "Hello World!");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (server, _) = test_app();

        let response = server
            .get("/")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-42"),
            )
            .await;
        assert_eq!(response.header("x-request-id"), "req-42");

        let response = server.get("/").await;
        assert_eq!(response.header("x-request-id").len(), 36);
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let (server, _) = test_app();

        let response = server.get("/_health").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request_json() {
        let (server, _) = test_app();

        let response = server
            .post("/shorten")
            .json(&json!({ "longUrl": "https://example.com" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let (server, store) = test_app();
        let (user_id, api_key) = register(&server).await;

        let long_url = format!("https://example.com/{}", "a".repeat(20 * 1024));
        let response = server
            .post("/shorten")
            .json(&json!({
                "longUrl": long_url,
                "urlCategory": "",
                "userId": user_id,
                "api_key": api_key,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.json::<Value>()["error"].is_string());
        assert_eq!(store.summary(Utc::now()).await.unwrap().total_urls, 0);
    }
}

mod throttling {
    use super::*;

    fn tight_limits() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute: 1,
            burst_size: 2,
        }
    }

    async fn generate_user_from(server: &TestServer, client_ip: &'static str) -> StatusCode {
        server
            .get("/generateUser")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_static(client_ip),
            )
            .await
            .status_code()
    }

    #[tokio::test]
    async fn test_burst_exhaustion_returns_too_many_requests() {
        let (server, _) = test_app_with(tight_limits());

        let mut statuses = Vec::new();
        for _ in 0..4 {
            statuses.push(generate_user_from(&server, "198.51.100.1").await);
        }
        assert_eq!(
            statuses,
            vec![
                StatusCode::CREATED,
                StatusCode::CREATED,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS,
            ]
        );
    }

    #[tokio::test]
    async fn test_clients_have_separate_buckets() {
        let (server, _) = test_app_with(tight_limits());

        for _ in 0..3 {
            generate_user_from(&server, "198.51.100.1").await;
        }
        assert_eq!(
            generate_user_from(&server, "198.51.100.1").await,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            generate_user_from(&server, "198.51.100.2").await,
            StatusCode::CREATED
        );
    }

    #[tokio::test]
    async fn test_redirects_are_not_throttled() {
        let (server, store) = test_app_with(tight_limits());
        store.insert_url(&link("popular")).await.unwrap();

        for _ in 0..10 {
            let response = server.get("/popular").await;
            assert_eq!(response.status_code(), StatusCode::PERMANENT_REDIRECT);
        }

        let stats = server.get("/stats/popular").await.json::<Value>();
        assert_eq!(stats["Clicks"], "10");
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn test_generate_user_response_shape() {
        let (server, _) = test_app();

        let response = server.get("/generateUser").await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body = response.json::<Value>();
        assert_eq!(body["User_id"].as_str().unwrap().len(), 8);
        assert_eq!(body["api_key"].as_str().unwrap().len(), 8);
        assert_eq!(body["message"], "use following api key for auth");
    }

    #[tokio::test]
    async fn test_get_api_key_returns_issued_key() {
        let (server, _) = test_app();
        let (user_id, api_key) = register(&server).await;

        let response = server
            .post("/getAPIKey")
            .json(&json!({ "userId": user_id }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["API_KEY"], api_key);
    }

    #[tokio::test]
    async fn test_get_api_key_for_unknown_user() {
        let (server, _) = test_app();

        let response = server
            .post("/getAPIKey")
            .json(&json!({ "userId": "nobody" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("nobody"));
    }
}

mod links {
    use super::*;

    #[tokio::test]
    async fn test_shorten_then_redirect() {
        let (server, _) = test_app();
        let (user_id, api_key) = register(&server).await;

        let response = server
            .post("/shorten")
            .json(&json!({
                "longUrl": LONG_URL,
                "urlCategory": "news",
                "userId": user_id,
                "api_key": api_key,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body = response.json::<Value>();
        let new_url = body["newUrl"].as_str().unwrap();
        assert!(new_url.starts_with("https://sho.rt/"));
        assert_eq!(body["urlCategory"], "news");
        assert_eq!(body["count"], 0);
        assert_eq!(body["userid"], user_id.as_str());
        assert!(Uuid::parse_str(body["db_id"].as_str().unwrap()).is_ok());
        assert_eq!(body["expires"].as_str().unwrap().len(), "YYYY-MM-DD HH:MM:SS".len());

        let code = code_of(new_url);
        let response = server.get(&format!("/{}", code)).await;
        assert_eq!(response.status_code(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.header("location"), LONG_URL);

        let stats = server.get(&format!("/stats/{}", code)).await;
        assert_eq!(stats.json::<Value>()["Clicks"], "1");
    }

    #[tokio::test]
    async fn test_repeated_redirects_accumulate() {
        let (server, _) = test_app();
        let (user_id, api_key) = register(&server).await;

        let body = server
            .post("/custom")
            .json(&json!({
                "longUrl": LONG_URL,
                "customCode": "counted",
                "urlCategory": "stats",
                "userId": user_id,
                "api_key": api_key,
            }))
            .await
            .json::<Value>();
        assert_eq!(body["newUrl"], "https://sho.rt/counted");

        for _ in 0..5 {
            let response = server.get("/counted").await;
            assert_eq!(response.status_code(), StatusCode::PERMANENT_REDIRECT);
        }

        let response = server.get("/stats/counted").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let stats = response.json::<Value>();
        assert_eq!(stats["Long Url"], LONG_URL);
        assert_eq!(stats["Clicks"], "5");
        assert_eq!(stats["category"], "stats");
    }

    #[tokio::test]
    async fn test_custom_code_minimum_length() {
        let (server, _) = test_app();
        let (user_id, api_key) = register(&server).await;

        let request = |code: &str| {
            json!({
                "longUrl": LONG_URL,
                "customCode": code,
                "urlCategory": "",
                "userId": user_id,
                "api_key": api_key,
            })
        };

        let response = server.post("/custom").json(&request("ab")).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = server.post("/custom").json(&request("abc")).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_route_names_cannot_be_custom_codes() {
        let (server, store) = test_app();
        let (user_id, api_key) = register(&server).await;

        for code in ["shorten", "custom", "generateUser", "getAPIKey", "_health"] {
            let response = server
                .post("/custom")
                .json(&json!({
                    "longUrl": LONG_URL,
                    "customCode": code,
                    "urlCategory": "",
                    "userId": user_id,
                    "api_key": api_key,
                }))
                .await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            assert!(store.find_url(code).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_mismatched_key_is_unauthorized() {
        let (server, store) = test_app();
        let (alice, _) = register(&server).await;
        let (_, bob_key) = register(&server).await;

        let response = server
            .post("/shorten")
            .json(&json!({
                "longUrl": LONG_URL,
                "urlCategory": "",
                "userId": alice,
                "api_key": bob_key,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            format!("API KEY Invalid for : {}", alice)
        );

        let response = server
            .post("/custom")
            .json(&json!({
                "longUrl": LONG_URL,
                "customCode": "stolen",
                "urlCategory": "",
                "userId": alice,
                "api_key": "not-a-key",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(store.find_url("stolen").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_taken_code_conflicts() {
        let (server, store) = test_app();
        let (user_id, api_key) = register(&server).await;

        store
            .insert_url(&UrlRecord {
                long_url: "https://first.example".to_string(),
                ..link("xyz123")
            })
            .await
            .unwrap();

        let response = server
            .post("/custom")
            .json(&json!({
                "longUrl": LONG_URL,
                "customCode": "xyz123",
                "urlCategory": "",
                "userId": user_id,
                "api_key": api_key,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Code in use: xyz123");

        let existing = store.find_url("xyz123").await.unwrap().unwrap();
        assert_eq!(existing.long_url, "https://first.example");
    }

    #[tokio::test]
    async fn test_invalid_long_url() {
        let (server, _) = test_app();
        let (user_id, api_key) = register(&server).await;

        let response = server
            .post("/shorten")
            .json(&json!({
                "longUrl": "not a url",
                "urlCategory": "",
                "userId": user_id,
                "api_key": api_key,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let (server, _) = test_app();

        let response = server.get("/stats/missing").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "No URL with code: missing");

        let response = server.get("/missing").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_expired_link_is_not_redirected() {
        let (server, store) = test_app();

        let now = Utc::now();
        store
            .insert_url(&UrlRecord {
                id: Uuid::new_v4(),
                url_code: "old".to_string(),
                long_url: LONG_URL.to_string(),
                short_url: "https://sho.rt/old".to_string(),
                url_category: String::new(),
                count: 3,
                created_at: now - Duration::days(10),
                expires_at: now - Duration::days(5),
            })
            .await
            .unwrap();

        let response = server.get("/old").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let stats = server.get("/stats/old").await.json::<Value>();
        assert_eq!(stats["Clicks"], "3");
    }
}

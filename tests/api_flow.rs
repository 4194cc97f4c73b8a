//! HTTP integration tests for the gateway router.
//!
//! Every test builds a fresh router over the in-memory store and drives it
//! with `oneshot`, so no server or database is required.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

use music_catalog::catalog::{CatalogIndex, SongFilter};
use music_catalog::config::AppConfig;
use music_catalog::models::{CatalogKey, Song, Subscription, User};
use music_catalog::store::{
    CatalogStore, MemoryStore, Page, StoreError, SubscriptionStore, UserStore,
};
use music_catalog::{AppState, build_router};

const TEST_CONFIG: &str = r#"
log_level: debug
log_dir: ./logs
log_file: test.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
auth:
  jwt_secret: integration-test-secret
  argon2_memory_kib: 64
  argon2_iterations: 1
"#;

fn test_config() -> AppConfig {
    AppConfig::from_yaml(TEST_CONFIG).expect("test config should parse")
}

fn catalog() -> Vec<Song> {
    vec![
        Song::new("Free Fallin'", "Full Moon Fever", "Tom Petty", "1989"),
        Song::new("Runnin' Down a Dream", "Full Moon Fever", "Tom Petty", "1989"),
        Song::new(
            "American Girl",
            "Tom Petty and the Heartbreakers",
            "Tom Petty and the Heartbreakers",
            "1976",
        ),
        Song::new("Yesterday", "Help!", "The Beatles", "1965"),
        Song::new("Help!", "Help!", "The Beatles", "1965"),
    ]
}

async fn setup_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    for song in catalog() {
        store.put_song(&song).await.expect("memory put cannot fail");
    }
    let config = test_config();
    let state = AppState::from_store(store, &config).expect("argon2 params should be valid");
    build_router(state, &config.gateway)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, json)
}

/// Percent-encode everything outside the unreserved set.
fn encode_query_value(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        post_json(
            "/register",
            json!({"email": email, "user_name": "tester", "password": "pw123"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post_json("/login", json!({"email": email, "password": "pw123"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("login returns a token").to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_no_auth() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Registration and login
// =============================================================================

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = setup_app().await;
    let req = || {
        post_json(
            "/register",
            json!({"email": "a@b.com", "user_name": "alice", "password": "pw"}),
            None,
        )
    };

    let (status, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully!");

    let (status, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The email already exists");
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        post_json("/register", json!({"email": "a@b.com", "password": "pw"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_bodies_are_validation_errors() {
    let app = setup_app().await;

    let bodies = [
        json!({"email": null, "user_name": "alice", "password": "pw"}).to_string(),
        json!({"email": 5, "user_name": "alice", "password": "pw"}).to_string(),
        "{".to_string(),
    ];
    for body in bodies {
        let req = Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.clone()))
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json["code"], 1001);
        assert_eq!(json["error"], "VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn test_missing_content_type_is_validation_error() {
    let app = setup_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::from(json!({"email": "a@b.com", "password": "pw"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email() {
    let app = setup_app().await;
    register_and_login(&app, "a@b.com").await;

    let (status, wrong_pw) = send(
        &app,
        post_json("/login", json!({"email": "a@b.com", "password": "nope"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = send(
        &app,
        post_json("/login", json!({"email": "x@y.com", "password": "pw123"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Both failures look identical to the client
    assert_eq!(wrong_pw["message"], "Invalid email or password");
    assert_eq!(wrong_pw["message"], unknown["message"]);
}

#[tokio::test]
async fn test_login_response_and_current_user() {
    let app = setup_app().await;
    register_and_login(&app, "a@b.com").await;

    let (_, body) = send(
        &app,
        post_json("/login", json!({"email": "a@b.com", "password": "pw123"}), None),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["user_name"], "tester");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, me) = send(&app, get("/user", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@b.com");
}

// =============================================================================
// Auth middleware
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_app().await;

    let (status, _) = send(&app, get("/subscriptions", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/subscriptions", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json("/subscribe", json!({"composite_id": "x|||y"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/user", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscribe_toggle_and_list() {
    let app = setup_app().await;
    let token = register_and_login(&app, "a@b.com").await;

    let (status, body) = send(&app, get("/subscriptions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["albums"], json!([]));

    let album_id = "Free Fallin'|||Full Moon Fever";
    let subscribe = || post_json("/subscribe", json!({"composite_id": album_id}), Some(&token));

    let (status, body) = send(&app, subscribe()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscribed"], true);

    let (_, body) = send(&app, get("/subscriptions", Some(&token))).await;
    let albums = body["albums"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["composite_id"], album_id);
    assert_eq!(albums[0]["artist"], "Tom Petty");

    let (_, body) = send(&app, subscribe()).await;
    assert_eq!(body["subscribed"], false);

    let (_, body) = send(&app, get("/subscriptions", Some(&token))).await;
    assert_eq!(body["albums"], json!([]));
}

#[tokio::test]
async fn test_subscriptions_are_per_user() {
    let app = setup_app().await;
    let alice = register_and_login(&app, "alice@b.com").await;
    let bob = register_and_login(&app, "bob@b.com").await;

    send(
        &app,
        post_json("/subscribe", json!({"composite_id": "Yesterday|||Help!"}), Some(&alice)),
    )
    .await;

    let (_, body) = send(&app, get("/subscriptions", Some(&bob))).await;
    assert_eq!(body["albums"], json!([]));
}

#[tokio::test]
async fn test_subscribe_wrong_typed_composite_id() {
    let app = setup_app().await;
    let token = register_and_login(&app, "a@b.com").await;
    let (status, body) = send(
        &app,
        post_json("/subscribe", json!({"composite_id": 42}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_subscribe_missing_composite_id() {
    let app = setup_app().await;
    let token = register_and_login(&app, "a@b.com").await;
    let (status, _) = send(&app, post_json("/subscribe", json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_query_single_artist_is_exact() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/music/query?artist=Tom%20Petty", None)).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|s| s["artist"] == "Tom Petty"));
}

#[tokio::test]
async fn test_query_two_fields_substring_conjunction() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        get("/music/query?title=American&artist=Tom%20Petty", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["artist"], "Tom Petty and the Heartbreakers");
}

#[tokio::test]
async fn test_query_without_params() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/music/query", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "At least one query parameter must be provided."
    );
}

#[tokio::test]
async fn test_query_no_match() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/music/query?year=2099", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No result is retrieved. Please query again.");
}

#[tokio::test]
async fn test_music_default_page() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/music", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), catalog().len());
    assert!(body["lastEvaluatedKey"].is_null());
}

#[tokio::test]
async fn test_music_pagination_visits_every_song_once() {
    let app = setup_app().await;
    let mut seen: Vec<String> = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..10 {
        let uri = match &cursor {
            None => "/music?limit=2".to_string(),
            Some(key) => format!(
                "/music?limit=2&last_evaluated_key={}",
                encode_query_value(key)
            ),
        };
        let (status, body) = send(&app, get(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);

        for item in body["items"].as_array().unwrap() {
            seen.push(item["composite_id"].as_str().unwrap().to_string());
        }
        match body["lastEvaluatedKey"] {
            Value::Null => {
                cursor = None;
                break;
            }
            ref key => cursor = Some(key.to_string()),
        }
    }

    assert!(cursor.is_none(), "pagination should terminate");
    let mut expected: Vec<String> = catalog().into_iter().map(|s| s.composite_id).collect();
    expected.sort();
    let mut sorted = seen.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(seen.len(), expected.len());
    assert_eq!(sorted, expected);
}

#[tokio::test]
async fn test_music_non_numeric_limit() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/music?limit=abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    assert_eq!(body["error"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_music_rejects_bad_cursor_and_zero_limit() {
    let app = setup_app().await;
    let (status, _) = send(&app, get("/music?last_evaluated_key=notjson", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/music?limit=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Store failures
// =============================================================================

struct FailingStore;

fn down() -> StoreError {
    StoreError::Backend("connection refused: 10.0.0.5:5432".to_string())
}

#[async_trait]
impl UserStore for FailingStore {
    async fn get_user(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }
    async fn insert_user(&self, _user: &User) -> Result<bool, StoreError> {
        Err(down())
    }
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn scan_page(
        &self,
        _limit: u32,
        _start_after: Option<&CatalogKey>,
    ) -> Result<Page<Song>, StoreError> {
        Err(down())
    }
    async fn query_index(
        &self,
        _index: CatalogIndex,
        _value: &str,
    ) -> Result<Vec<Song>, StoreError> {
        Err(down())
    }
    async fn scan_filtered(&self, _filter: &SongFilter) -> Result<Vec<Song>, StoreError> {
        Err(down())
    }
    async fn find_by_composite_id(&self, _composite_id: &str) -> Result<Vec<Song>, StoreError> {
        Err(down())
    }
    async fn put_song(&self, _song: &Song) -> Result<(), StoreError> {
        Err(down())
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

#[async_trait]
impl SubscriptionStore for FailingStore {
    async fn remove_subscription(&self, _email: &str, _album_id: &str) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn insert_subscription(&self, _subscription: &Subscription) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn list_subscriptions(&self, _email: &str) -> Result<Vec<Subscription>, StoreError> {
        Err(down())
    }
}

#[tokio::test]
async fn test_store_failure_is_500_without_details() {
    let config = test_config();
    let state = AppState::from_store(Arc::new(FailingStore), &config).unwrap();
    let app = build_router(state, &config.gateway);

    let (status, body) = send(
        &app,
        post_json(
            "/register",
            json!({"email": "a@b.com", "user_name": "alice", "password": "pw"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error saving user");
    assert!(!body.to_string().contains("10.0.0.5"));

    let (status, _) = send(&app, get("/music", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

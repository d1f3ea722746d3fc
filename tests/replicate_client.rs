use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use granite_chat::api::{InferenceProvider, ReplicateClient};
use granite_chat::config::ServerConfig;
use granite_chat::error::ChatError;
use granite_chat::models::{ProviderInput, SamplingConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const STALL: Duration = Duration::from_millis(950);

/// Minimal stand-in for the Replicate predictions API.
#[derive(Clone, Default)]
struct MockReplicate {
    base: Arc<Mutex<String>>,
    polls: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
    prefer: Arc<Mutex<Option<String>>>,
}

async fn create_official(
    State(mock): State<MockReplicate>,
    Path((owner, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&mock, &headers, body);
    let base = mock.base.lock().unwrap().clone();

    match (owner.as_str(), name.as_str()) {
        ("acme", "slow") => (
            StatusCode::CREATED,
            Json(json!({
                "id": "pred-1",
                "status": "starting",
                "urls": {"get": format!("{}/predictions/pred-1", base)}
            })),
        ),
        ("acme", "broken") => (
            StatusCode::CREATED,
            Json(json!({"id": "pred-2", "status": "failed", "error": "CUDA out of memory"})),
        ),
        ("acme", "locked") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "You did not pass a valid authentication token"})),
        ),
        ("acme", "stalled") => {
            tokio::time::sleep(STALL).await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": "stalled",
                    "status": "processing",
                    "urls": {"get": format!("{}/predictions/stalled", base)}
                })),
            )
        }
        ("acme", "canceled") => (
            StatusCode::CREATED,
            Json(json!({"id": "pred-4", "status": "canceled"})),
        ),
        ("acme", "aborted") => (
            StatusCode::CREATED,
            Json(json!({"id": "pred-5", "status": "aborted"})),
        ),
        ("acme", "busy") => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"detail": "Request was throttled"})),
        ),
        _ => (
            StatusCode::CREATED,
            Json(json!({"id": "pred-0", "status": "succeeded", "output": "plain output"})),
        ),
    }
}

async fn create_versioned(
    State(mock): State<MockReplicate>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&mock, &headers, body);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "pred-3",
            "status": "succeeded",
            "output": ["Hello", ",", " world", "."]
        })),
    )
}

async fn get_prediction(
    State(mock): State<MockReplicate>,
    Path(id): Path<String>,
) -> Json<Value> {
    if id == "stalled" {
        tokio::time::sleep(STALL).await;
        return Json(json!({"id": id, "status": "processing"}));
    }
    let polls = mock.polls.fetch_add(1, Ordering::SeqCst) + 1;
    if polls < 2 {
        Json(json!({"id": id, "status": "processing"}))
    } else {
        Json(json!({"id": id, "status": "succeeded", "output": ["Done", " polling", "."]}))
    }
}

fn record(mock: &MockReplicate, headers: &HeaderMap, body: Value) {
    mock.bodies.lock().unwrap().push(body);
    *mock.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *mock.prefer.lock().unwrap() = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn start_mock() -> (String, MockReplicate) {
    let mock = MockReplicate::default();
    let app = Router::new()
        .route("/v1/models/{owner}/{name}/predictions", post(create_official))
        .route("/v1/predictions", post(create_versioned))
        .route("/v1/predictions/{id}", get(get_prediction))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/v1", listener.local_addr().unwrap());
    *mock.base.lock().unwrap() = base.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base, mock)
}

fn server_config(endpoint: &str, model: &str, token: Option<&str>) -> ServerConfig {
    ServerConfig {
        api_token: token.map(str::to_string),
        api_endpoint: endpoint.to_string(),
        model: model.to_string(),
        port: 0,
        request_timeout: 10,
        poll_interval_ms: 10,
        min_tokens: 0,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
        sampling: SamplingConfig::default(),
    }
}

fn input(prompt: &str) -> ProviderInput {
    ProviderInput {
        prompt: prompt.to_string(),
        temperature: 0.6,
        max_tokens: 512,
        top_p: 0.9,
        top_k: 50,
        min_tokens: 0,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
    }
}

#[tokio::test]
async fn test_versioned_model_posts_version_and_joins_output() {
    let (base, mock) = start_mock().await;
    let client =
        ReplicateClient::new(&server_config(&base, "acme/granite:abc123", Some("r8_test"))).unwrap();

    let text = client.generate(&input("Say hello")).await.unwrap();

    assert_eq!(text, "Hello, world.");
    let bodies = mock.bodies.lock().unwrap();
    assert_eq!(bodies[0]["version"], "abc123");
    assert_eq!(bodies[0]["input"]["prompt"], "Say hello");
    assert_eq!(bodies[0]["input"]["max_tokens"], 512);
    assert_eq!(mock.auth.lock().unwrap().as_deref(), Some("Bearer r8_test"));
    assert_eq!(mock.prefer.lock().unwrap().as_deref(), Some("wait"));
}

#[tokio::test]
async fn test_official_model_without_version() {
    let (base, mock) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/granite", Some("t"))).unwrap();

    let text = client.generate(&input("hi")).await.unwrap();

    assert_eq!(text, "plain output");
    assert!(mock.bodies.lock().unwrap()[0].get("version").is_none());
}

#[tokio::test]
async fn test_polls_until_prediction_finishes() {
    let (base, mock) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/slow", Some("t"))).unwrap();

    let text = client.generate(&input("hi")).await.unwrap();

    assert_eq!(text, "Done polling.");
    assert_eq!(mock.polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_prediction_is_provider_error() {
    let (base, _) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/broken", Some("t"))).unwrap();

    let err = client.generate(&input("hi")).await.unwrap_err();

    match err {
        ChatError::ProviderError(msg) => assert_eq!(msg, "CUDA out of memory"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_canceled_and_aborted_predictions_name_the_id() {
    let (base, _) = start_mock().await;

    let client = ReplicateClient::new(&server_config(&base, "acme/canceled", Some("t"))).unwrap();
    match client.generate(&input("hi")).await.unwrap_err() {
        ChatError::ProviderError(msg) => {
            assert!(msg.contains("pred-4"));
            assert!(msg.contains("canceled"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let client = ReplicateClient::new(&server_config(&base, "acme/aborted", Some("t"))).unwrap();
    match client.generate(&input("hi")).await.unwrap_err() {
        ChatError::ProviderError(msg) => assert!(msg.contains("pred-5")),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_slow_prediction_stops_at_deadline() {
    let (base, _) = start_mock().await;
    let config = ServerConfig {
        request_timeout: 1,
        poll_interval_ms: 900,
        ..server_config(&base, "acme/stalled", Some("t"))
    };
    let client = ReplicateClient::new(&config).unwrap();

    let started = Instant::now();
    let err = client.generate(&input("hi")).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ChatError::Timeout));
    assert!(
        elapsed < Duration::from_millis(1500),
        "1s deadline overshot: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (base, _) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/locked", Some("bad"))).unwrap();

    let err = client.generate(&input("hi")).await.unwrap_err();

    assert!(matches!(err, ChatError::InvalidApiToken(_)));
    assert!(err.to_string().contains("API token"));
}

#[tokio::test]
async fn test_throttled_maps_to_rate_limited() {
    let (base, _) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/busy", Some("t"))).unwrap();

    let err = client.generate(&input("hi")).await.unwrap_err();

    assert!(matches!(err, ChatError::RateLimited(_)));
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let (base, mock) = start_mock().await;
    let client = ReplicateClient::new(&server_config(&base, "acme/granite", None)).unwrap();

    let err = client.generate(&input("hi")).await.unwrap_err();

    assert!(matches!(err, ChatError::MissingApiToken));
    assert!(mock.bodies.lock().unwrap().is_empty());
}

#[test]
fn test_invalid_model_reference_is_config_error() {
    let result = ReplicateClient::new(&server_config("http://localhost", "no-slash", Some("t")));
    assert!(matches!(result, Err(ChatError::ConfigError(_))));
}

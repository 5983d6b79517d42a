//! End-to-end cycles against local stand-ins for the review API and the
//! Telegram Bot API.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use homework_bot::recording::RecordingLogger;
use homework_bot::transport::create_http_client;
use homework_bot::{PracticumClient, TelegramChannel};
use homework_core::{
    CycleError, CycleOutcome, FailureDelivery, FetchError, MessageChannel, Monitor, NotifyError,
    ReviewApi, ServiceType, TimeCursor, FAILURE_PREFIX,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const PRACTICUM_TOKEN: &str = "practicum-secret";
const TELEGRAM_TOKEN: &str = "123:test-token";
const CHAT_ID: &str = "4242";
const STATUSES_PATH: &str = "/api/user_api/homework_statuses/";

#[derive(Debug, Clone)]
struct ReviewRequest {
    authorization: Option<String>,
    from_date: Option<String>,
}

#[derive(Clone)]
struct MockState {
    review_responses: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    review_requests: Arc<Mutex<Vec<ReviewRequest>>>,
    telegram_messages: Arc<Mutex<Vec<Value>>>,
    telegram_reply: Arc<Mutex<(StatusCode, Value)>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            review_responses: Arc::default(),
            review_requests: Arc::default(),
            telegram_messages: Arc::default(),
            telegram_reply: Arc::new(Mutex::new((StatusCode::OK, json!({"ok": true})))),
        }
    }

    fn push_review(&self, status: StatusCode, body: impl Into<String>) {
        self.review_responses
            .lock()
            .unwrap()
            .push_back((status, body.into()));
    }

    fn review_requests(&self) -> Vec<ReviewRequest> {
        self.review_requests.lock().unwrap().clone()
    }

    fn telegram_texts(&self) -> Vec<String> {
        self.telegram_messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

async fn homework_statuses(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.review_requests.lock().unwrap().push(ReviewRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        from_date: params.get("from_date").cloned(),
    });

    state
        .review_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, r#"{"homeworks": []}"#.to_string()))
}

async fn send_message(
    State(state): State<MockState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if bot != format!("bot{}", TELEGRAM_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }

    let (status, reply) = state.telegram_reply.lock().unwrap().clone();
    if status.is_success() {
        state.telegram_messages.lock().unwrap().push(body);
    }
    (status, Json(reply))
}

async fn spawn_mock(state: MockState) -> String {
    let app = Router::new()
        .route(STATUSES_PATH, get(homework_statuses))
        .route("/:bot/sendMessage", post(send_message))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn clients(
    base: &str,
    recording: Option<RecordingLogger>,
) -> (PracticumClient, TelegramChannel) {
    let timeout = Duration::from_secs(5);
    let api = PracticumClient::new(
        create_http_client(ServiceType::ReviewApi, timeout, recording.clone()).unwrap(),
        format!("{}{}", base, STATUSES_PATH),
        PRACTICUM_TOKEN,
    );
    let channel = TelegramChannel::new(
        create_http_client(ServiceType::Telegram, timeout, recording).unwrap(),
        base,
        TELEGRAM_TOKEN,
        CHAT_ID,
    );
    (api, channel)
}

async fn setup() -> (MockState, Monitor<PracticumClient, TelegramChannel>) {
    let state = MockState::new();
    let base = spawn_mock(state.clone()).await;
    let (api, channel) = clients(&base, None);
    (state, Monitor::new(api, channel, TimeCursor::new(500)))
}

#[tokio::test]
async fn test_fetch_sends_oauth_header_and_from_date() {
    let state = MockState::new();
    let base = spawn_mock(state.clone()).await;
    let (api, _) = clients(&base, None);

    let payload = api.fetch(TimeCursor::new(1234)).await.unwrap();

    assert_eq!(payload, json!({"homeworks": []}));
    let requests = state.review_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("OAuth practicum-secret")
    );
    assert_eq!(requests[0].from_date.as_deref(), Some("1234"));
}

#[tokio::test]
async fn test_fetch_non_200_is_api_status_error() {
    let state = MockState::new();
    state.push_review(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
    let base = spawn_mock(state.clone()).await;
    let (api, _) = clients(&base, None);

    let err = api.fetch(TimeCursor::new(0)).await.unwrap_err();

    assert_eq!(err, FetchError::ApiStatus { code: 503 });
}

#[tokio::test]
async fn test_fetch_invalid_json_is_malformed_payload() {
    let state = MockState::new();
    state.push_review(StatusCode::OK, "<html>not json</html>");
    let base = spawn_mock(state.clone()).await;
    let (api, _) = clients(&base, None);

    let err = api.fetch(TimeCursor::new(0)).await.unwrap_err();

    assert!(matches!(err, FetchError::MalformedPayload(_)));
}

#[tokio::test]
async fn test_fetch_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let (api, _) = clients(&base, None);

    let err = api.fetch(TimeCursor::new(0)).await.unwrap_err();

    match err {
        FetchError::Network(message) => {
            // No URL in the message, so repeated failures render identically.
            assert!(!message.contains("from_date"));
            assert!(message.starts_with("не удалось установить соединение"));
        }
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_telegram_sends_chat_id_and_text() {
    let state = MockState::new();
    let base = spawn_mock(state.clone()).await;
    let (_, channel) = clients(&base, None);

    channel.send_message("привет").await.unwrap();

    let messages = state.telegram_messages.lock().unwrap().clone();
    assert_eq!(messages, vec![json!({"chat_id": CHAT_ID, "text": "привет"})]);
}

#[tokio::test]
async fn test_telegram_rejection_is_reported() {
    let state = MockState::new();
    *state.telegram_reply.lock().unwrap() = (
        StatusCode::BAD_REQUEST,
        json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}),
    );
    let base = spawn_mock(state.clone()).await;
    let (_, channel) = clients(&base, None);

    let err = channel.send_message("hello").await.unwrap_err();

    assert_eq!(
        err,
        NotifyError::Rejected("Bad Request: chat not found".to_string())
    );
}

#[tokio::test]
async fn test_status_change_cycle() {
    let (state, mut monitor) = setup().await;
    state.push_review(
        StatusCode::OK,
        r#"{"homeworks": [{"name": "hw1", "status": "approved"}], "current_date": 1000}"#,
    );

    let outcome = monitor.run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Completed {
            items: 1,
            delivered: 1,
            cursor: TimeCursor::new(1000)
        }
    );
    let texts = state.telegram_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("hw1"));
    assert!(texts[0].contains("ревьюеру всё понравилось"));

    // The next poll starts from the server's cursor.
    monitor.run_cycle().await;
    assert_eq!(
        state.review_requests()[1].from_date.as_deref(),
        Some("1000")
    );
}

#[tokio::test]
async fn test_empty_homeworks_cycle() {
    let (state, mut monitor) = setup().await;
    state.push_review(StatusCode::OK, r#"{"homeworks": []}"#);

    let outcome = monitor.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Completed { items: 0, .. }));
    assert!(state.telegram_texts().is_empty());
    assert_eq!(monitor.cursor(), TimeCursor::new(500));
}

#[tokio::test]
async fn test_unknown_status_cycle() {
    let (state, mut monitor) = setup().await;
    state.push_review(
        StatusCode::OK,
        r#"{"homeworks": [{"name": "hw2", "status": "unknown_status"}]}"#,
    );

    let outcome = monitor.run_cycle().await;

    assert!(matches!(
        outcome,
        CycleOutcome::Failed {
            error: CycleError::Interpretation(_),
            delivery: FailureDelivery::Sent
        }
    ));
    let texts = state.telegram_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with(FAILURE_PREFIX));
    assert!(texts[0].contains("unknown_status"));
}

#[tokio::test]
async fn test_repeated_api_failure_notified_once() {
    let (state, mut monitor) = setup().await;
    state.push_review(StatusCode::INTERNAL_SERVER_ERROR, "oops");
    state.push_review(StatusCode::INTERNAL_SERVER_ERROR, "oops");

    monitor.run_cycle().await;
    monitor.run_cycle().await;

    let texts = state.telegram_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("500"));
}

#[tokio::test]
async fn test_same_failure_after_recovery_is_suppressed() {
    let (state, mut monitor) = setup().await;
    state.push_review(StatusCode::INTERNAL_SERVER_ERROR, "oops");
    state.push_review(StatusCode::OK, r#"{"homeworks": []}"#);
    state.push_review(StatusCode::INTERNAL_SERVER_ERROR, "oops");

    monitor.run_cycle().await;
    monitor.run_cycle().await;
    let third = monitor.run_cycle().await;

    assert!(matches!(
        third,
        CycleOutcome::Failed {
            delivery: FailureDelivery::Suppressed,
            ..
        }
    ));
    assert_eq!(state.telegram_texts().len(), 1);
}

#[tokio::test]
async fn test_recording_redacts_credentials() {
    let path = std::env::temp_dir().join(format!(
        "homework-bot-recording-{}.jsonl",
        uuid::Uuid::new_v4()
    ));
    let logger = RecordingLogger::new(path.clone()).unwrap();

    let state = MockState::new();
    state.push_review(
        StatusCode::OK,
        r#"{"homeworks": [{"homework_name": "hw1", "status": "rejected"}]}"#,
    );
    let base = spawn_mock(state.clone()).await;
    let (api, channel) = clients(&base, Some(logger));
    let mut monitor = Monitor::new(api, channel, TimeCursor::new(500));

    monitor.run_cycle().await;
    assert_eq!(state.telegram_texts().len(), 1);

    // The writer task appends in the background; wait for all four events.
    let mut contents = String::new();
    for _ in 0..100 {
        contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        if contents.lines().count() >= 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let events: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 4);
    assert!(events.iter().any(|e| e["event_type"] == "ReviewApiCall"));
    assert!(events.iter().any(|e| e["event_type"] == "TelegramApiCall"));
    assert!(!contents.contains(PRACTICUM_TOKEN));
    assert!(!contents.contains("test-token"));
    assert!(contents.contains("bot[REDACTED]/sendMessage"));

    let _ = tokio::fs::remove_file(&path).await;
}

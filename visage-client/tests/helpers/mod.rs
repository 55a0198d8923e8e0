//! Test helper modules for visage-client integration tests
//!
//! Provides reusable test infrastructure components:
//! - MockService: scriptable stand-in for the analysis backend
//! - EventStream: session event monitoring with timeouts
//! - Fixture builders for prediction and history payloads

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use visage_client::workflow::ConfirmDelete;
use visage_client::{Config, ConfigOverrides, SelectedImage, SessionOrchestrator};
use visage_common::events::SessionEvent;

/// One canned HTTP response
#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Scripted {
    /// 200 with the given JSON body
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Arbitrary status with the given JSON body
    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Hold the response back, keeping the request in flight
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Captured POST /save request
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub file_name: Option<String>,
    pub manual_values: Option<String>,
}

/// What the mock has seen so far
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    pub predict_requests: usize,
    pub save_requests: Vec<SaveRequest>,
    pub analyses_requests: usize,
    pub delete_requests: Vec<i64>,
}

struct ServiceState {
    predict: Mutex<Scripted>,
    save: Mutex<Scripted>,
    analyses: Mutex<Scripted>,
    delete: Mutex<Scripted>,
    log: Mutex<RequestLog>,
}

/// Scriptable analysis backend listening on an ephemeral loopback port
///
/// Every endpoint starts out answering with a success envelope; tests
/// rescript individual endpoints to drive failure paths. The request log
/// supports "no request was sent" assertions.
pub struct MockService {
    pub base_url: String,
    state: Arc<ServiceState>,
    handle: JoinHandle<()>,
}

impl MockService {
    /// Start the mock with success defaults on every endpoint
    pub async fn start() -> Self {
        let state = Arc::new(ServiceState {
            predict: Mutex::new(Scripted::ok(success_envelope(sample_prediction_json()))),
            save: Mutex::new(Scripted::ok(json!({"success": true, "analysis_id": 1}))),
            analyses: Mutex::new(Scripted::ok(json!({"success": true, "data": []}))),
            delete: Mutex::new(Scripted::ok(json!({"success": true}))),
            log: Mutex::new(RequestLog::default()),
        });

        let router = Router::new()
            .route("/predict", post(predict_handler))
            .route("/save", post(save_handler))
            .route("/analyses", get(analyses_handler))
            .route("/analyses/:id", delete(delete_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().expect("Failed to read mock address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock service stopped");
        });

        MockService {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn script_predict(&self, response: Scripted) {
        *self.state.predict.lock().unwrap() = response;
    }

    pub fn script_save(&self, response: Scripted) {
        *self.state.save.lock().unwrap() = response;
    }

    pub fn script_analyses(&self, response: Scripted) {
        *self.state.analyses.lock().unwrap() = response;
    }

    pub fn script_delete(&self, response: Scripted) {
        *self.state.delete.lock().unwrap() = response;
    }

    pub fn predict_requests(&self) -> usize {
        self.state.log.lock().unwrap().predict_requests
    }

    pub fn save_requests(&self) -> Vec<SaveRequest> {
        self.state.log.lock().unwrap().save_requests.clone()
    }

    pub fn analyses_requests(&self) -> usize {
        self.state.log.lock().unwrap().analyses_requests
    }

    pub fn delete_requests(&self) -> Vec<i64> {
        self.state.log.lock().unwrap().delete_requests.clone()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(scripted: &Mutex<Scripted>) -> Response {
    let scripted = scripted.lock().unwrap().clone();
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }
    let status =
        StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        scripted.body,
    )
        .into_response()
}

async fn predict_handler(
    State(state): State<Arc<ServiceState>>,
    mut multipart: Multipart,
) -> Response {
    // Drain the form so the client sees a complete exchange
    while let Some(field) = multipart.next_field().await.unwrap() {
        let _ = field.bytes().await.unwrap();
    }
    state.log.lock().unwrap().predict_requests += 1;
    respond(&state.predict).await
}

async fn save_handler(
    State(state): State<Arc<ServiceState>>,
    mut multipart: Multipart,
) -> Response {
    let mut captured = SaveRequest {
        file_name: None,
        manual_values: None,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(String::from);
        let file_name = field.file_name().map(String::from);
        match name.as_deref() {
            Some("image") => {
                captured.file_name = file_name;
                let _ = field.bytes().await.unwrap();
            }
            Some("manual_values") => {
                captured.manual_values = Some(field.text().await.unwrap());
            }
            _ => {
                let _ = field.bytes().await.unwrap();
            }
        }
    }
    state.log.lock().unwrap().save_requests.push(captured);
    respond(&state.save).await
}

async fn analyses_handler(State(state): State<Arc<ServiceState>>) -> Response {
    state.log.lock().unwrap().analyses_requests += 1;
    respond(&state.analyses).await
}

async fn delete_handler(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i64>,
) -> Response {
    state.log.lock().unwrap().delete_requests.push(id);
    respond(&state.delete).await
}

/// Prediction payload used across tests: three confident attributes and a
/// low-confidence hair score that needs review
pub fn sample_prediction_json() -> Value {
    json!({
        "sex":  {"value": "Mujer",   "confidence": 92},
        "eyes": {"value": "Café",    "confidence": 88},
        "race": {"value": "Hispano", "confidence": 81},
        "hair": {"value": "Negro",   "confidence": 45},
    })
}

pub fn success_envelope(data: Value) -> Value {
    json!({"success": true, "data": data})
}

pub fn failure_envelope(message: &str) -> Value {
    json!({"success": false, "error": message})
}

/// History entry as the service serializes it
pub fn sample_entry_json(id: i64) -> Value {
    json!({
        "id": id,
        "image_url": format!("/media/analyses/{}.jpg", id),
        "created_at": "2026-08-20T12:00:00Z",
        "attributes": sample_prediction_json(),
        "average_confidence": 76.5,
        "has_low_confidence": true,
    })
}

/// Session event stream wrapper
pub struct EventStream {
    pub receiver: broadcast::Receiver<SessionEvent>,
}

impl EventStream {
    /// Wait for next event with timeout
    pub async fn next_timeout(&mut self, timeout: Duration) -> Option<SessionEvent> {
        tokio::time::timeout(timeout, self.receiver.recv())
            .await
            .ok()
            .and_then(|r| r.ok())
    }

    /// Wait for a specific event type, discarding others
    pub async fn wait_for(&mut self, event_name: &str, timeout: Duration) -> Option<SessionEvent> {
        let deadline = Instant::now() + timeout;

        loop {
            if Instant::now() > deadline {
                return None;
            }

            let remaining = deadline.duration_since(Instant::now());
            if let Some(event) = self.next_timeout(remaining).await {
                if event.event_name() == event_name {
                    return Some(event);
                }
            } else {
                return None;
            }
        }
    }
}

/// Config pointing the client at the given base URL (overrides outrank
/// any ambient VISAGE_SERVICE_URL)
pub fn client_config(base_url: &str) -> Config {
    Config::from_overrides(ConfigOverrides {
        service_url: Some(base_url.to_string()),
        ..Default::default()
    })
    .expect("Failed to build test config")
}

/// Orchestrator wired to the mock, confirming every delete prompt
pub fn engine_for(mock: &MockService) -> SessionOrchestrator {
    engine_with_confirm(mock, Arc::new(|_: i64| true))
}

/// Orchestrator wired to the mock with a caller-supplied delete prompt
pub fn engine_with_confirm(
    mock: &MockService,
    confirm: Arc<dyn ConfirmDelete>,
) -> SessionOrchestrator {
    SessionOrchestrator::new(&client_config(&mock.base_url), confirm)
}

/// Orchestrator pointed at a dead address, for transport failure tests
pub fn unreachable_engine() -> SessionOrchestrator {
    SessionOrchestrator::new(&client_config("http://127.0.0.1:1"), Arc::new(|_: i64| true))
}

/// Event stream subscribed to the engine's bus
pub fn events_of(engine: &SessionOrchestrator) -> EventStream {
    EventStream {
        receiver: engine.subscribe(),
    }
}

/// Small PNG-flavored selection accepted by the upload gate
pub fn png_image(file_name: &str) -> SelectedImage {
    SelectedImage::new(
        file_name,
        "image/png",
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    )
}

/// Poll a synchronous condition until it holds or the deadline passes
pub async fn wait_until<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

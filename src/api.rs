//! REST API server for the task assistant
//!
//! Stateless endpoints: every request carries the task collection it is
//! about. Used by the web chat widget and the dashboard.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::AssistantConfig;
use crate::insights::{create_default_synthesizer, InsightSynthesizer};
use crate::intent::{IntentMatcher, QUICK_ACTIONS};
use crate::metrics;
use crate::models::{parse_task_collection, ActivityPeriod, Task, TaskStats};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct RespondRequest {
    pub utterance: String,
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeRequest {
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsRequest {
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
    #[serde(default)]
    pub period: ActivityPeriod,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub matcher: Arc<IntentMatcher>,
    pub synthesizer: Arc<InsightSynthesizer>,
    pub clock: Arc<dyn Clock>,
}

impl ApiState {
    pub fn new(matcher: IntentMatcher, synthesizer: InsightSynthesizer) -> Self {
        Self {
            matcher: Arc::new(matcher),
            synthesizer: Arc::new(synthesizer),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(IntentMatcher::from_config(config), create_default_synthesizer())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Lenient parse of a request's task list. Records that parse but fail
/// validation are left in; the matcher sanitizes what it is given, and
/// handlers that bypass it call `metrics::sanitize` themselves.
fn read_tasks(raw: Vec<serde_json::Value>) -> Result<Vec<Task>, String> {
    parse_task_collection(serde_json::Value::Array(raw)).map_err(|e| e.to_string())
}

fn bad_request(message: String) -> (StatusCode, Json<ApiResponse>) {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Assistant Endpoints
/// =============================

async fn respond(
    State(state): State<ApiState>,
    Json(req): Json<RespondRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let tasks = match read_tasks(req.tasks) {
        Ok(tasks) => tasks,
        Err(e) => return bad_request(e),
    };

    debug!(utterance = %req.utterance, tasks = tasks.len(), "Assistant request");

    let response = {
        let mut rng = rand::thread_rng();
        state
            .matcher
            .respond(&req.utterance, &tasks, state.clock.now(), &mut rng)
    };

    (StatusCode::OK, Json(ApiResponse::success(response)))
}

async fn welcome(
    State(state): State<ApiState>,
    Json(req): Json<WelcomeRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    match read_tasks(req.tasks) {
        Ok(tasks) => {
            let welcome = state.matcher.welcome(&tasks, state.clock.now());
            (StatusCode::OK, Json(ApiResponse::success(welcome)))
        }
        Err(e) => bad_request(e),
    }
}

async fn quick_actions() -> Json<ApiResponse> {
    Json(ApiResponse::success(QUICK_ACTIONS))
}

/// =============================
/// Analytics Endpoints
/// =============================

async fn stats(
    State(state): State<ApiState>,
    Json(req): Json<StatsRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    match read_tasks(req.tasks) {
        Ok(tasks) => {
            let tasks = metrics::sanitize(&tasks);
            let stats = TaskStats::compute(&tasks, state.clock.now(), req.period);
            (StatusCode::OK, Json(ApiResponse::success(stats)))
        }
        Err(e) => bad_request(e),
    }
}

async fn insights(
    State(state): State<ApiState>,
    Json(stats): Json<TaskStats>,
) -> (StatusCode, Json<ApiResponse>) {
    let insights = state.synthesizer.synthesize(&stats);
    (StatusCode::OK, Json(ApiResponse::success(insights)))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/assistant/respond", post(respond))
        .route("/api/assistant/welcome", post(welcome))
        .route("/api/assistant/quick-actions", get(quick_actions))
        .route("/api/stats", post(stats))
        .route("/api/insights", post(insights))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::metrics::fixtures::now;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    fn router() -> Router {
        let state = ApiState::new(IntentMatcher::default(), create_default_synthesizer())
            .with_clock(Arc::new(FixedClock(now())));
        create_router(state)
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, ApiResponse) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn tasks_json() -> serde_json::Value {
        serde_json::json!([
            {"id": 1, "title": "Ship release", "status": "done", "priority": "high",
             "created_at": "2025-06-10T08:00:00", "time_spent": 1.5},
            {"id": 2, "title": "Review PR", "status": "in_progress", "priority": "medium",
             "created_at": "2025-06-09T08:00:00"},
            {"id": 3, "title": "Pay invoice", "status": "todo", "priority": "low",
             "created_at": "2025-06-08T08:00:00", "due_date": "2025-06-09T08:00:00"}
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_respond_summary() {
        let (status, body) = post_json(
            "/api/assistant/respond",
            serde_json::json!({"utterance": "my tasks", "tasks": tasks_json()}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        let data = body.data.unwrap();
        let text = data["text"].as_str().unwrap();
        assert!(text.contains("3 total tasks"));
        assert!(text.contains("1 task overdue"));
        let delay = data["delay_ms"].as_u64().unwrap();
        assert!((600..1500).contains(&delay));
    }

    #[tokio::test]
    async fn test_respond_skips_unreadable_tasks() {
        let mut tasks = tasks_json();
        if let Some(items) = tasks.as_array_mut() {
            items.push(serde_json::json!({"id": 4, "title": "", "status": "todo",
                "priority": "low", "created_at": "2025-06-08T08:00:00"}));
            items.push(serde_json::json!({"id": 5, "status": "unknown"}));
        }

        let (_, body) = post_json(
            "/api/assistant/respond",
            serde_json::json!({"utterance": "my tasks", "tasks": tasks}),
        )
        .await;
        let data = body.data.unwrap();
        assert!(data["text"].as_str().unwrap().contains("3 total tasks"));
    }

    #[tokio::test]
    async fn test_welcome_flags_urgency() {
        let (_, body) = post_json(
            "/api/assistant/welcome",
            serde_json::json!({"tasks": tasks_json()}),
        )
        .await;
        assert_eq!(body.data.unwrap()["urgent"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_quick_actions_listed_in_order() {
        let request = Request::builder()
            .uri("/api/assistant/quick-actions")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ApiResponse = serde_json::from_slice(&bytes).unwrap();
        let data = body.data.unwrap();
        let actions = data.as_array().unwrap();
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[1]["query"], serde_json::json!("overdue tasks"));
        assert_eq!(actions[4]["label"], serde_json::json!("🎯 What Next?"));
    }

    #[tokio::test]
    async fn test_stats_exclude_malformed_tasks() {
        let mut tasks = tasks_json();
        if let Some(items) = tasks.as_array_mut() {
            items.push(serde_json::json!({"id": 4, "title": "  ", "status": "todo",
                "priority": "low", "created_at": "2025-06-08T08:00:00"}));
        }

        let (_, body) = post_json(
            "/api/stats",
            serde_json::json!({"tasks": tasks, "period": "week"}),
        )
        .await;
        let stats: TaskStats = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.pending_tasks, 2);
    }

    #[tokio::test]
    async fn test_stats_then_insights() {
        let (status, body) = post_json(
            "/api/stats",
            serde_json::json!({"tasks": tasks_json(), "period": "week"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let stats: TaskStats = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.daily_activity.len(), 7);

        let (_, body) = post_json("/api/insights", serde_json::to_value(&stats).unwrap()).await;
        let cards = body.data.unwrap();
        let cards = cards.as_array().unwrap();
        assert!(!cards.is_empty() && cards.len() <= 4);
        assert_eq!(cards[0]["topic"], serde_json::json!("productivity"));
    }
}

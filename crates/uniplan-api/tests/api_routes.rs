use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use uniplan_api::{build_router, config::Config, state::AppState};
use uniplan_graph::Pipeline;
use uniplan_llm::{ChatClient, ChatRequest, ChatResponse};
use uniplan_tools::{ToolRegistry, UniversityDatabase};

const PERSONA: &str = r#"{"location": "Boston", "major": "Computer Science"}"#;

const GRAPH: &str = r#"```json
{
  "nodes": [
    {"data": {"id": "mit", "label": "UNIVERSITY", "name": "MIT", "description": "Cambridge"}},
    {"data": {"id": "cs", "label": "MAJOR", "name": "Computer Science", "description": ""}}
  ],
  "edges": [
    {"data": {"id": "mit-cs", "source": "mit", "target": "cs", "label": "OFFERS", "description": ""}}
  ]
}
```"#;

struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(ChatResponse::text)
            .ok_or_else(|| anyhow!("script exhausted"))
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

fn one_run() -> Vec<&'static str> {
    vec![
        PERSONA,
        "No tools needed.",
        "## Recommendation\nMIT fits.",
        GRAPH,
    ]
}

fn scripted(replies: Vec<&str>) -> Arc<ScriptedClient> {
    Arc::new(ScriptedClient {
        replies: Mutex::new(replies.into_iter().map(String::from).collect()),
    })
}

fn app_with(client: Arc<dyn ChatClient>, config: Config) -> Router {
    let pipeline = Pipeline::builder()
        .chat_client(client)
        .tools(Arc::new(ToolRegistry::new()))
        .build()
        .unwrap();
    let database = Arc::new(UniversityDatabase::in_memory().unwrap());

    build_router(Arc::new(AppState::new(config, pipeline, database)))
}

fn app(replies: Vec<&str>) -> Router {
    app_with(scripted(replies), Config::default())
}

/// Delays its first answer, then replays a script
struct SlowStartClient {
    delay: Duration,
    inner: Arc<ScriptedClient>,
}

#[async_trait]
impl ChatClient for SlowStartClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let first = self.inner.replies.lock().unwrap().len() == one_run().len();
        if first {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.chat(request).await
    }

    fn default_model(&self) -> &str {
        "slow-start"
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn node_ids(body: &Value) -> Vec<&str> {
    body["elements"]["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["data"]["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_plan_then_edit_graph() {
    let app = app(one_run());

    let (status, plan) = send(&app, post_json("/plans", json!({"query": "CS in Boston"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["steps"], json!(["Plan", "Gather", "Recommend", "Format"]));
    assert_eq!(plan["report"], "## Recommendation\nMIT fits.");
    assert_eq!(node_ids(&plan), vec!["mit", "cs"]);
    assert!(plan.get("warning").is_none());

    let session_id = plan["session_id"].as_str().unwrap().to_string();
    let graph_uri = format!("/sessions/{}/graph", session_id);

    let (status, graph) = send(&app, get(&graph_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graph["elements"], plan["elements"]);

    let remove = json!({"action": "remove", "data": {"node_ids": ["cs"]}});
    let (status, removed) = send(&app, post_json(&format!("{}/actions", graph_uri), remove)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node_ids(&removed), vec!["mit"]);
    assert!(removed["elements"]["edges"].as_array().unwrap().is_empty());

    let (status, reset) = send(&app, post_json(&format!("{}/reset", graph_uri), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["elements"], plan["elements"]);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app(vec![]);

    let (status, body) = send(&app, get("/sessions/nope/graph")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found: nope");

    let expand = json!({"action": "expand", "data": {"node_ids": ["mit"]}});
    let (status, _) = send(&app, post_json("/sessions/nope/graph/actions", expand)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_query_is_400() {
    let app = app(one_run());
    let (status, body) = send(&app, post_json("/plans", json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn test_failed_run_is_500() {
    let app = app(vec!["not a persona"]);
    let (status, body) = send(&app, post_json("/plans", json!({"query": "CS in Boston"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("plan stage failed"));
}

#[tokio::test]
async fn test_unparseable_graph_returns_report_with_warning() {
    let mut replies = one_run();
    replies[3] = "I could not build a graph.";
    let app = app(replies);

    let (status, plan) = send(&app, post_json("/plans", json!({"query": "CS in Boston"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["report"], "## Recommendation\nMIT fits.");
    assert!(plan["elements"]["nodes"].as_array().unwrap().is_empty());
    assert!(plan["warning"]
        .as_str()
        .unwrap()
        .starts_with("Knowledge graph could not be loaded"));

    let graph_uri = format!("/sessions/{}/graph", plan["session_id"].as_str().unwrap());
    let (status, graph) = send(&app, get(&graph_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graph["warning"], plan["warning"]);
}

#[tokio::test]
async fn test_plan_outlives_request_timeout() {
    let mut config = Config::default();
    config.server.request_timeout_secs = 1;
    let client = Arc::new(SlowStartClient {
        delay: Duration::from_millis(1500),
        inner: scripted(one_run()),
    });
    let app = app_with(client, config);

    let (status, plan) = send(&app, post_json("/plans", json!({"query": "CS in Boston"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node_ids(&plan), vec!["mit", "cs"]);
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = app(vec![]);
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"], "connected");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = app(vec![]);
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_stream_ends_with_completed_session() {
    let app = app(one_run());
    let response = app
        .clone()
        .oneshot(post_json("/plans/stream", json!({"query": "CS in Boston"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.starts_with("event: run_started"));
    assert_eq!(text.matches("event: stage\n").count(), 4);
    assert!(!text.contains("event: error"));

    let completed = text
        .split("\n\n")
        .find(|chunk| chunk.starts_with("event: completed"))
        .unwrap();
    let data: Value = serde_json::from_str(completed.split("data: ").nth(1).unwrap()).unwrap();

    let session_id = data["session_id"].as_str().unwrap();
    let (status, graph) = send(&app, get(&format!("/sessions/{}/graph", session_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node_ids(&graph), vec!["mit", "cs"]);
}

#[tokio::test]
async fn test_stream_reports_failing_stage() {
    let app = app(vec![]);
    let response = app
        .oneshot(post_json("/plans/stream", json!({"query": "CS in Boston"})))
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("event: error"));
    assert!(text.contains(r#""stage":"plan""#));
}

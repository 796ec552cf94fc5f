//! HTTP API tests driving the router directly

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cardwall_board::{BoardSession, MemoryStore};
use cardwall_cli::server::router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> Router {
    let session = BoardSession::open(Arc::new(MemoryStore::new()))
        .await
        .unwrap();
    router(Arc::new(session))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|body| body.to_string())).await
}

/// Send `body` verbatim with a JSON content type
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn texts(board: &Value, column: &str) -> Vec<String> {
    board[column]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_empty_board_is_grouped() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "todo": [], "in-progress": [], "done": [] }));
}

#[tokio::test]
async fn test_create_and_move() {
    let app = app().await;

    let (status, milk) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "todo", "text": "Buy milk" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(milk["column"], "todo");

    let (_, eggs) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "todo", "text": "Buy eggs" })),
    )
    .await;
    assert!(eggs["position"].as_f64().unwrap() > milk["position"].as_f64().unwrap());

    let uri = format!("/api/tasks/{}/move", eggs["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "from": "todo", "to": "todo", "index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], true);
    assert_eq!(texts(&body["board"], "todo"), vec!["Buy eggs", "Buy milk"]);
}

#[tokio::test]
async fn test_move_unknown_id_reports_not_moved() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks/nobody/move",
        Some(json!({ "from": "todo", "to": "done", "index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], false);
}

#[tokio::test]
async fn test_create_rejects_blank_text() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "todo", "text": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "task text cannot be empty");
}

#[tokio::test]
async fn test_create_rejects_unknown_column() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "icebox", "text": "Later" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown column: icebox");
}

/// A rejected body still answers 400 with a JSON error message
fn assert_bad_body(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(!message.is_empty());
}

#[tokio::test]
async fn test_create_missing_field_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({ "column": "todo" }))).await;
    assert_bad_body(status, &body);
    assert!(body["error"].as_str().unwrap().contains("text"));
}

#[tokio::test]
async fn test_create_non_json_body_is_bad_request() {
    let app = app().await;
    let (status, body) = send_raw(
        &app,
        "POST",
        "/api/tasks",
        Some("column=todo&text=milk".to_string()),
    )
    .await;
    assert_bad_body(status, &body);
}

#[tokio::test]
async fn test_create_without_body_is_bad_request() {
    let app = app().await;
    let (status, body) = send_raw(&app, "POST", "/api/tasks", None).await;
    assert_bad_body(status, &body);
}

#[tokio::test]
async fn test_move_negative_index_is_bad_request() {
    let app = app().await;
    let (_, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "todo", "text": "Buy milk" })),
    )
    .await;
    let uri = format!("/api/tasks/{}/move", task["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "from": "todo", "to": "done", "index": -1 })),
    )
    .await;
    assert_bad_body(status, &body);

    let (_, board) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(texts(&board, "todo"), vec!["Buy milk"]);
}

#[tokio::test]
async fn test_move_malformed_json_is_bad_request() {
    let app = app().await;
    let (status, body) = send_raw(
        &app,
        "POST",
        "/api/tasks/anything/move",
        Some("{ \"from\": \"todo\",".to_string()),
    )
    .await;
    assert_bad_body(status, &body);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app().await;
    let (_, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "column": "done", "text": "Ship it" })),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, board) = send(&app, "GET", "/api/tasks", None).await;
    assert!(texts(&board, "done").is_empty());
}

#[tokio::test]
async fn test_rebalance_column() {
    let app = app().await;
    for text in ["a", "b", "c"] {
        send(
            &app,
            "POST",
            "/api/tasks",
            Some(json!({ "column": "todo", "text": text })),
        )
        .await;
    }
    let (_, board) = send(&app, "GET", "/api/tasks", None).await;
    let first = board["todo"][0]["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/tasks/{}/move", first),
        Some(json!({ "from": "todo", "to": "todo", "index": 2 })),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/columns/todo/rebalance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["updated"].as_u64().unwrap() > 0);

    let (_, board) = send(&app, "GET", "/api/tasks", None).await;
    let positions: Vec<f64> = board["todo"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["position"].as_f64().unwrap())
        .collect();
    assert_eq!(positions, vec![0.0, 1.0, 2.0]);
}

#[tokio::test]
async fn test_rebalance_unknown_column() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/columns/icebox/rebalance", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_headers() {
    let app = app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/tasks")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

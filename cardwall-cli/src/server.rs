//! HTTP API over a [`BoardSession`]
//!
//! | Method | Path                              |
//! |--------|-----------------------------------|
//! | GET    | `/health`                         |
//! | GET    | `/api/tasks`                      |
//! | POST   | `/api/tasks`                      |
//! | DELETE | `/api/tasks/:id`                  |
//! | POST   | `/api/tasks/:id/move`             |
//! | POST   | `/api/columns/:column/rebalance`  |

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use cardwall_board::{Board, BoardError, BoardSession, ColumnId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

type SharedSession = Arc<BoardSession>;

/// Body of `POST /api/tasks`
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub column: String,
    pub text: String,
}

/// Body of `POST /api/tasks/:id/move`
#[derive(Debug, Deserialize)]
pub struct MoveTask {
    pub from: String,
    pub to: String,
    pub index: usize,
}

#[derive(Debug, Serialize)]
struct MoveResponse {
    moved: bool,
    board: Board,
}

#[derive(Debug, Serialize)]
struct RebalanceResponse {
    updated: usize,
}

/// A failed request rendered as `{ "error": message }`
#[derive(Debug)]
pub enum ApiError {
    Board(BoardError),
    /// The request body was missing, not JSON, or the wrong shape
    Body(JsonRejection),
}

impl From<BoardError> for ApiError {
    fn from(error: BoardError) -> Self {
        Self::Board(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Board(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Board(e) if e.is_persistence() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Board(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Board(e) => e.to_string(),
            Self::Body(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::warn!("request failed: {}", message);
        } else if let Self::Body(_) = self {
            tracing::debug!("rejected request body: {}", message);
        }
        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Build the API router for `session`
pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", delete(delete_task))
        .route("/api/tasks/:id/move", post(move_task))
        .route("/api/columns/:column/rebalance", post(rebalance_column))
        .with_state(session)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the API on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, session: SharedSession) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("cardwall HTTP server listening on http://{}", addr);

    axum::serve(listener, router(session))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("cardwall HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Health check handler for the /health endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn list_tasks(State(session): State<SharedSession>) -> Json<Board> {
    Json(session.snapshot().await)
}

async fn create_task(
    State(session): State<SharedSession>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(body) = body?;
    let column: ColumnId = body.column.parse()?;
    let task = session.add(column, &body.text).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    session.delete(&TaskId::from_string(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_task(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
    body: Result<Json<MoveTask>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(body) = body?;
    let from: ColumnId = body.from.parse()?;
    let to: ColumnId = body.to.parse()?;
    let moved = session
        .move_task(&TaskId::from_string(id), from, to, body.index)
        .await?;
    Ok(Json(MoveResponse {
        moved,
        board: session.snapshot().await,
    }))
}

async fn rebalance_column(
    State(session): State<SharedSession>,
    Path(column): Path<String>,
) -> Result<Json<RebalanceResponse>, ApiError> {
    let column: ColumnId = column.parse()?;
    let updated = session.rebalance(column).await?;
    Ok(Json(RebalanceResponse { updated }))
}

//! Todo API endpoints
//!
//! REST surface for the item store plus a Server-Sent-Events stream that
//! carries the live list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use todo_core::task::{Task, TaskId, TaskRepository};
use todo_core::Error;

use crate::state::AppState;

/// SSE event name carrying a full snapshot
pub const TODOS_EVENT: &str = "todos";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: TaskId,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn store_error(e: Error) -> ApiError {
    let status = match &e {
        Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => {
            warn!("Store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/todos - List all todos, newest first
async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.task_store().list().await.map_err(store_error)?;
    Ok(Json(tasks))
}

/// POST /api/todos - Create a todo
///
/// The text is stored as given; blank text is the caller's concern.
async fn create_todo(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state
        .task_store()
        .create(req.text)
        .await
        .map_err(store_error)?;
    info!("Created todo {}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/todos/{id}/toggle - Flip completion
async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .task_store()
        .toggle(TaskId::from(id))
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/todos/{id} - Replace the text
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TextRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .task_store()
        .update_text(TaskId::from(id), req.text)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/todos/{id} - Delete a todo
async fn remove_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .task_store()
        .remove(TaskId::from(id))
        .await
        .map_err(store_error)?;
    info!("Removed todo {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/todos/events - Live list as Server-Sent Events
///
/// The first event is the current snapshot; every later one follows a change.
async fn stream_todos(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.task_store().subscribe().into_inner();
    let stream = WatchStream::new(rx).filter_map(|snapshot| {
        snapshot.map(|tasks| Event::default().event(TODOS_EVENT).json_data(tasks))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/events", get(stream_todos))
        .route("/api/todos/{id}", patch(update_todo).delete(remove_todo))
        .route("/api/todos/{id}/toggle", post(toggle_todo))
}

//! Socket.IO event handlers for real-time communication
//!
//! Browser clients mutate the store through `todos:*` events and receive the
//! full list as `todos:sync` whenever it changes, whoever changed it.

use serde::{Deserialize, Serialize};
use socketioxide::extract::{Data, SocketRef, State};
use socketioxide::{SocketIo, TransportType};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use todo_core::task::{FileTaskStore, TaskId, TaskRepository};

pub const SYNC_EVENT: &str = "todos:sync";
pub const ERROR_EVENT: &str = "todos:error";

/// Shared state for Socket.IO handlers
#[derive(Clone)]
pub struct SocketState {
    pub task_store: Arc<FileTaskStore>,
}

impl SocketState {
    pub fn new(task_store: Arc<FileTaskStore>) -> Self {
        Self { task_store }
    }
}

// ============ Event Payloads ============

#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct IdPayload {
    pub id: TaskId,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub id: TaskId,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

// ============ Event Handlers ============

/// Handle new socket connection
pub async fn on_connect(socket: SocketRef) {
    info!("Client connected: {}", socket.id);

    socket.on(
        "todos:request-sync",
        |socket: SocketRef, State(state): State<SocketState>| async move {
            handle_request_sync(socket, state).await;
        },
    );

    socket.on(
        "todos:create",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<CreatePayload>| async move {
            info!("Creating todo: {}", data.text);
            let result = state.task_store.create(data.text).await.map(|_| ());
            report_failure(&socket, "create", result);
        },
    );

    socket.on(
        "todos:toggle",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<IdPayload>| async move {
            let result = state.task_store.toggle(data.id).await.map(|_| ());
            report_failure(&socket, "toggle", result);
        },
    );

    socket.on(
        "todos:update",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<UpdatePayload>| async move {
            let result = state.task_store.update_text(data.id, data.text).await;
            report_failure(&socket, "update", result);
        },
    );

    socket.on(
        "todos:remove",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<IdPayload>| async move {
            info!("Removing todo: {}", data.id);
            let result = state.task_store.remove(data.id).await;
            report_failure(&socket, "remove", result);
        },
    );

    socket.on_disconnect(|socket: SocketRef| async move {
        info!("Client disconnected: {}", socket.id);
    });
}

async fn handle_request_sync(socket: SocketRef, state: SocketState) {
    info!("Client {} requested sync", socket.id);
    match state.task_store.list().await {
        Ok(tasks) => {
            if let Err(e) = socket.emit(SYNC_EVENT, &tasks) {
                warn!("Failed to emit sync: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to list todos: {}", e);
            let _ = socket.emit(ERROR_EVENT, &ErrorPayload { message: e.to_string() });
        }
    }
}

/// Tell only the requesting client that its mutation failed
fn report_failure(socket: &SocketRef, action: &str, result: todo_core::Result<()>) {
    if let Err(e) = result {
        warn!("Failed to {} todo: {}", action, e);
        let _ = socket.emit(ERROR_EVENT, &ErrorPayload { message: e.to_string() });
    }
}

/// Broadcast every store snapshot to all connected clients
///
/// Runs until the store is dropped.
pub fn spawn_sync_broadcaster(io: SocketIo, task_store: &FileTaskStore) -> JoinHandle<()> {
    let mut live = task_store.subscribe();
    tokio::spawn(async move {
        while live.changed().await.is_ok() {
            if let Some(tasks) = live.current() {
                if let Err(e) = io.emit(SYNC_EVENT, &tasks) {
                    warn!("Failed to broadcast sync: {}", e);
                }
            }
        }
        info!("Sync broadcaster stopped");
    })
}

/// Create and configure Socket.IO layer
pub fn create_socket_layer(state: SocketState) -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::builder()
        .with_state(state)
        // Only allow WebSocket transport to avoid CORS issues with polling
        .transports([TransportType::Websocket])
        .build_layer();

    io.ns("/", on_connect);

    (layer, io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payloads_deserialize_from_client_shapes() {
        let id = uuid::Uuid::new_v4();

        let payload: UpdatePayload =
            serde_json::from_value(json!({ "id": id.to_string(), "text": "New text" })).unwrap();
        assert_eq!(payload.id, TaskId::from(id));
        assert_eq!(payload.text, "New text");

        let payload: IdPayload = serde_json::from_value(json!({ "id": id.to_string() })).unwrap();
        assert_eq!(payload.id, TaskId::from(id));

        assert!(serde_json::from_value::<CreatePayload>(json!({ "text": 1 })).is_err());
    }
}

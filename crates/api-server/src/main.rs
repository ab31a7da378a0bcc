//! API Server for the task list
//!
//! This is the entry point of the item store service.
//! It provides the REST API and SSE live list on one port and Socket.IO on
//! another (8081 and 8080 by default).

mod config;
mod routes;
mod socket;
mod state;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::socket::{create_socket_layer, spawn_sync_broadcaster, SocketState};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todo_server=debug,todo_core=info,tower_http=debug,socketioxide=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    if config.ephemeral {
        tracing::info!("Running without persistence");
    } else {
        tracing::info!("Using data directory: {:?}", config.data_dir);
    }

    // Create application state for REST API
    let app_state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?;

    // Create Socket.IO layer sharing the same store
    let socket_state = SocketState::new(app_state.task_store_arc());
    let (socket_layer, io) = create_socket_layer(socket_state);
    spawn_sync_broadcaster(io, app_state.task_store());

    // REST API server
    let rest_app = Router::new()
        .merge(routes::health::router())
        .merge(routes::todo::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Socket.IO server
    // Layers are applied bottom-to-top, so CorsLayer is added last to be applied first
    let socket_app = Router::new()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(socket_layer);

    let rest_addr = config.rest_addr();
    let socket_addr = config.socket_addr();

    let rest_listener = tokio::net::TcpListener::bind(rest_addr)
        .await
        .with_context(|| format!("Failed to bind REST listener on {}", rest_addr))?;
    let socket_listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("Failed to bind Socket.IO listener on {}", socket_addr))?;

    tracing::info!("REST API listening on {}", rest_addr);
    tracing::info!("Socket.IO listening on {}", socket_addr);

    let rest_handle = tokio::spawn(async move { axum::serve(rest_listener, rest_app).await });
    let socket_handle =
        tokio::spawn(async move { axum::serve(socket_listener, socket_app).await });

    // Wait for both
    let (rest, socket) = tokio::try_join!(rest_handle, socket_handle)?;
    rest.context("REST server failed")?;
    socket.context("Socket.IO server failed")?;
    Ok(())
}

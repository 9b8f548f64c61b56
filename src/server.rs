//! # Dashboard Web Server
//!
//! Axum server exposing the shared timer state to the browser dashboard and
//! forwarding the dashboard's button to the device.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Dashboard page with the polling script |
//! | GET | `/data` | Most recent raw device line |
//! | GET | `/timer` | `{start, stop, formatted}` for the current run |
//! | POST | `/simulate_button_press` | Sends `GO` to the device |
//!
//! Handlers never touch the device read path. A failed write is reported to
//! the caller as a 500 and the server keeps running.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::device::CommandSink;
use crate::state::{TimerSnapshot, TimerStore};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state passed to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub timer: TimerStore,
    pub commands: CommandSink,
}

/// Body of `GET /data`.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: String,
}

/// Body of `POST /simulate_button_press`.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: &'static str,
    pub message: String,
}

impl CommandResponse {
    fn success(message: &str) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: "error",
            message,
        }
    }
}

/// Builds the router with all dashboard endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/data", get(handle_data))
        .route("/timer", get(handle_timer))
        .route("/simulate_button_press", post(handle_button_press))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind dashboard server to {addr}"))?;
    info!("starting web server on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("dashboard server terminated unexpectedly")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server simply runs until killed.
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down server");
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_data(State(state): State<AppState>) -> Json<DataResponse> {
    Json(DataResponse {
        data: state.timer.latest_line(),
    })
}

async fn handle_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.snapshot())
}

/// Handles `POST /simulate_button_press`.
///
/// The serial write blocks, so it runs on the blocking pool.
async fn handle_button_press(State(state): State<AppState>) -> (StatusCode, Json<CommandResponse>) {
    let commands = state.commands.clone();
    let outcome = tokio::task::spawn_blocking(move || commands.send_go())
        .await
        .map_err(|e| e.to_string())
        .and_then(|sent| sent.map_err(|e| e.to_string()));

    match outcome {
        Ok(()) => {
            info!("simulated button press sent to device");
            (
                StatusCode::OK,
                Json(CommandResponse::success("Button press simulated")),
            )
        }
        Err(message) => {
            error!(error = %message, "error sending button press");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CommandResponse::error(message)),
            )
        }
    }
}

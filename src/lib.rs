//! Line Timer: a bridge between a serial race-timer device and a browser dashboard.
//!
//! The process has two long-lived parts that meet only in a [`TimerStore`]:
//!
//! 1. A [`SerialMonitor`] thread reading `START` / `STOP` / `TIME` lines from
//!    the device.
//! 2. An Axum server (see [`server`]) serving the dashboard, the `/timer`
//!    snapshot and the simulated button press.

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod server;
pub mod state;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clock::SystemClock;
use config::Config;
use monitor::SerialMonitor;
use server::AppState;
use state::TimerStore;

const DEFAULT_LOG_FILTER: &str = "line_timer_lib=info,tower_http=info";

/// Initializes the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true),
        )
        .with(filter)
        .init();
}

/// Opens the device, starts the monitor thread and serves the dashboard.
///
/// Returns an error without serving anything if the device cannot be opened.
pub fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    let device = device::open_device(&config)
        .context("exiting since the serial connection was not established")?;

    let timer = TimerStore::new();
    SerialMonitor::new(device.reader, SystemClock, timer.clone())
        .spawn()
        .context("failed to start the serial monitor thread")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build the Tokio runtime")?;

    runtime.block_on(server::start_server(
        config.bind_addr,
        AppState {
            timer,
            commands: device.commands,
        },
    ))
}

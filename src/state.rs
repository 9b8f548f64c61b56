//! # Shared Timer State
//!
//! The serial monitor pushes updates into a [`TimerStore`] and the HTTP
//! handlers pull snapshots out of it. Both sides hold clones of the same
//! handle, created once in the composition root.
//!
//! Every line is applied inside a single critical section, so a reader never
//! sees a new `start` next to the previous run's `stop` or `formatted`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::clock::format_elapsed;
use crate::protocol::DeviceEvent;

/// The current run, as last reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    /// Most recent raw line, trimmed.
    pub latest_line: String,
    /// Host time the current run started, in epoch milliseconds.
    pub start_timestamp: Option<i64>,
    /// Host time the current run stopped, in epoch milliseconds.
    pub stop_timestamp: Option<i64>,
    /// Elapsed time as formatted by the device.
    pub formatted_time: String,
}

/// Body of `GET /timer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub formatted: String,
}

#[derive(Debug, Clone, Default)]
pub struct TimerStore {
    inner: Arc<Mutex<TimerState>>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one trimmed, non-empty line received at `now_millis`.
    ///
    /// Returns the classified event so the caller can log it.
    pub fn apply(&self, line: &str, now_millis: i64) -> DeviceEvent {
        let event = DeviceEvent::parse(line);
        let mut state = self.inner.lock();
        state.latest_line = line.to_string();

        match &event {
            DeviceEvent::Start { .. } => {
                // A START with no STOP before it silently replaces the run in flight.
                state.start_timestamp = Some(now_millis);
                state.stop_timestamp = None;
                state.formatted_time.clear();
            }
            DeviceEvent::Stop { .. } => {
                state.stop_timestamp = Some(now_millis);
            }
            DeviceEvent::Time(formatted) => {
                state.formatted_time = formatted.clone();
                if let (Some(start), Some(stop)) = (state.start_timestamp, state.stop_timestamp) {
                    debug!(
                        device = %formatted,
                        host = %format_elapsed(stop - start),
                        "run time reported"
                    );
                }
            }
            DeviceEvent::Waiting | DeviceEvent::NoSensor | DeviceEvent::Other => {}
        }

        event
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let state = self.inner.lock();
        TimerSnapshot {
            start: state.start_timestamp,
            stop: state.stop_timestamp,
            formatted: state.formatted_time.clone(),
        }
    }

    pub fn latest_line(&self) -> String {
        self.inner.lock().latest_line.clone()
    }

    /// Copy of the full state, taken under one lock acquisition.
    pub fn state(&self) -> TimerState {
        self.inner.lock().clone()
    }
}

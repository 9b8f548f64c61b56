//! # Serial Monitor
//!
//! Background reader that turns device lines into [`TimerStore`] updates.
//!
//! The monitor blocks on the device with the port's read timeout rather than
//! polling for waiting bytes. A timeout in the middle of a line keeps the bytes
//! already received, so a line split across two reads is still applied once.
//!
//! It runs on its own OS thread for the lifetime of the process. No single
//! failure ends the loop: read errors and undecodable lines are logged and the
//! next line is read as usual.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::BridgeError;
use crate::protocol::DeviceEvent;
use crate::state::TimerStore;

/// Pause after an iteration that produced no line.
pub const IDLE_PACING: Duration = Duration::from_millis(10);

/// Outcome of one read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// A complete line was applied to the store.
    Line(DeviceEvent),
    /// A complete line that was empty after trimming.
    Blank,
    /// No complete line yet.
    Idle,
    /// The reader reported end of stream.
    Eof,
}

pub struct SerialMonitor<R, C> {
    reader: R,
    clock: C,
    store: TimerStore,
    pending: Vec<u8>,
}

impl<R: BufRead, C: Clock> SerialMonitor<R, C> {
    pub fn new(reader: R, clock: C, store: TimerStore) -> Self {
        Self {
            reader,
            clock,
            store,
            pending: Vec::new(),
        }
    }

    /// Reads until the next newline, a timeout, or an error.
    pub fn poll_once(&mut self) -> Result<Poll, BridgeError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => Ok(Poll::Eof),
            // Without a trailing newline the reader hit end of stream mid-line.
            Ok(_) if self.pending.last() != Some(&b'\n') => Ok(Poll::Idle),
            Ok(_) => {
                let raw = std::mem::take(&mut self.pending);
                let text = String::from_utf8(raw)?;
                Ok(self.handle_line(text.trim()))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(Poll::Idle)
            }
            Err(e) => {
                self.pending.clear();
                Err(BridgeError::Read(e))
            }
        }
    }

    fn handle_line(&self, line: &str) -> Poll {
        if line.is_empty() {
            return Poll::Blank;
        }

        let event = self.store.apply(line, self.clock.now_millis());
        info!(line, "received");
        match &event {
            DeviceEvent::NoSensor => warn!("device reports its distance sensor is not responding"),
            DeviceEvent::Start {
                device_millis: Some(uptime),
            } => info!(device_uptime_ms = uptime, "run started"),
            DeviceEvent::Stop {
                device_millis: Some(uptime),
            } => info!(device_uptime_ms = uptime, "run stopped"),
            _ => {}
        }
        Poll::Line(event)
    }

    /// Runs the read loop. Never returns.
    pub fn run(mut self) {
        loop {
            match self.poll_once() {
                Ok(Poll::Line(_)) | Ok(Poll::Blank) => continue,
                Ok(Poll::Idle) | Ok(Poll::Eof) => {}
                Err(e @ BridgeError::Decode(_)) => warn!(error = %e, "dropping line"),
                Err(e) => error!(error = %e, "error while reading data"),
            }
            thread::sleep(IDLE_PACING);
        }
    }
}

impl<R, C> SerialMonitor<R, C>
where
    R: BufRead + Send + 'static,
    C: Clock + 'static,
{
    /// Starts [`SerialMonitor::run`] on a dedicated thread named `serial-monitor`.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("serial-monitor".to_string())
            .spawn(move || self.run())
    }
}

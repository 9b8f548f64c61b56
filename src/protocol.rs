//! # Device Line Protocol
//!
//! The timer device speaks newline-delimited text. Each line is classified by
//! prefix only; anything unrecognised is kept as a diagnostic line.
//!
//! | Line | Meaning |
//! |------|---------|
//! | `START [uptime_ms]` | a player crossed the gate, a new run begins |
//! | `STOP [uptime_ms]` | the player finished |
//! | `TIME MM:SS:mmm` | the device's own measurement of the run |
//! | `WAITING` | armed, waiting for a player |
//! | `NOSENSOR` | the distance sensor failed to initialise |
//!
//! The uptime payload on `START`/`STOP` is the device's `millis()` counter.
//! It is parsed for logging only: run timestamps always come from the host clock.

/// Command sent to the device to arm it, as if its button had been pressed.
pub const COMMAND_GO: &[u8] = b"GO\n";

const START: &str = "START";
const STOP: &str = "STOP";
const TIME: &str = "TIME";
const WAITING: &str = "WAITING";
const NO_SENSOR: &str = "NOSENSOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Start { device_millis: Option<i64> },
    Stop { device_millis: Option<i64> },
    /// Formatted elapsed time reported by the device, passed through untouched.
    Time(String),
    Waiting,
    NoSensor,
    Other,
}

impl DeviceEvent {
    /// Classifies an already trimmed, non-empty line.
    pub fn parse(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix(START) {
            DeviceEvent::Start {
                device_millis: parse_uptime(rest),
            }
        } else if let Some(rest) = line.strip_prefix(STOP) {
            DeviceEvent::Stop {
                device_millis: parse_uptime(rest),
            }
        } else if let Some(rest) = line.strip_prefix(TIME) {
            DeviceEvent::Time(time_payload(rest).to_string())
        } else if line == WAITING {
            DeviceEvent::Waiting
        } else if line == NO_SENSOR {
            DeviceEvent::NoSensor
        } else {
            DeviceEvent::Other
        }
    }

    /// Whether this event touches the run fields rather than just the diagnostic line.
    pub fn is_timer_event(&self) -> bool {
        matches!(
            self,
            DeviceEvent::Start { .. } | DeviceEvent::Stop { .. } | DeviceEvent::Time(_)
        )
    }
}

fn parse_uptime(rest: &str) -> Option<i64> {
    rest.trim().parse().ok()
}

/// Whatever follows the prefix and its one-character delimiter, trimmed.
fn time_payload(rest: &str) -> &str {
    let mut chars = rest.chars();
    chars.next();
    chars.as_str().trim()
}

//! Runtime configuration.
//!
//! Defaults match a device on `COM17` at 9600 baud with the dashboard on
//! port 5000. Each value can be overridden from the environment or a `.env`
//! file in the working directory:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LINE_TIMER_SERIAL_PORT` | `COM17` |
//! | `LINE_TIMER_BAUD_RATE` | `9600` |
//! | `LINE_TIMER_READ_TIMEOUT_MS` | `1000` |
//! | `LINE_TIMER_BIND` | `0.0.0.0:5000` |

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::BridgeError;

pub const ENV_SERIAL_PORT: &str = "LINE_TIMER_SERIAL_PORT";
pub const ENV_BAUD_RATE: &str = "LINE_TIMER_BAUD_RATE";
pub const ENV_READ_TIMEOUT_MS: &str = "LINE_TIMER_READ_TIMEOUT_MS";
pub const ENV_BIND: &str = "LINE_TIMER_BIND";

const DEFAULT_SERIAL_PORT: &str = "COM17";
const DEFAULT_BAUD_RATE: u32 = 9600;
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_BIND: ([u8; 4], u16) = ([0, 0, 0, 0], 5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub serial_port: String,
    pub baud_rate: u32,
    /// Upper bound on a single blocking read from the device.
    pub read_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            bind_addr: SocketAddr::from(DEFAULT_BIND),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads overrides from the process environment.
    pub fn from_env() -> Result<Self, BridgeError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_SERIAL_PORT).filter(|p| !p.trim().is_empty()) {
            config.serial_port = port.trim().to_string();
        }
        if let Some(baud) = parse_var::<u32, _>(&lookup, ENV_BAUD_RATE)? {
            config.baud_rate = nonzero(ENV_BAUD_RATE, baud)?;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_READ_TIMEOUT_MS)? {
            config.read_timeout = Duration::from_millis(nonzero(ENV_READ_TIMEOUT_MS, ms)?);
        }
        if let Some(addr) = parse_var::<SocketAddr, _>(&lookup, ENV_BIND)? {
            config.bind_addr = addr;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, BridgeError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| BridgeError::Config {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn nonzero<T>(key: &'static str, value: T) -> Result<T, BridgeError>
where
    T: Default + PartialEq + Display,
{
    if value == T::default() {
        return Err(BridgeError::Config {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

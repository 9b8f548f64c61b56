//! Error taxonomy for the bridge.
//!
//! Only [`BridgeError::Connection`] and [`BridgeError::Config`] are fatal, and
//! only at startup. Read and decode failures stay inside the monitor loop;
//! write failures are turned into an HTTP 500 by the server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The serial device could not be opened.
    #[error("failed to open serial port {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },
    /// Reading from the device failed.
    #[error("serial read failed: {0}")]
    Read(#[source] std::io::Error),
    /// A received line was not valid UTF-8.
    #[error("received line is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Writing a command to the device failed.
    #[error("{0}")]
    Write(#[source] std::io::Error),
    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },
}

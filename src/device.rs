//! Serial connection to the timer device.
//!
//! The port is opened once and cloned: the monitor thread owns the read half
//! and the HTTP side shares the write half through a [`CommandSink`].

use std::io::{BufReader, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serialport::SerialPort;
use tracing::info;

use crate::config::Config;
use crate::error::BridgeError;
use crate::protocol::COMMAND_GO;

pub struct DeviceHandles {
    pub reader: BufReader<Box<dyn SerialPort>>,
    pub commands: CommandSink,
}

/// Opens the configured port with its baud rate and read timeout.
pub fn open_device(config: &Config) -> Result<DeviceHandles, BridgeError> {
    let connection_error = |source| BridgeError::Connection {
        port: config.serial_port.clone(),
        source,
    };

    let port = serialport::new(config.serial_port.as_str(), config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(connection_error)?;
    let writer = port.try_clone().map_err(connection_error)?;

    info!(
        port = %config.serial_port,
        baud_rate = config.baud_rate,
        "successfully connected to device"
    );

    Ok(DeviceHandles {
        reader: BufReader::new(port),
        commands: CommandSink::new(writer),
    })
}

/// Shared, cloneable write access to the device.
#[derive(Clone)]
pub struct CommandSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl CommandSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sends `GO` to the device. No reply is awaited.
    pub fn send_go(&self) -> Result<(), BridgeError> {
        let mut writer = self.writer.lock();
        writer.write_all(COMMAND_GO).map_err(BridgeError::Write)?;
        writer.flush().map_err(BridgeError::Write)
    }
}

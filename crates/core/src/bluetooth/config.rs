//! Bluetooth configuration for the chat transport

use uuid::Uuid;

use crate::config::Config;
use crate::constants::{service_uuids, transfer};

/// Settings for the BLE connection manager
#[derive(Debug, Clone)]
pub struct BluetoothConfig {
    /// Service exposing the chat characteristics
    pub service_uuid: Uuid,
    /// Characteristic outgoing chunks are written to
    pub write_characteristic: Uuid,
    /// Characteristic incoming chunks are notified on
    pub notify_characteristic: Uuid,
    /// MTU requested before each send
    pub requested_mtu: u16,
    /// Bytes per write
    pub chunk_size: usize,
    /// Log every discovery and chunk
    pub verbose_logging: bool,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            service_uuid: service_uuids::CHAT_SERVICE,
            write_characteristic: service_uuids::WRITE_CHARACTERISTIC,
            notify_characteristic: service_uuids::NOTIFY_CHARACTERISTIC,
            requested_mtu: transfer::REQUESTED_MTU,
            chunk_size: transfer::CHUNK_SIZE,
            verbose_logging: false,
        }
    }
}

impl From<&Config> for BluetoothConfig {
    fn from(config: &Config) -> Self {
        Self::default()
            .with_transfer_limits(config.requested_mtu, config.chunk_size)
            .with_verbose_logging(config.verbose_logging)
    }
}

impl BluetoothConfig {
    /// Override requested MTU and chunk size
    pub fn with_transfer_limits(mut self, requested_mtu: u16, chunk_size: usize) -> Self {
        self.requested_mtu = requested_mtu;
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }
}

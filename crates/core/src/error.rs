//! Error types for the BLE chat core

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the chat transport, session and local storage
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Bluetooth unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("Scan failed: {0}")]
    ScanFailed(String),

    #[error("No devices")]
    NoDevices,

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Connection to {address} failed: {reason}")]
    ConnectFailed { address: String, reason: String },

    #[error("Characteristic {0} not found")]
    CharacteristicMissing(Uuid),

    #[error("Not connected to any device")]
    NotConnected,

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("Unknown contact: {0}")]
    UnknownContact(String),

    #[error("Invalid theme mode: {0}")]
    InvalidTheme(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl From<btleplug::Error> for ChatError {
    fn from(e: btleplug::Error) -> Self {
        ChatError::AdapterUnavailable(e.to_string())
    }
}

//! BLE Chat Core Library
//!
//! Peer-to-peer chat over a Bluetooth LE GATT link: scanning, a single
//! connection, chunked writes and brace-balanced reassembly, plus the local
//! contact list and theme preference.

pub mod bluetooth;
pub mod commands;
pub mod config;
pub mod constants;
pub mod contacts;
pub mod error;
pub mod location;
pub mod message;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod theme;

// Re-export important types for easier access
pub use bluetooth::{BluetoothConfig, BluetoothConnectionManager, BluetoothEvent};
pub use commands::{ChatCommand, CommandProcessor, CommandResult};
pub use config::Config;
pub use contacts::{ChatList, ChatsModel, ContactInsert};
pub use error::{ChatError, ChatResult};
pub use location::Location;
pub use message::ChatMessage;
pub use session::{ChatSession, SessionUpdate};
pub use storage::Storage;
pub use theme::{ThemeMode, ThemePreference};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use constants::prefs;

/// Bluetooth transport plus the settings of one running app
pub struct ChatCore {
    config: Config,
    bluetooth: BluetoothConnectionManager,
}

/// Open local storage and bring up the Bluetooth manager
pub async fn init(config: Config) -> Result<ChatCore> {
    config.validate()?;
    Storage::new(&config.data_dir)?;
    let bluetooth = BluetoothConnectionManager::with_config(BluetoothConfig::from(&config)).await?;

    info!(
        "Chat core ready (device: {}, bluetooth: {})",
        config.device_name,
        if bluetooth.is_available() { "available" } else { "offline" }
    );

    Ok(ChatCore {
        config,
        bluetooth,
    })
}

impl ChatCore {
    pub fn bluetooth(&self) -> &BluetoothConnectionManager {
        &self.bluetooth
    }

    /// Fresh chat screen state, seeded with the configured location
    pub fn new_session(&self) -> ChatSession {
        ChatSession::new().with_location(self.config.location)
    }

    /// Get the Bluetooth event receiver (once)
    pub async fn take_bluetooth_events(&self) -> Option<mpsc::UnboundedReceiver<BluetoothEvent>> {
        self.bluetooth.take_event_receiver().await
    }

    /// Stop scanning and drop the connection
    pub async fn stop(&self) -> Result<()> {
        self.bluetooth.stop().await?;
        Ok(())
    }
}

/// Contact list from the `chats` store
pub fn open_chat_list(storage: &Storage) -> ChatResult<ChatList> {
    ChatList::load(storage.store(prefs::CHATS_STORE))
}

/// Theme preference from the `app_prefs` store
pub fn open_theme(storage: &Storage) -> ThemePreference {
    ThemePreference::new(storage.store(prefs::APP_PREFS_STORE))
}

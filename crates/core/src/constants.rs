//! Global constants for BLE chat

/// GATT profile used for chat traffic (Nordic UART Service layout)
pub mod service_uuids {
    use uuid::Uuid;

    /// Chat service UUID
    pub const CHAT_SERVICE: Uuid = uuid::uuid!("6e400001-b5a3-f393-e0a9-e50e24dcca9e");

    /// Characteristic the central writes outgoing chunks to.
    /// Chat peers use the NUS pair reversed: writes go to `...0003`.
    pub const WRITE_CHARACTERISTIC: Uuid = uuid::uuid!("6e400003-b5a3-f393-e0a9-e50e24dcca9e");

    /// Characteristic the peripheral notifies incoming chunks on
    pub const NOTIFY_CHARACTERISTIC: Uuid = uuid::uuid!("6e400002-b5a3-f393-e0a9-e50e24dcca9e");
}

/// Chunking limits
pub mod transfer {
    /// MTU requested before every send
    pub const REQUESTED_MTU: u16 = 128;

    /// ATT header overhead per write
    pub const ATT_HEADER_SIZE: usize = 3;

    /// Bytes per write (MTU - 3)
    pub const CHUNK_SIZE: usize = REQUESTED_MTU as usize - ATT_HEADER_SIZE;
}

/// Local key-value storage layout
pub mod prefs {
    /// Store holding the theme choice
    pub const APP_PREFS_STORE: &str = "app_prefs";

    /// Theme key inside `app_prefs`
    pub const KEY_NIGHT_MODE: &str = "night_mode";

    /// Store holding the contact list
    pub const CHATS_STORE: &str = "chats";

    /// Contact list key inside `chats`
    pub const KEY_CHAT_LIST: &str = "chat_list";
}

/// Chat log sender identities
pub mod senders {
    pub const SELF_NAME: &str = "Me";
    pub const SELF_ID: &str = "SELF";
    pub const DEVICE_NAME: &str = "Device";
    pub const DEVICE_ID: &str = "DEVICE";
}

/// Status line texts shown by the chat screen
pub mod status {
    pub const SCANNING: &str = "Scanning…";
    pub const SCAN_FAILED: &str = "Scan failed";
    pub const NO_DEVICES: &str = "No devices";
    pub const CONNECTED: &str = "Connected";
    pub const CONNECT_FAILED: &str = "Connect failed";
    pub const DISCONNECTED: &str = "Disconnected";
    pub const SEND_FAILED: &str = "Send failed";
}

//! Bluetooth event types

/// Events emitted by the BluetoothConnectionManager
#[derive(Debug, Clone, PartialEq)]
pub enum BluetoothEvent {
    /// Scanning state changed
    ScanningStateChanged { scanning: bool },
    /// A device address was seen for the first time in this scan
    DeviceDiscovered { address: String, name: Option<String> },
    /// The discovery stream failed
    ScanFailed { error: String },
    /// GATT connection established and notifications subscribed
    Connected { address: String },
    /// Connection attempt failed
    ConnectFailed { address: String, error: String },
    /// Connection dropped or closed
    Disconnected { address: String },
    /// Raw payload notified on the notify characteristic
    NotificationReceived { address: String, data: Vec<u8> },
    /// All chunks of an outgoing message were written
    MessageSent { chunks: usize },
    /// Writing an outgoing message failed
    SendFailed { error: String },
}

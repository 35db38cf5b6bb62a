//! Chat screen state driven by Bluetooth events
//!
//! Holds the status line, the discovered-device list, the in-memory chat log
//! and the reassembly buffer. Transport calls live in the connection manager;
//! this type only reacts to their outcomes.

use tracing::{debug, warn};

use crate::bluetooth::{BluetoothEvent, DeviceRegistry, DiscoveredDevice};
use crate::constants::status;
use crate::error::{ChatError, ChatResult};
use crate::location::{compose_outgoing, Location};
use crate::message::ChatMessage;
use crate::protocol::ReassemblyBuffer;

/// Something the front end should show
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Status(String),
    Message(ChatMessage),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    status: String,
    devices: DeviceRegistry<()>,
    selected: Option<String>,
    connected: Option<String>,
    reassembly: ReassemblyBuffer,
    messages: Vec<ChatMessage>,
    location: Option<Location>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn devices(&self) -> impl Iterator<Item = &DiscoveredDevice<()>> {
        self.devices.iter()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn connected_address(&self) -> Option<&str> {
        self.connected.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
    }

    fn set_status(&mut self, text: impl Into<String>) -> SessionUpdate {
        self.status = text.into();
        SessionUpdate::Status(self.status.clone())
    }

    /// Reset the device list ahead of a new scan
    pub fn begin_scan(&mut self) -> SessionUpdate {
        self.devices.clear();
        self.set_status(status::SCANNING)
    }

    /// Pick a device by list index or address; returns its address.
    pub fn select_device(&mut self, selector: &str) -> ChatResult<String> {
        if self.devices.is_empty() {
            self.set_status(status::NO_DEVICES);
            return Err(ChatError::NoDevices);
        }

        let (address, label) = self
            .devices
            .select(selector)
            .map(|d| (d.address.clone(), d.label()))
            .ok_or_else(|| ChatError::UnknownDevice(selector.to_string()))?;

        self.set_status(format!("Selected {}", label));
        self.selected = Some(address.clone());
        Ok(address)
    }

    /// Compose the outgoing payload and log it. Fails without a connection.
    pub fn prepare_send(&mut self, text: &str) -> ChatResult<String> {
        let payload = compose_outgoing(text, self.location.as_ref());
        if !self.is_connected() {
            return Err(ChatError::NotConnected);
        }
        self.messages.push(ChatMessage::outgoing(&payload));
        Ok(payload)
    }

    pub fn handle_event(&mut self, event: BluetoothEvent) -> Option<SessionUpdate> {
        match event {
            BluetoothEvent::ScanningStateChanged { scanning } => {
                debug!("Scanning: {}", scanning);
                None
            }
            BluetoothEvent::DeviceDiscovered { address, name } => {
                if self.devices.insert(address, name, ()) {
                    let found = format!("Found {}", self.devices.len());
                    Some(self.set_status(found))
                } else {
                    None
                }
            }
            BluetoothEvent::ScanFailed { error } => {
                warn!("scan: {}", error);
                Some(self.set_status(status::SCAN_FAILED))
            }
            BluetoothEvent::Connected { address } => {
                self.connected = Some(address);
                Some(self.set_status(status::CONNECTED))
            }
            BluetoothEvent::ConnectFailed { address, error } => {
                warn!("conn {}: {}", address, error);
                Some(self.set_status(status::CONNECT_FAILED))
            }
            BluetoothEvent::Disconnected { address } => {
                let current = self.connected.as_deref() == Some(address.as_str());
                // A connect attempt cancelled before it completed
                let pending = self.connected.is_none() && self.selected.as_deref() == Some(address.as_str());
                if current || pending {
                    self.connected = None;
                    Some(self.set_status(status::DISCONNECTED))
                } else {
                    None
                }
            }
            BluetoothEvent::NotificationReceived { data, .. } => {
                let text = self.reassembly.push(&data)?;
                let message = ChatMessage::incoming(&text);
                self.messages.push(message.clone());
                Some(SessionUpdate::Message(message))
            }
            BluetoothEvent::MessageSent { chunks } => {
                debug!("message sent in {} chunk(s)", chunks);
                None
            }
            BluetoothEvent::SendFailed { error } => {
                warn!("send: {}", error);
                Some(self.set_status(status::SEND_FAILED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: &str = "AA:BB:CC:DD:EE:01";
    const ADDR_B: &str = "AA:BB:CC:DD:EE:02";

    fn discovered(address: &str, name: Option<&str>) -> BluetoothEvent {
        BluetoothEvent::DeviceDiscovered {
            address: address.to_string(),
            name: name.map(str::to_string),
        }
    }

    fn connected_session() -> ChatSession {
        let mut session = ChatSession::new();
        session.handle_event(BluetoothEvent::Connected {
            address: ADDR_A.to_string(),
        });
        session
    }

    #[test]
    fn test_scan_counts_unique_devices() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin_scan(), SessionUpdate::Status("Scanning…".to_string()));

        assert_eq!(
            session.handle_event(discovered(ADDR_A, Some("Pixel"))),
            Some(SessionUpdate::Status("Found 1".to_string()))
        );
        assert_eq!(session.handle_event(discovered(ADDR_A, Some("Pixel"))), None);
        session.handle_event(discovered(ADDR_B, None));

        assert_eq!(session.status(), "Found 2");
        let labels: Vec<_> = session.devices().map(|d| d.label()).collect();
        assert_eq!(labels, vec!["Pixel (AA:BB:CC:DD:EE:01)", "AA:BB:CC:DD:EE:02 (AA:BB:CC:DD:EE:02)"]);
    }

    #[test]
    fn test_new_scan_clears_results() {
        let mut session = ChatSession::new();
        session.handle_event(discovered(ADDR_A, None));
        session.begin_scan();
        assert_eq!(session.devices().count(), 0);
        assert_eq!(
            session.handle_event(discovered(ADDR_A, None)),
            Some(SessionUpdate::Status("Found 1".to_string()))
        );
    }

    #[test]
    fn test_select_device() {
        let mut session = ChatSession::new();
        assert!(matches!(session.select_device("0"), Err(ChatError::NoDevices)));
        assert_eq!(session.status(), "No devices");

        session.handle_event(discovered(ADDR_A, Some("Pixel")));
        assert!(matches!(session.select_device("3"), Err(ChatError::UnknownDevice(_))));

        assert_eq!(session.select_device("0").unwrap(), ADDR_A);
        assert_eq!(session.status(), "Selected Pixel (AA:BB:CC:DD:EE:01)");
        assert_eq!(session.selected(), Some(ADDR_A));
    }

    #[test]
    fn test_connection_status_transitions() {
        let mut session = ChatSession::new();
        session.handle_event(BluetoothEvent::ConnectFailed {
            address: ADDR_A.to_string(),
            error: "timeout".to_string(),
        });
        assert_eq!(session.status(), "Connect failed");
        assert!(!session.is_connected());

        session.handle_event(BluetoothEvent::Connected {
            address: ADDR_A.to_string(),
        });
        assert_eq!(session.status(), "Connected");
        assert_eq!(session.connected_address(), Some(ADDR_A));

        // A stale link dropping does not clear the current one
        assert_eq!(
            session.handle_event(BluetoothEvent::Disconnected {
                address: ADDR_B.to_string()
            }),
            None
        );
        assert!(session.is_connected());

        session.handle_event(BluetoothEvent::Disconnected {
            address: ADDR_A.to_string(),
        });
        assert_eq!(session.status(), "Disconnected");
        assert!(!session.is_connected());
    }

    #[test]
    fn test_disconnect_during_pending_connect() {
        let mut session = ChatSession::new();
        session.handle_event(discovered(ADDR_A, Some("Pixel")));
        session.handle_event(discovered(ADDR_B, None));
        session.select_device(ADDR_A).unwrap();
        assert_eq!(session.status(), "Selected Pixel (AA:BB:CC:DD:EE:01)");

        // Cancelled attempt for some other device leaves the status alone
        assert_eq!(
            session.handle_event(BluetoothEvent::Disconnected {
                address: ADDR_B.to_string()
            }),
            None
        );

        assert_eq!(
            session.handle_event(BluetoothEvent::Disconnected {
                address: ADDR_A.to_string()
            }),
            Some(SessionUpdate::Status("Disconnected".to_string()))
        );
        assert!(!session.is_connected());
    }

    #[test]
    fn test_send_requires_connection() {
        let mut session = ChatSession::new();
        assert!(matches!(session.prepare_send("hi"), Err(ChatError::NotConnected)));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_send_logs_outgoing_with_location() {
        let mut session = connected_session().with_location(Some(Location::new(1.5, 2.25)));

        let payload = session.prepare_send("  hi  ").unwrap();
        assert_eq!(
            payload,
            "hi\nLocation: https://www.openstreetmap.org/?mlat=1.5&mlon=2.25"
        );
        let logged = &session.messages()[0];
        assert_eq!(logged.text, format!("TX: {}", payload));
        assert!(logged.is_sent);
    }

    #[test]
    fn test_incoming_chunks_become_one_message() {
        let mut session = connected_session();
        let notify = |data: &[u8]| BluetoothEvent::NotificationReceived {
            address: ADDR_A.to_string(),
            data: data.to_vec(),
        };

        assert_eq!(session.handle_event(notify(b"{\"msg\":")), None);
        let update = session.handle_event(notify(b"\"hello\"}")).unwrap();

        match update {
            SessionUpdate::Message(msg) => {
                assert_eq!(msg.text, "RX: {\"msg\":\"hello\"}");
                assert_eq!(msg.sender_id, "DEVICE");
            }
            other => panic!("unexpected update: {:?}", other),
        }
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_failures_surface_as_status() {
        let mut session = connected_session();
        session.handle_event(BluetoothEvent::SendFailed {
            error: "gatt error".to_string(),
        });
        assert_eq!(session.status(), "Send failed");

        session.handle_event(BluetoothEvent::ScanFailed {
            error: "adapter off".to_string(),
        });
        assert_eq!(session.status(), "Scan failed");
        assert!(session.is_connected());
    }
}

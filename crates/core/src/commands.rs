//! Command handling for the chat screen

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::bluetooth::BluetoothEvent;
use crate::location::Location;
use crate::session::{ChatSession, SessionUpdate};
use crate::ChatCore;

/// Represents the result of executing a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Success(String),
    Error(String),
    Exit,
}

/// Chat screen commands
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    // Device commands
    Scan,
    StopScan,
    Devices,
    Connect(String), // list index or address
    Disconnect,

    // Messaging
    Send(String),
    History,
    SetLocation(Option<Location>),

    // System commands
    Status,
    Help,
    Quit,
}

impl ChatCommand {
    /// Parse a line of input; anything not starting with `/` is a message
    pub fn parse(input: &str) -> Result<Self> {
        if !input.trim_start().starts_with('/') {
            return Ok(ChatCommand::Send(input.to_string()));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts[0] {
            "/scan" | "/s" => Ok(ChatCommand::Scan),
            "/stop" => Ok(ChatCommand::StopScan),
            "/devices" | "/d" => Ok(ChatCommand::Devices),
            "/connect" | "/c" => {
                if parts.len() < 2 {
                    return Err(anyhow!("Usage: /connect <index|address>"));
                }
                Ok(ChatCommand::Connect(parts[1].to_string()))
            }
            "/disconnect" => Ok(ChatCommand::Disconnect),
            "/history" => Ok(ChatCommand::History),
            "/loc" => match parts.get(1..) {
                Some(["off"]) => Ok(ChatCommand::SetLocation(None)),
                Some([lat, lon]) => {
                    let latitude = lat.parse().map_err(|_| anyhow!("Invalid latitude: {}", lat))?;
                    let longitude = lon.parse().map_err(|_| anyhow!("Invalid longitude: {}", lon))?;
                    Ok(ChatCommand::SetLocation(Some(Location::new(latitude, longitude))))
                }
                _ => Err(anyhow!("Usage: /loc <lat> <lon> | /loc off")),
            },
            "/status" => Ok(ChatCommand::Status),
            "/help" | "/h" | "/?" => Ok(ChatCommand::Help),
            "/quit" | "/exit" | "/q" => Ok(ChatCommand::Quit),
            other => Err(anyhow!("Unknown command: {}", other)),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> String {
        r#"
Commands:

Devices:
  /scan               Scan for nearby BLE devices
  /stop               Stop scanning
  /devices            List devices found by the last scan
  /connect <n|addr>   Connect to a device by list index or address
  /disconnect         Close the current connection

Messaging:
  <message>           Send message to the connected device
  /history            Show this session's messages
  /loc <lat> <lon>    Append a map link to outgoing messages
  /loc off            Stop appending the map link

System:
  /status             Show connection status
  /help               Show this help
  /quit               Exit
        "#
        .to_string()
    }
}

/// Runs chat commands against the core and keeps the session state
pub struct CommandProcessor {
    core: Arc<ChatCore>,
    session: ChatSession,
}

impl CommandProcessor {
    pub fn new(core: Arc<ChatCore>) -> Self {
        let session = core.new_session();
        Self { core, session }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Feed a Bluetooth event into the session
    pub fn handle_event(&mut self, event: BluetoothEvent) -> Option<SessionUpdate> {
        self.session.handle_event(event)
    }

    /// Process a line of input and return the result
    pub async fn process_input(&mut self, input: &str) -> CommandResult {
        match ChatCommand::parse(input) {
            Ok(command) => self.execute_command(command).await,
            Err(e) => CommandResult::Error(e.to_string()),
        }
    }

    /// Execute a parsed command
    pub async fn execute_command(&mut self, command: ChatCommand) -> CommandResult {
        let bluetooth = self.core.bluetooth();

        match command {
            ChatCommand::Scan => {
                self.session.begin_scan();
                match bluetooth.start_scan().await {
                    Ok(()) => CommandResult::Success(self.session.status().to_string()),
                    Err(e) => {
                        self.session.handle_event(BluetoothEvent::ScanFailed { error: e.to_string() });
                        CommandResult::Error(format!("{}: {}", self.session.status(), e))
                    }
                }
            }

            ChatCommand::StopScan => match bluetooth.stop_scan().await {
                Ok(()) => CommandResult::Success("Scan stopped".to_string()),
                Err(e) => CommandResult::Error(e.to_string()),
            },

            ChatCommand::Devices => {
                let lines: Vec<String> = self
                    .session
                    .devices()
                    .enumerate()
                    .map(|(i, d)| format!("  [{}] {}", i, d.label()))
                    .collect();
                if lines.is_empty() {
                    CommandResult::Success("No devices".to_string())
                } else {
                    CommandResult::Success(format!("Devices ({}):\n{}", lines.len(), lines.join("\n")))
                }
            }

            ChatCommand::Connect(selector) => {
                let address = match self.session.select_device(&selector) {
                    Ok(address) => address,
                    Err(e) => return CommandResult::Error(e.to_string()),
                };
                match bluetooth.connect(&address).await {
                    Ok(()) => CommandResult::Success(self.session.status().to_string()),
                    Err(e) => {
                        self.session.handle_event(BluetoothEvent::ConnectFailed {
                            address,
                            error: e.to_string(),
                        });
                        CommandResult::Error(format!("{}: {}", self.session.status(), e))
                    }
                }
            }

            ChatCommand::Disconnect => match bluetooth.disconnect().await {
                Ok(()) => CommandResult::Success("Disconnecting".to_string()),
                Err(e) => CommandResult::Error(e.to_string()),
            },

            ChatCommand::Send(text) => {
                let payload = match self.session.prepare_send(&text) {
                    Ok(payload) => payload,
                    Err(e) => return CommandResult::Error(e.to_string()),
                };
                match bluetooth.send_message(payload.clone()).await {
                    Ok(()) => CommandResult::Success(format!("TX: {}", payload)),
                    Err(e) => {
                        self.session.handle_event(BluetoothEvent::SendFailed { error: e.to_string() });
                        CommandResult::Error(e.to_string())
                    }
                }
            }

            ChatCommand::History => {
                let messages = self.session.messages();
                if messages.is_empty() {
                    return CommandResult::Success("No messages".to_string());
                }
                let lines: Vec<String> = messages
                    .iter()
                    .map(|m| format!("[{}] {}: {}", m.timestamp.format("%H:%M:%S"), m.sender_name, m.text))
                    .collect();
                CommandResult::Success(lines.join("\n"))
            }

            ChatCommand::SetLocation(location) => {
                let text = match &location {
                    Some(loc) => format!("Location set: {}", loc.map_link()),
                    None => "Location cleared".to_string(),
                };
                self.session.set_location(location);
                CommandResult::Success(text)
            }

            ChatCommand::Status => CommandResult::Success(format!(
                "Status: {}\n\
                Bluetooth: {}\n\
                Scanning: {}\n\
                Devices found: {}\n\
                Connected to: {}\n\
                Messages: {}",
                self.session.status(),
                if bluetooth.is_available() { "available" } else { "unavailable" },
                if bluetooth.is_scanning().await { "yes" } else { "no" },
                self.session.devices().count(),
                self.session.connected_address().unwrap_or("-"),
                self.session.messages().len(),
            )),

            ChatCommand::Help => CommandResult::Success(ChatCommand::help_text()),

            ChatCommand::Quit => CommandResult::Exit,
        }
    }
}

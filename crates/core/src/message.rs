use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::senders;

/// A line in the chat log. Lives only for the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub is_sent: bool,
    pub sender_name: String,
    pub sender_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(text: String, is_sent: bool, sender_name: &str, sender_id: &str) -> Self {
        Self {
            text,
            is_sent,
            sender_name: sender_name.to_string(),
            sender_id: sender_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn outgoing(payload: &str) -> Self {
        Self::new(
            format!("TX: {}", payload),
            true,
            senders::SELF_NAME,
            senders::SELF_ID,
        )
    }

    pub fn incoming(payload: &str) -> Self {
        Self::new(
            format!("RX: {}", payload),
            false,
            senders::DEVICE_NAME,
            senders::DEVICE_ID,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_message() {
        let msg = ChatMessage::outgoing("hi");
        assert_eq!(msg.text, "TX: hi");
        assert!(msg.is_sent);
        assert_eq!(msg.sender_name, "Me");
        assert_eq!(msg.sender_id, "SELF");
    }

    #[test]
    fn test_incoming_message() {
        let msg = ChatMessage::incoming("{\"a\":1}");
        assert_eq!(msg.text, "RX: {\"a\":1}");
        assert!(!msg.is_sent);
        assert_eq!(msg.sender_name, "Device");
        assert_eq!(msg.sender_id, "DEVICE");
    }
}

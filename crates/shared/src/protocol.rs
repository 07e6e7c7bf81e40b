//! Realtime control envelopes.
//!
//! Outbound control messages are JSON objects of the form
//! `{"action": "JOIN" | "LEAVE", "room": "<room id>"}`.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Room membership action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomAction {
    Join,
    Leave,
}

/// Control envelope sent to the realtime peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub action: RoomAction,
    pub room: String,
}

impl ControlMessage {
    pub fn join(room: impl Into<String>) -> Self {
        Self {
            action: RoomAction::Join,
            room: room.into(),
        }
    }

    pub fn leave(room: impl Into<String>) -> Self {
        Self {
            action: RoomAction::Leave,
            room: room.into(),
        }
    }

    /// Encode the envelope as JSON text.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Build a JOIN envelope for `room_id`. The id is passed through as-is.
pub fn create_subscribe_message(room_id: &str) -> String {
    ControlMessage::join(room_id).to_text()
}

/// Build a LEAVE envelope for `room_id`. The id is passed through as-is.
pub fn create_unsubscribe_message(room_id: &str) -> String {
    ControlMessage::leave(room_id).to_text()
}

/// Decode a control envelope.
pub fn parse_control_message(text: &str) -> Result<ControlMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

//! Shared error types.

use thiserror::Error;

/// A failure tied to one room, such as a rejected subscribe.
///
/// Kept separate from connection-level failures so callers can report
/// "subscribe rejected for room X" without touching connection state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (room: {room_id})")]
pub struct RoomError {
    pub message: String,
    pub room_id: String,
}

impl RoomError {
    pub fn new(message: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            room_id: room_id.into(),
        }
    }
}

/// Control envelope decoding error.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid control message: {0}")]
    Decode(#[from] serde_json::Error),
}

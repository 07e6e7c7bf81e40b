//! Room addressing for the realtime transport.
//!
//! A room is a named topic on the realtime connection. Both ends agree on a
//! topic by formatting the same [`RoomConfig`] into the same string:
//! `category[:sub_category][:identifier]`.
//!
//! Segments are joined verbatim. A segment that itself contains `:` produces
//! an ambiguous topic; no escaping is applied.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter between room id segments.
pub const ROOM_DELIMITER: char = ':';

/// Top-level room category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomCategory {
    Chat,
    Voice,
    Whatsapp,
    Campaign,
    Analytics,
    Notification,
    /// A category defined by the remote peer that this client has no name for.
    Other(String),
}

impl RoomCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RoomCategory::Chat => "chat",
            RoomCategory::Voice => "voice",
            RoomCategory::Whatsapp => "whatsapp",
            RoomCategory::Campaign => "campaign",
            RoomCategory::Analytics => "analytics",
            RoomCategory::Notification => "notification",
            RoomCategory::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for RoomCategory {
    fn from(value: &str) -> Self {
        match value {
            "chat" => RoomCategory::Chat,
            "voice" => RoomCategory::Voice,
            "whatsapp" => RoomCategory::Whatsapp,
            "campaign" => RoomCategory::Campaign,
            "analytics" => RoomCategory::Analytics,
            "notification" => RoomCategory::Notification,
            other => RoomCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for RoomCategory {
    fn from(value: String) -> Self {
        RoomCategory::from(value.as_str())
    }
}

impl From<RoomCategory> for String {
    fn from(value: RoomCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional second room segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomSubCategory {
    Agent,
    Conversation,
    Session,
    User,
    Other(String),
}

impl RoomSubCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RoomSubCategory::Agent => "agent",
            RoomSubCategory::Conversation => "conversation",
            RoomSubCategory::Session => "session",
            RoomSubCategory::User => "user",
            RoomSubCategory::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for RoomSubCategory {
    fn from(value: &str) -> Self {
        match value {
            "agent" => RoomSubCategory::Agent,
            "conversation" => RoomSubCategory::Conversation,
            "session" => RoomSubCategory::Session,
            "user" => RoomSubCategory::User,
            other => RoomSubCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for RoomSubCategory {
    fn from(value: String) -> Self {
        RoomSubCategory::from(value.as_str())
    }
}

impl From<RoomSubCategory> for String {
    fn from(value: RoomSubCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RoomSubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    pub category: RoomCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<RoomSubCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl RoomConfig {
    pub fn new(category: RoomCategory) -> Self {
        Self {
            category,
            sub_category: None,
            identifier: None,
        }
    }

    pub fn with_sub_category(mut self, sub_category: RoomSubCategory) -> Self {
        self.sub_category = Some(sub_category);
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Canonical topic string for this room.
    pub fn room_id(&self) -> String {
        format_room_id(self)
    }
}

/// Format a room config into its canonical topic string.
pub fn format_room_id(config: &RoomConfig) -> String {
    let mut id = String::from(config.category.as_str());
    if let Some(sub) = &config.sub_category {
        id.push(ROOM_DELIMITER);
        id.push_str(sub.as_str());
    }
    if let Some(identifier) = &config.identifier {
        id.push(ROOM_DELIMITER);
        id.push_str(identifier);
    }
    id
}

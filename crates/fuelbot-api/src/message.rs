//! Outbound message payload
//!
//! The sink only needs a title, a color, a timestamp and a list of
//! name/value fields. Markup inside values is passed through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Red, used for alerts and failures
pub const COLOR_ALERT: u32 = 0xff0000;

/// Green, used for status summaries
pub const COLOR_STATUS: u32 = 0x00ff00;

/// Thumbnail attached to every message
pub const FUEL_THUMBNAIL_URL: &str = "https://i.imgur.com/pKEZq6F.png";

/// A single name/value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageField {
    pub name: String,
    pub value: String,
}

impl MessageField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Rendered message handed to a notification sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<MessageField>,
    pub thumbnail_url: Option<String>,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, color: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            color,
            timestamp,
            fields: Vec::new(),
            thumbnail_url: Some(FUEL_THUMBNAIL_URL.to_string()),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MessageField::new(name, value));
        self
    }

    pub fn push_field(&mut self, field: MessageField) {
        self.fields.push(field);
    }

    /// Look up a field value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

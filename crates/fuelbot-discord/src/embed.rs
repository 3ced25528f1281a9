//! Embed payloads

use chrono::SecondsFormat;
use fuelbot_api::NotificationMessage;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    /// ISO 8601
    pub timestamp: String,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

/// Body of `POST /channels/{id}/messages`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMessage {
    pub embeds: Vec<Embed>,
}

impl From<&NotificationMessage> for Embed {
    fn from(message: &NotificationMessage) -> Self {
        Self {
            title: message.title.clone(),
            color: message.color,
            timestamp: message.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            fields: message
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: false,
                })
                .collect(),
            thumbnail: message
                .thumbnail_url
                .as_ref()
                .map(|url| EmbedThumbnail { url: url.clone() }),
        }
    }
}

impl From<&NotificationMessage> for CreateMessage {
    fn from(message: &NotificationMessage) -> Self {
        Self {
            embeds: vec![Embed::from(message)],
        }
    }
}

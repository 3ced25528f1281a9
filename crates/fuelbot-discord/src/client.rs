//! Discord REST client and notification sink

use async_trait::async_trait;
use fuelbot_api::NotificationMessage;
use fuelbot_provider_api::{FetchError, NotificationSink, SendError, SendResult};
use fuelbot_util::ChannelId;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::CreateMessage;

pub const DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Discord REST client authenticated as a bot
pub struct DiscordClient {
    pub(crate) http: reqwest::Client,
    token: String,
    base_url: String,
    /// Newest message id seen per command channel
    pub(crate) cursors: Mutex<HashMap<ChannelId, String>>,
}

impl DiscordClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self::with_base_url(http, token, DISCORD_API_BASE_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cursors: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

pub(crate) fn fetch_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

fn send_error(e: reqwest::Error) -> SendError {
    if e.is_timeout() {
        SendError::Timeout
    } else {
        SendError::Request(e.to_string())
    }
}

#[async_trait]
impl NotificationSink for DiscordClient {
    async fn send(&self, channel_id: &ChannelId, message: &NotificationMessage) -> SendResult<()> {
        let url = self.url(&format!("/channels/{}/messages", channel_id));
        let body = CreateMessage::from(message);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(channel_id = %channel_id, title = %message.title, "Message posted");
        Ok(())
    }
}

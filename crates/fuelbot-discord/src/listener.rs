//! Command listener over channel history polling
//!
//! The first poll of a channel only records the newest message id, so
//! commands posted before the bot started are not answered.

use async_trait::async_trait;
use fuelbot_api::InboundMessage;
use fuelbot_provider_api::{CommandSource, FetchError, FetchResult};
use fuelbot_util::{ChannelId, UserId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::DiscordClient;
use crate::client::fetch_error;

/// Maximum messages returned by one history request
const HISTORY_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    id: String,
    channel_id: String,
    author: User,
    #[serde(default)]
    content: String,
}

impl Message {
    fn into_inbound(self) -> InboundMessage {
        InboundMessage {
            message_id: self.id,
            channel_id: ChannelId::new(self.channel_id),
            author_id: UserId::new(self.author.id),
            content: self.content,
        }
    }
}

/// Snowflake ids grow with time; sort numerically, oldest first
fn sort_oldest_first(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.id.parse::<u64>().unwrap_or(0));
}

impl DiscordClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> FetchResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .query(query)
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response.json().await.map_err(fetch_error)
    }
}

#[async_trait]
impl CommandSource for DiscordClient {
    async fn identity(&self) -> FetchResult<UserId> {
        let user: User = self.get_json("/users/@me", &[]).await?;
        Ok(UserId::new(user.id))
    }

    async fn poll(&self, channel_id: &ChannelId) -> FetchResult<Vec<InboundMessage>> {
        let path = format!("/channels/{}/messages", channel_id);
        let mut cursors = self.cursors.lock().await;

        let Some(after) = cursors.get(channel_id).cloned() else {
            let mut latest: Vec<Message> = self.get_json(&path, &[("limit", "1".to_string())]).await?;
            // An empty channel starts from the beginning.
            let cursor = latest.pop().map_or_else(|| "0".to_string(), |m| m.id);
            debug!(channel_id = %channel_id, cursor = %cursor, "Command channel cursor initialized");
            cursors.insert(channel_id.clone(), cursor);
            return Ok(Vec::new());
        };

        let mut messages: Vec<Message> = self
            .get_json(
                &path,
                &[("after", after), ("limit", HISTORY_PAGE_LIMIT.to_string())],
            )
            .await?;
        sort_oldest_first(&mut messages);

        if let Some(newest) = messages.last() {
            cursors.insert(channel_id.clone(), newest.id.clone());
        }

        Ok(messages.into_iter().map(Message::into_inbound).collect())
    }
}

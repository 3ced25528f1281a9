//! Collaborator traits

use async_trait::async_trait;
use fuelbot_api::{InboundMessage, NotificationMessage, PriceHistoryEntry, StructureSnapshot};
use fuelbot_util::{ChannelId, ItemTypeId, UserId};
use std::fmt;
use thiserror::Error;

/// Errors from the credential provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No usable token: {0}")]
    TokenUnavailable(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Token verification failed: {0}")]
    VerifyFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication timed out")]
    Timeout,
}

/// Errors from the structure and market data providers
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,
}

/// Errors from the notification sink
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Message rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Send failed: {0}")]
    Request(String),

    #[error("Send timed out")]
    Timeout,
}

impl From<tokio::time::error::Elapsed> for AuthError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

impl From<tokio::time::error::Elapsed> for FetchError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

impl From<tokio::time::error::Elapsed> for SendError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
pub type FetchResult<T> = Result<T, FetchError>;
pub type SendResult<T> = Result<T, SendError>;

/// Authenticated handle for data provider calls
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub access_token: String,
    pub character_id: i64,
}

impl AuthContext {
    pub fn new(access_token: impl Into<String>, character_id: i64) -> Self {
        Self {
            access_token: access_token.into(),
            character_id,
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("access_token", &"<redacted>")
            .field("character_id", &self.character_id)
            .finish()
    }
}

/// Produces an authenticated context, refreshing tokens as needed
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authenticate(&self) -> AuthResult<AuthContext>;
}

/// Lists the structures to monitor
#[async_trait]
pub trait StructureProvider: Send + Sync {
    /// Structures in the provider's order; the monitor keeps that order.
    async fn list_structures(&self, ctx: &AuthContext) -> FetchResult<Vec<StructureSnapshot>>;
}

/// Daily market history for a commodity
#[async_trait]
pub trait MarketHistoryProvider: Send + Sync {
    /// Entries may come in any order; callers sort by date.
    async fn price_history(
        &self,
        ctx: &AuthContext,
        type_id: ItemTypeId,
    ) -> FetchResult<Vec<PriceHistoryEntry>>;
}

/// Delivers rendered messages to a channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, channel_id: &ChannelId, message: &NotificationMessage) -> SendResult<()>;
}

/// Source of inbound chat messages
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// User id the bot posts as, used to ignore its own messages
    async fn identity(&self) -> FetchResult<UserId>;

    /// Messages posted to `channel_id` since the previous poll, oldest first
    async fn poll(&self, channel_id: &ChannelId) -> FetchResult<Vec<InboundMessage>>;
}

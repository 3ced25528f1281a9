//! Shared handles to the remote collaborators, with bounded calls

use fuelbot_api::{NotificationMessage, StructureSnapshot};
use fuelbot_provider_api::{
    AuthContext, AuthResult, CredentialProvider, FetchResult, MarketHistoryProvider,
    NotificationSink, SendResult, StructureProvider,
};
use fuelbot_util::ChannelId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// The services the monitor and the status path talk to.
///
/// Every call made through these helpers is bounded by `request_timeout`; an
/// elapsed timeout surfaces as the matching error's `Timeout` variant.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<dyn CredentialProvider>,
    pub structures: Arc<dyn StructureProvider>,
    pub market: Arc<dyn MarketHistoryProvider>,
    pub sink: Arc<dyn NotificationSink>,
    pub request_timeout: Duration,
}

impl Collaborators {
    pub async fn authenticate(&self) -> AuthResult<AuthContext> {
        timeout(self.request_timeout, self.credentials.authenticate()).await?
    }

    pub async fn list_structures(&self, ctx: &AuthContext) -> FetchResult<Vec<StructureSnapshot>> {
        timeout(self.request_timeout, self.structures.list_structures(ctx)).await?
    }

    pub async fn send(&self, channel_id: &ChannelId, message: &NotificationMessage) -> SendResult<()> {
        timeout(self.request_timeout, self.sink.send(channel_id, message)).await?
    }
}

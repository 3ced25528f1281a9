//! Mock collaborators for testing

use async_trait::async_trait;
use fuelbot_api::{InboundMessage, NotificationMessage, PriceHistoryEntry, StructureSnapshot};
use fuelbot_util::{ChannelId, ItemTypeId, UserId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    AuthContext, AuthError, AuthResult, CommandSource, CredentialProvider, FetchError,
    FetchResult, MarketHistoryProvider, NotificationSink, SendError, SendResult,
    StructureProvider,
};

/// Mock remote data source: credentials, structures and market history
pub struct MockEsi {
    structures: Arc<Mutex<Vec<StructureSnapshot>>>,
    history: Arc<Mutex<HashMap<ItemTypeId, Vec<PriceHistoryEntry>>>>,
    auth_calls: AtomicUsize,
    history_calls: AtomicUsize,

    /// Configure authentication to fail
    pub fail_auth: Arc<Mutex<bool>>,

    /// Configure structure listing to fail
    pub fail_structures: Arc<Mutex<bool>>,

    /// Configure market history for these commodities to fail
    pub fail_history: Arc<Mutex<Vec<ItemTypeId>>>,

    /// Delay before every structure listing returns
    pub structures_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockEsi {
    pub fn new() -> Self {
        Self {
            structures: Arc::new(Mutex::new(Vec::new())),
            history: Arc::new(Mutex::new(HashMap::new())),
            auth_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            fail_auth: Arc::new(Mutex::new(false)),
            fail_structures: Arc::new(Mutex::new(false)),
            fail_history: Arc::new(Mutex::new(Vec::new())),
            structures_delay: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_structures(self, structures: Vec<StructureSnapshot>) -> Self {
        self.set_structures(structures);
        self
    }

    /// Set daily averages for a commodity, oldest first
    pub fn with_history(self, type_id: impl Into<ItemTypeId>, averages: &[f64]) -> Self {
        self.set_history(type_id, averages);
        self
    }

    pub fn set_structures(&self, structures: Vec<StructureSnapshot>) {
        *self.structures.lock().unwrap() = structures;
    }

    pub fn set_history(&self, type_id: impl Into<ItemTypeId>, averages: &[f64]) {
        let base = chrono::NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        let entries = averages
            .iter()
            .enumerate()
            .map(|(day, average)| PriceHistoryEntry {
                date: base + chrono::Days::new(day as u64),
                average: *average,
            })
            .collect();
        self.history.lock().unwrap().insert(type_id.into(), entries);
    }

    pub fn set_fail_auth(&self, fail: bool) {
        *self.fail_auth.lock().unwrap() = fail;
    }

    pub fn set_fail_structures(&self, fail: bool) {
        *self.fail_structures.lock().unwrap() = fail;
    }

    pub fn set_fail_history(&self, type_id: impl Into<ItemTypeId>) {
        self.fail_history.lock().unwrap().push(type_id.into());
    }

    pub fn set_structures_delay(&self, delay: Option<Duration>) {
        *self.structures_delay.lock().unwrap() = delay;
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockEsi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for MockEsi {
    async fn authenticate(&self) -> AuthResult<AuthContext> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_auth.lock().unwrap() {
            return Err(AuthError::TokenUnavailable("Mock auth failure".into()));
        }
        Ok(AuthContext::new("mock-token", 90000001))
    }
}

#[async_trait]
impl StructureProvider for MockEsi {
    async fn list_structures(&self, _ctx: &AuthContext) -> FetchResult<Vec<StructureSnapshot>> {
        let delay = *self.structures_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_structures.lock().unwrap() {
            return Err(FetchError::Request("Mock structure failure".into()));
        }
        Ok(self.structures.lock().unwrap().clone())
    }
}

#[async_trait]
impl MarketHistoryProvider for MockEsi {
    async fn price_history(
        &self,
        _ctx: &AuthContext,
        type_id: ItemTypeId,
    ) -> FetchResult<Vec<PriceHistoryEntry>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.lock().unwrap().contains(&type_id) {
            return Err(FetchError::Status {
                status: 502,
                url: format!("mock://history/{}", type_id),
            });
        }
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(&type_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Mock notification sink that records every delivered message
pub struct MockSink {
    sent: Arc<Mutex<Vec<(ChannelId, NotificationMessage)>>>,
    attempts: AtomicUsize,

    /// Configure sends to fail
    pub fail_send: Arc<Mutex<bool>>,

    /// Delay before every send returns
    pub send_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: AtomicUsize::new(0),
            fail_send: Arc::new(Mutex::new(false)),
            send_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Messages delivered successfully, in order
    pub fn sent(&self) -> Vec<(ChannelId, NotificationMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// Every send call, including failed ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn set_fail_send(&self, fail: bool) {
        *self.fail_send.lock().unwrap() = fail;
    }

    pub fn set_send_delay(&self, delay: Option<Duration>) {
        *self.send_delay.lock().unwrap() = delay;
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn send(&self, channel_id: &ChannelId, message: &NotificationMessage) -> SendResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let delay = *self.send_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_send.lock().unwrap() {
            return Err(SendError::Rejected {
                status: 500,
                body: "Mock send failure".into(),
            });
        }

        self.sent
            .lock()
            .unwrap()
            .push((channel_id.clone(), message.clone()));
        Ok(())
    }
}

/// Mock chat source fed with queued messages
pub struct MockCommandSource {
    self_id: UserId,
    queued: Arc<Mutex<HashMap<ChannelId, VecDeque<InboundMessage>>>>,
    next_id: AtomicUsize,

    /// Configure polling to fail
    pub fail_poll: Arc<Mutex<bool>>,

    /// Delay before every identity lookup and poll returns
    pub poll_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockCommandSource {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: UserId::new(self_id),
            queued: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicUsize::new(1),
            fail_poll: Arc::new(Mutex::new(false)),
            poll_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a message as if `author` had posted it to `channel`
    pub fn push(&self, channel: impl Into<ChannelId>, author: &str, content: &str) {
        let channel_id = channel.into();
        let message = InboundMessage {
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            channel_id: channel_id.clone(),
            author_id: UserId::new(author),
            content: content.to_string(),
        };
        self.queued
            .lock()
            .unwrap()
            .entry(channel_id)
            .or_default()
            .push_back(message);
    }

    pub fn set_fail_poll(&self, fail: bool) {
        *self.fail_poll.lock().unwrap() = fail;
    }

    pub fn set_poll_delay(&self, delay: Option<Duration>) {
        *self.poll_delay.lock().unwrap() = delay;
    }

    async fn wait(&self) {
        let delay = *self.poll_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Messages not yet handed out by `poll`
    pub fn pending(&self) -> usize {
        self.queued.lock().unwrap().values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl CommandSource for MockCommandSource {
    async fn identity(&self) -> FetchResult<UserId> {
        self.wait().await;
        Ok(self.self_id.clone())
    }

    async fn poll(&self, channel_id: &ChannelId) -> FetchResult<Vec<InboundMessage>> {
        self.wait().await;
        if *self.fail_poll.lock().unwrap() {
            return Err(FetchError::Request("Mock poll failure".into()));
        }
        Ok(self
            .queued
            .lock()
            .unwrap()
            .get_mut(channel_id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fuelbot_util::StructureId;

    fn snapshot(id: i64) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            type_id: ItemTypeId::new(35832),
            name: format!("Structure {id}"),
            fuel_expires: None,
            services: vec![],
        }
    }

    #[tokio::test]
    async fn mock_esi_returns_configured_data() {
        let esi = MockEsi::new()
            .with_structures(vec![snapshot(1), snapshot(2)])
            .with_history(4247, &[10.0, 12.0]);

        let ctx = esi.authenticate().await.unwrap();
        let structures = esi.list_structures(&ctx).await.unwrap();
        assert_eq!(structures.len(), 2);

        let history = esi.price_history(&ctx, ItemTypeId::new(4247)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].date < history[1].date);

        let missing = esi.price_history(&ctx, ItemTypeId::new(1)).await.unwrap();
        assert!(missing.is_empty());
        assert_eq!(esi.history_calls(), 2);
    }

    #[tokio::test]
    async fn mock_esi_failures() {
        let esi = MockEsi::new();
        esi.set_fail_auth(true);
        assert!(esi.authenticate().await.is_err());
        assert_eq!(esi.auth_calls(), 1);

        let ctx = AuthContext::new("t", 1);
        esi.set_fail_structures(true);
        assert!(esi.list_structures(&ctx).await.is_err());

        esi.set_fail_history(4051);
        assert!(matches!(
            esi.price_history(&ctx, ItemTypeId::new(4051)).await,
            Err(FetchError::Status { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn mock_sink_records_only_successful_sends() {
        let sink = MockSink::new();
        let channel = ChannelId::new("alerts");
        let ts = Utc.with_ymd_and_hms(2021, 5, 8, 0, 0, 0).unwrap();
        let msg = NotificationMessage::new("Title", 0, ts);

        sink.send(&channel, &msg).await.unwrap();
        sink.set_fail_send(true);
        assert!(sink.send(&channel, &msg).await.is_err());

        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.sent().len(), 1);
        assert_eq!(sink.sent()[0].0, channel);
    }

    #[tokio::test]
    async fn mock_command_source_drains_per_channel() {
        let source = MockCommandSource::new("bot");
        source.push("ops", "pilot", "!fuel");
        source.push("ops", "pilot", "hello");
        source.push("other", "pilot", "!fuel");

        let ops = source.poll(&ChannelId::new("ops")).await.unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].content, "!fuel");
        assert!(source.poll(&ChannelId::new("ops")).await.unwrap().is_empty());
        assert_eq!(source.pending(), 1);
        assert_eq!(source.identity().await.unwrap(), UserId::new("bot"));
    }
}

//! Inbound command dispatch
//!
//! One task polls the command channels, filters messages through
//! `parse_command` and answers status requests in order.

use fuelbot_api::{Command, InboundMessage, parse_command};
use fuelbot_provider_api::{CommandSource, FetchResult};
use fuelbot_util::{ChannelId, RateLimiter, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::StatusReporter;

/// Status requests allowed per channel per [`STATUS_RATE_LIMIT_INTERVAL`]
pub const STATUS_RATE_LIMIT_REQUESTS: u32 = 2;
pub const STATUS_RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(30);

/// Outcome of handling one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command, or written by the bot itself
    Ignored,
    /// Dropped by the per-channel rate limit
    RateLimited,
    /// Status reply delivered
    Replied,
    /// Status reply could not be delivered
    ReplyFailed,
}

/// Polls command channels and answers `!fuel` requests
pub struct CommandDispatcher {
    source: Arc<dyn CommandSource>,
    reporter: Arc<StatusReporter>,
    channels: Vec<ChannelId>,
    poll_interval: Duration,
    /// Bound on each identity lookup and channel poll
    request_timeout: Duration,
    limiter: RateLimiter,
}

impl CommandDispatcher {
    pub fn new(
        source: Arc<dyn CommandSource>,
        reporter: Arc<StatusReporter>,
        channels: Vec<ChannelId>,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            source,
            reporter,
            channels,
            poll_interval,
            request_timeout,
            limiter: RateLimiter::new(STATUS_RATE_LIMIT_REQUESTS, STATUS_RATE_LIMIT_INTERVAL),
        }
    }

    /// Handle a single message
    pub async fn dispatch(&mut self, message: &InboundMessage, self_id: &UserId) -> DispatchOutcome {
        let Some(command) = parse_command(message, self_id) else {
            return DispatchOutcome::Ignored;
        };

        match command {
            Command::FuelStatus { reply_to } => {
                if !self.limiter.check(&reply_to) {
                    debug!(channel_id = %reply_to, "Status request rate limited");
                    return DispatchOutcome::RateLimited;
                }

                info!(
                    channel_id = %reply_to,
                    author_id = %message.author_id,
                    "Status requested"
                );

                match self.reporter.reply(&reply_to, fuelbot_util::now()).await {
                    Ok(()) => DispatchOutcome::Replied,
                    Err(e) => {
                        warn!(channel_id = %reply_to, error = %e, "Failed to send status reply");
                        DispatchOutcome::ReplyFailed
                    }
                }
            }
        }
    }

    async fn identity(&self) -> FetchResult<UserId> {
        tokio::time::timeout(self.request_timeout, self.source.identity()).await?
    }

    async fn poll_channel(&self, channel: &ChannelId) -> FetchResult<Vec<InboundMessage>> {
        tokio::time::timeout(self.request_timeout, self.source.poll(channel)).await?
    }

    /// Poll every command channel once and dispatch what arrived
    pub async fn poll_once(&mut self, self_id: &UserId) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();

        for channel in self.channels.clone() {
            let messages = match self.poll_channel(&channel).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(channel_id = %channel, error = %e, "Failed to poll command channel");
                    continue;
                }
            };

            for message in &messages {
                outcomes.push(self.dispatch(message, self_id).await);
            }
        }

        outcomes
    }

    /// Dispatch commands until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut self_id: Option<UserId> = None;

        info!(channels = self.channels.len(), "Command listener started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let id = match &self_id {
                Some(id) => id.clone(),
                None => match self.identity().await {
                    Ok(id) => {
                        info!(user_id = %id, "Resolved bot identity");
                        self_id = Some(id.clone());
                        id
                    }
                    Err(e) => {
                        warn!(error = %e, "Unable to resolve bot identity");
                        continue;
                    }
                },
            };

            self.poll_once(&id).await;
            self.limiter.cleanup(STATUS_RATE_LIMIT_INTERVAL * 10);
        }

        info!("Command listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collaborators, PriceEstimator};
    use fuelbot_config::FuelRules;
    use fuelbot_provider_api::{MockCommandSource, MockEsi, MockSink};

    struct Harness {
        source: Arc<MockCommandSource>,
        sink: Arc<MockSink>,
        dispatcher: CommandDispatcher,
    }

    fn harness(channels: &[&str]) -> Harness {
        let esi = Arc::new(MockEsi::new());
        let sink = Arc::new(MockSink::new());
        let collaborators = Collaborators {
            credentials: esi.clone(),
            structures: esi.clone(),
            market: esi,
            sink: sink.clone(),
            request_timeout: Duration::from_secs(10),
        };
        let reporter = Arc::new(StatusReporter::new(
            collaborators,
            Arc::new(FuelRules::reference()),
            vec![],
            PriceEstimator::new(7, Duration::from_secs(10)),
        ));
        let source = Arc::new(MockCommandSource::new("bot"));
        let dispatcher = CommandDispatcher::new(
            source.clone(),
            reporter,
            channels.iter().map(|c| ChannelId::new(*c)).collect(),
            Duration::from_secs(5),
            Duration::from_secs(10),
        );
        Harness {
            source,
            sink,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn replies_in_originating_channel() {
        let mut h = harness(&["ops", "logi"]);
        h.source.push("logi", "pilot", "!fuel");
        h.source.push("ops", "pilot", "hello");

        let outcomes = h.dispatcher.poll_once(&UserId::new("bot")).await;
        assert_eq!(outcomes, vec![DispatchOutcome::Ignored, DispatchOutcome::Replied]);

        let sent = h.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId::new("logi"));
    }

    #[tokio::test]
    async fn own_and_inexact_messages_are_ignored() {
        let mut h = harness(&["ops"]);
        h.source.push("ops", "bot", "!fuel");
        h.source.push("ops", "pilot", "!fuel ");
        h.source.push("ops", "pilot", "!FUEL");

        let outcomes = h.dispatcher.poll_once(&UserId::new("bot")).await;
        assert!(outcomes.iter().all(|o| *o == DispatchOutcome::Ignored));
        assert_eq!(h.sink.attempts(), 0);
    }

    #[tokio::test]
    async fn requests_are_rate_limited_per_channel() {
        let mut h = harness(&["ops", "logi"]);
        for _ in 0..3 {
            h.source.push("ops", "pilot", "!fuel");
        }
        h.source.push("logi", "pilot", "!fuel");

        let outcomes = h.dispatcher.poll_once(&UserId::new("bot")).await;
        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Replied,
                DispatchOutcome::Replied,
                DispatchOutcome::RateLimited,
                DispatchOutcome::Replied,
            ]
        );
    }

    #[tokio::test]
    async fn failed_reply_is_reported() {
        let mut h = harness(&["ops"]);
        h.sink.set_fail_send(true);
        h.source.push("ops", "pilot", "!fuel");

        let outcomes = h.dispatcher.poll_once(&UserId::new("bot")).await;
        assert_eq!(outcomes, vec![DispatchOutcome::ReplyFailed]);
    }

    #[tokio::test]
    async fn poll_failure_skips_channel() {
        let mut h = harness(&["ops"]);
        h.source.push("ops", "pilot", "!fuel");
        h.source.set_fail_poll(true);

        assert!(h.dispatcher.poll_once(&UserId::new("bot")).await.is_empty());
        assert_eq!(h.source.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_answers_until_shutdown() {
        let h = harness(&["ops"]);
        h.source.push("ops", "pilot", "!fuel");
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(h.dispatcher.run(rx));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.sink.sent().len(), 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_poll_times_out() {
        let mut h = harness(&["ops", "logi"]);
        h.source.push("logi", "pilot", "!fuel");
        h.source.set_poll_delay(Some(Duration::from_secs(24 * 3600)));

        let started = tokio::time::Instant::now();
        assert!(h.dispatcher.poll_once(&UserId::new("bot")).await.is_empty());
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(20) && waited < Duration::from_secs(21));
        assert_eq!(h.source.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_does_not_block_shutdown() {
        let h = harness(&["ops"]);
        h.source.set_poll_delay(Some(Duration::from_secs(24 * 3600)));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(h.dispatcher.run(rx));
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(60), handle)
            .await
            .expect("listener stopped after shutdown")
            .unwrap();
    }
}

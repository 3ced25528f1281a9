//! Polling loop
//!
//! Each cycle authenticates, lists structures, and sends an alert for every
//! structure the deduplicator flags. Failures are logged and never end the
//! loop; only the shutdown signal does.

use chrono::{DateTime, Utc};
use fuelbot_config::FuelRules;
use fuelbot_util::ChannelId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{Collaborators, Deduplicator, alert_message, daily_fuel_cost};

/// What happened during one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Authentication failed and the cycle was skipped
    pub auth_failed: bool,
    /// Structure listing failed and was treated as empty
    pub fetch_failed: bool,
    pub structures_seen: usize,
    pub notifications_sent: usize,
    pub send_failures: usize,
}

/// The periodic low-fuel monitor. Sole owner of the notification state.
pub struct FuelMonitor {
    collaborators: Collaborators,
    rules: Arc<FuelRules>,
    dedup: Deduplicator,
    channel_id: ChannelId,
    check_interval: Duration,
}

impl FuelMonitor {
    pub fn new(
        collaborators: Collaborators,
        rules: Arc<FuelRules>,
        dedup: Deduplicator,
        channel_id: ChannelId,
        check_interval: Duration,
    ) -> Self {
        Self {
            collaborators,
            rules,
            dedup,
            channel_id,
            check_interval,
        }
    }

    pub fn deduplicator(&self) -> &Deduplicator {
        &self.dedup
    }

    /// Run one poll cycle at `now`
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        let ctx = match self.collaborators.authenticate().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Authentication failed, skipping cycle");
                report.auth_failed = true;
                return report;
            }
        };

        let structures = match self.collaborators.list_structures(&ctx).await {
            Ok(structures) => structures,
            Err(e) => {
                warn!(error = %e, "Unable to load structures");
                report.fetch_failed = true;
                Vec::new()
            }
        };
        report.structures_seen = structures.len();

        for structure in &structures {
            let fuel_per_day = daily_fuel_cost(structure, &self.rules);
            let notify = self
                .dedup
                .should_notify(structure.id, structure.fuel_expires, now);

            debug!(
                structure_id = %structure.id,
                structure_name = %structure.name,
                fuel_expires = ?structure.fuel_expires,
                fuel_per_day,
                notify,
                "Evaluated structure"
            );

            if !notify {
                continue;
            }

            let message = alert_message(structure, now);
            match self.collaborators.send(&self.channel_id, &message).await {
                Ok(()) => {
                    info!(
                        channel_id = %self.channel_id,
                        structure_id = %structure.id,
                        structure_name = %structure.name,
                        "Sent low fuel alert"
                    );
                    self.dedup.commit(structure.id, now);
                    report.notifications_sent += 1;
                }
                Err(e) => {
                    warn!(
                        structure_id = %structure.id,
                        error = %e,
                        "Failed to send low fuel alert, will retry next cycle"
                    );
                    report.send_failures += 1;
                }
            }
        }

        info!(
            structures = report.structures_seen,
            notified = report.notifications_sent,
            send_failures = report.send_failures,
            "Poll cycle complete"
        );

        report
    }

    /// Poll until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            check_interval_secs = self.check_interval.as_secs(),
            channel_id = %self.channel_id,
            "Fuel monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle(fuelbot_util::now()).await;

            if *shutdown.borrow() {
                break;
            }

            if !sleep_until_next_cycle(self.check_interval, &mut shutdown).await {
                break;
            }
        }

        info!("Fuel monitor stopped");
    }
}

/// Sleep for `interval`. Returns false as soon as shutdown is requested or
/// the sender is dropped; other wakeups keep sleeping.
async fn sleep_until_next_cycle(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryNotificationStore;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use fuelbot_api::{StructureService, StructureSnapshot};
    use fuelbot_provider_api::{MockEsi, MockSink};
    use fuelbot_util::{ItemTypeId, StructureId};

    const DAY: u64 = 86_400;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 8, 0, 0, 0).unwrap()
    }

    fn structure(id: i64, expires_in: Option<ChronoDuration>) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            type_id: ItemTypeId::new(35832),
            name: format!("Structure {id}"),
            fuel_expires: expires_in.map(|d| now() + d),
            services: vec![StructureService::new("Clone Bay", "online")],
        }
    }

    fn monitor(esi: Arc<MockEsi>, sink: Arc<MockSink>) -> FuelMonitor {
        let collaborators = Collaborators {
            credentials: esi.clone(),
            structures: esi.clone(),
            market: esi,
            sink,
            request_timeout: Duration::from_secs(10),
        };
        let dedup = Deduplicator::new(
            Box::new(InMemoryNotificationStore::new()),
            Duration::from_secs(5 * DAY),
            Duration::from_secs(12 * 3600),
        );
        FuelMonitor::new(
            collaborators,
            Arc::new(FuelRules::reference()),
            dedup,
            ChannelId::new("alerts"),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn alerts_only_structures_in_window() {
        let esi = Arc::new(MockEsi::new().with_structures(vec![
            structure(1, Some(ChronoDuration::days(3))),
            structure(2, Some(ChronoDuration::days(10))),
            structure(3, None),
        ]));
        let sink = Arc::new(MockSink::new());
        let mut m = monitor(esi, sink.clone());

        let report = m.run_cycle(now()).await;
        assert_eq!(report.structures_seen, 3);
        assert_eq!(report.notifications_sent, 1);

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId::new("alerts"));
        assert_eq!(sent[0].1.field("Where?!"), Some("`Structure 1`"));
    }

    #[tokio::test]
    async fn cooldown_suppresses_repeat_alerts() {
        let esi = Arc::new(
            MockEsi::new().with_structures(vec![structure(1, Some(ChronoDuration::days(3)))]),
        );
        let sink = Arc::new(MockSink::new());
        let mut m = monitor(esi, sink.clone());

        m.run_cycle(now()).await;
        let report = m.run_cycle(now() + ChronoDuration::hours(1)).await;
        assert_eq!(report.notifications_sent, 0);

        let report = m.run_cycle(now() + ChronoDuration::hours(13)).await;
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn failed_send_is_retried_next_cycle() {
        let esi = Arc::new(
            MockEsi::new().with_structures(vec![structure(1, Some(ChronoDuration::days(1)))]),
        );
        let sink = Arc::new(MockSink::new());
        let mut m = monitor(esi, sink.clone());

        sink.set_fail_send(true);
        let report = m.run_cycle(now()).await;
        assert_eq!(report.send_failures, 1);
        assert!(m.deduplicator().last_notified(StructureId::new(1)).is_none());

        sink.set_fail_send(false);
        let report = m.run_cycle(now() + ChronoDuration::minutes(1)).await;
        assert_eq!(report.notifications_sent, 1);
        assert_eq!(
            m.deduplicator().last_notified(StructureId::new(1)),
            Some(now() + ChronoDuration::minutes(1))
        );
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn auth_failure_skips_cycle() {
        let esi = Arc::new(
            MockEsi::new().with_structures(vec![structure(1, Some(ChronoDuration::days(1)))]),
        );
        esi.set_fail_auth(true);
        let sink = Arc::new(MockSink::new());
        let mut m = monitor(esi, sink.clone());

        let report = m.run_cycle(now()).await;
        assert!(report.auth_failed);
        assert_eq!(report.structures_seen, 0);
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_an_empty_cycle() {
        let esi = Arc::new(MockEsi::new());
        esi.set_fail_structures(true);
        let mut m = monitor(esi, Arc::new(MockSink::new()));

        let report = m.run_cycle(now()).await;
        assert!(report.fetch_failed);
        assert!(!report.auth_failed);
        assert_eq!(report.structures_seen, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let esi = Arc::new(
            MockEsi::new().with_structures(vec![structure(1, Some(ChronoDuration::days(1)))]),
        );
        esi.set_structures_delay(Some(Duration::from_secs(60)));
        let sink = Arc::new(MockSink::new());
        let mut m = monitor(esi, sink.clone());

        let report = m.run_cycle(now()).await;
        assert!(report.fetch_failed);
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_send_times_out_and_keeps_state() {
        let esi = Arc::new(
            MockEsi::new().with_structures(vec![structure(1, Some(ChronoDuration::days(1)))]),
        );
        let sink = Arc::new(MockSink::new());
        sink.set_send_delay(Some(Duration::from_secs(60)));
        let mut m = monitor(esi, sink.clone());

        let report = m.run_cycle(now()).await;
        assert_eq!(report.send_failures, 1);
        assert!(sink.sent().is_empty());
        assert!(m.deduplicator().last_notified(StructureId::new(1)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown() {
        let esi = Arc::new(MockEsi::new());
        let m = monitor(esi.clone(), Arc::new(MockSink::new()));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(m.run(rx));

        tokio::time::sleep(Duration::from_secs(3600 * 2 + 1)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        // One cycle at start and one after each full interval.
        assert_eq!(esi.auth_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn spurious_wakeup_keeps_interval() {
        let esi = Arc::new(MockEsi::new());
        let m = monitor(esi.clone(), Arc::new(MockSink::new()));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(m.run(rx));

        tokio::time::sleep(Duration::from_secs(60)).await;
        tx.send(false).unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(esi.auth_calls(), 1);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(esi.auth_calls(), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn run_stops_when_sender_dropped() {
        let m = monitor(Arc::new(MockEsi::new()), Arc::new(MockSink::new()));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(m.run(rx));
        drop(tx);
        handle.await.unwrap();
    }
}

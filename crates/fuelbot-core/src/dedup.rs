//! Notification deduplication
//!
//! Per structure there are two states: quiet, and notified at some instant.
//! Deciding whether to alert never changes state; the caller commits a
//! notification only once the message was actually delivered, so a failed
//! send is retried on the next poll.

use chrono::{DateTime, Duration, Utc};
use fuelbot_util::{StructureId, to_chrono};
use std::collections::HashMap;

/// Where the last successful notification per structure is remembered
pub trait NotificationStore: Send + Sync {
    /// When the structure was last notified about, if ever
    fn last_notified(&self, id: StructureId) -> Option<DateTime<Utc>>;

    /// Record a delivered notification
    fn record_notified(&mut self, id: StructureId, at: DateTime<Utc>);
}

/// Process-local notification store. Entries are never removed.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    notified: HashMap<StructureId, DateTime<Utc>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn last_notified(&self, id: StructureId) -> Option<DateTime<Utc>> {
        self.notified.get(&id).copied()
    }

    fn record_notified(&mut self, id: StructureId, at: DateTime<Utc>) {
        self.notified.insert(id, at);
    }
}

/// Decide whether a structure is due for a low-fuel alert.
///
/// An unfuelled structure (`fuel_expires == None`) never is. Otherwise the
/// remaining time must be within `refuel_window`, and the previous alert, if
/// any, must be strictly older than `cooldown`.
pub fn should_notify(
    fuel_expires: Option<DateTime<Utc>>,
    last_notified: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    refuel_window: Duration,
    cooldown: Duration,
) -> bool {
    let Some(expires) = fuel_expires else {
        return false;
    };

    if expires.signed_duration_since(now) > refuel_window {
        return false;
    }

    match last_notified {
        None => true,
        Some(at) => now.signed_duration_since(at) > cooldown,
    }
}

/// Owns the notification store and applies the alert timing
pub struct Deduplicator {
    store: Box<dyn NotificationStore>,
    refuel_window: Duration,
    cooldown: Duration,
}

impl Deduplicator {
    pub fn new(
        store: Box<dyn NotificationStore>,
        refuel_window: std::time::Duration,
        cooldown: std::time::Duration,
    ) -> Self {
        Self {
            store,
            refuel_window: to_chrono(refuel_window),
            cooldown: to_chrono(cooldown),
        }
    }

    /// Whether an alert should go out now. Does not change state.
    pub fn should_notify(
        &self,
        id: StructureId,
        fuel_expires: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        should_notify(
            fuel_expires,
            self.store.last_notified(id),
            now,
            self.refuel_window,
            self.cooldown,
        )
    }

    /// Record a delivered alert
    pub fn commit(&mut self, id: StructureId, now: DateTime<Utc>) {
        self.store.record_notified(id, now);
    }

    pub fn last_notified(&self, id: StructureId) -> Option<DateTime<Utc>> {
        self.store.last_notified(id)
    }
}

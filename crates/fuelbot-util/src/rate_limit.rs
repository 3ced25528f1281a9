//! Rate limiting utilities

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::ChannelId;

/// Simple token-bucket rate limiter, one bucket per chat channel
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens (requests) per bucket
    max_tokens: u32,
    /// How often tokens are replenished
    refill_interval: Duration,
    /// Per-channel state
    channels: HashMap<ChannelId, ChannelBucket>,
}

#[derive(Debug)]
struct ChannelBucket {
    tokens: u32,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_requests` - Maximum requests allowed per interval
    /// * `interval` - Time interval for the limit
    pub fn new(max_requests: u32, interval: Duration) -> Self {
        Self {
            max_tokens: max_requests,
            refill_interval: interval,
            channels: HashMap::new(),
        }
    }

    /// Check if a request should be allowed for the given channel
    ///
    /// Returns `true` if allowed, `false` if rate limited
    pub fn check(&mut self, channel_id: &ChannelId) -> bool {
        self.check_at(channel_id, Instant::now())
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading
    pub fn check_at(&mut self, channel_id: &ChannelId, now: Instant) -> bool {
        let bucket = self
            .channels
            .entry(channel_id.clone())
            .or_insert(ChannelBucket {
                tokens: self.max_tokens,
                last_refill: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if elapsed >= self.refill_interval && !self.refill_interval.is_zero() {
            let intervals = (elapsed.as_millis() / self.refill_interval.as_millis()) as u32;
            bucket.tokens = bucket
                .tokens
                .saturating_add(intervals.saturating_mul(self.max_tokens))
                .min(self.max_tokens);
            bucket.last_refill = now;
        }

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Clean up stale channel entries
    pub fn cleanup(&mut self, stale_after: Duration) {
        let now = Instant::now();
        self.channels
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < stale_after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_within_limit() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(30));
        let channel = ChannelId::new("ops");

        assert!(limiter.check(&channel));
        assert!(limiter.check(&channel));

        // 3rd request should be denied
        assert!(!limiter.check(&channel));
    }

    #[test]
    fn test_rate_limiter_different_channels() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(30));
        let ops = ChannelId::new("ops");
        let logistics = ChannelId::new("logistics");

        assert!(limiter.check(&ops));
        assert!(!limiter.check(&ops));

        // Second channel has its own bucket
        assert!(limiter.check(&logistics));
    }

    #[test]
    fn test_rate_limiter_refills_after_interval() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(30));
        let channel = ChannelId::new("ops");
        let start = Instant::now();

        assert!(limiter.check_at(&channel, start));
        assert!(!limiter.check_at(&channel, start + Duration::from_secs(10)));
        assert!(limiter.check_at(&channel, start + Duration::from_secs(31)));
    }
}

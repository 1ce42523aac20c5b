use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::RateLimitConfig;

/// Map size above which refilled buckets are dropped.
const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket per caller key.
pub struct RateLimiter {
    cfg: RateLimitConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimitConfig) -> Self {
        Self {
            cfg,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut lock = self.buckets.lock().await;
        if lock.len() >= PRUNE_THRESHOLD {
            self.prune(&mut lock, now);
        }
        let bucket = lock.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.cfg.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * self.cfg.refill_per_sec).min(self.cfg.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops buckets that would be full by `now`; a fresh bucket is identical.
    fn prune(&self, buckets: &mut HashMap<String, Bucket>, now: Instant) {
        let before = buckets.len();
        buckets.retain(|_, b| {
            let elapsed = now.duration_since(b.last_refill).as_secs_f64();
            b.tokens + elapsed * self.cfg.refill_per_sec < self.cfg.capacity
        });
        debug!(before, after = buckets.len(), "rate limit buckets pruned");
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.buckets.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bucket_drains_then_refuses() {
        let limiter = RateLimiter::new(RateLimitConfig {
            capacity: 2.0,
            refill_per_sec: 0.0,
        });
        assert!(limiter.allow("bookings:alice").await);
        assert!(limiter.allow("bookings:alice").await);
        assert!(!limiter.allow("bookings:alice").await);
        // other keys keep their own budget
        assert!(limiter.allow("bookings:bob").await);
    }

    #[tokio::test]
    async fn bucket_refills_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig {
            capacity: 1.0,
            refill_per_sec: 1000.0,
        });
        assert!(limiter.allow("k").await);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(limiter.allow("k").await);
    }

    #[tokio::test]
    async fn refilled_buckets_are_pruned() {
        let limiter = RateLimiter::new(RateLimitConfig {
            capacity: 1.0,
            refill_per_sec: 1_000_000.0,
        });
        for i in 0..PRUNE_THRESHOLD {
            assert!(limiter.allow(&format!("login:user{i}@reef.io")).await);
        }
        assert_eq!(limiter.tracked_keys().await, PRUNE_THRESHOLD);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert!(limiter.allow("login:late@reef.io").await);
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn drained_buckets_survive_pruning() {
        let limiter = RateLimiter::new(RateLimitConfig {
            capacity: 1.0,
            refill_per_sec: 0.0,
        });
        assert!(limiter.allow("register:spam@reef.io").await);
        for i in 0..PRUNE_THRESHOLD {
            limiter.allow(&format!("k{i}")).await;
        }
        assert!(!limiter.allow("register:spam@reef.io").await);
    }
}

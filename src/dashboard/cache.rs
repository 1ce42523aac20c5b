use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::dto::DashboardResponse;

#[derive(Clone)]
struct Entry {
    body: DashboardResponse,
    created_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<Uuid, Entry>,
    /// Bumped on every invalidation of a host.
    generations: HashMap<Uuid, u64>,
}

/// Per-host memo of the last dashboard computation.
///
/// Callers read [`DashboardCache::generation`] before loading rows and hand it
/// back to [`DashboardCache::insert`]; a result computed across an
/// invalidation is discarded.
pub struct DashboardCache {
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl DashboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn get(&self, host_id: Uuid) -> Option<DashboardResponse> {
        let mut inner = self.inner.lock().await;
        inner
            .entries
            .retain(|_, v| v.created_at.elapsed() <= self.ttl);
        inner.entries.get(&host_id).map(|e| e.body.clone())
    }

    pub async fn generation(&self, host_id: Uuid) -> u64 {
        let inner = self.inner.lock().await;
        inner.generations.get(&host_id).copied().unwrap_or(0)
    }

    /// Stores `body` unless the host was invalidated since `generation` was read.
    pub async fn insert(&self, host_id: Uuid, generation: u64, body: DashboardResponse) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let mut inner = self.inner.lock().await;
        if inner.generations.get(&host_id).copied().unwrap_or(0) != generation {
            return false;
        }
        inner.entries.insert(
            host_id,
            Entry {
                body,
                created_at: Instant::now(),
            },
        );
        true
    }

    pub async fn invalidate(&self, host_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.entries.remove(&host_id);
        *inner.generations.entry(host_id).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::dto::DashboardStats;

    fn response(revenue: f64) -> DashboardResponse {
        DashboardResponse {
            stats: DashboardStats {
                total_revenue: revenue,
                active_bookings: 0,
                total_bookings: 0,
                total_experiences: 0,
                active_experiences: 0,
                average_rating: 0.0,
                review_count: 0,
            },
            upcoming_bookings: vec![],
            recent_bookings: vec![],
        }
    }

    #[tokio::test]
    async fn hit_then_invalidate() {
        let cache = DashboardCache::new(Duration::from_secs(60));
        let host = Uuid::new_v4();
        assert!(cache.insert(host, 0, response(85.0)).await);
        assert_eq!(cache.get(host).await.unwrap().stats.total_revenue, 85.0);
        assert!(cache.get(Uuid::new_v4()).await.is_none());

        cache.invalidate(host).await;
        assert!(cache.get(host).await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_disables_memo() {
        let cache = DashboardCache::new(Duration::ZERO);
        let host = Uuid::new_v4();
        assert!(!cache.insert(host, 0, response(1.0)).await);
        assert!(cache.get(host).await.is_none());
    }

    #[tokio::test]
    async fn result_computed_across_invalidation_is_dropped() {
        let cache = DashboardCache::new(Duration::from_secs(60));
        let host = Uuid::new_v4();

        let seen = cache.generation(host).await;
        // a booking write lands while the stale figures are being computed
        cache.invalidate(host).await;
        assert!(!cache.insert(host, seen, response(0.0)).await);
        assert!(cache.get(host).await.is_none());

        let fresh = cache.generation(host).await;
        assert!(cache.insert(host, fresh, response(153.0)).await);
        assert_eq!(cache.get(host).await.unwrap().stats.total_revenue, 153.0);
    }
}

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AppConfig, JwtConfig, RateLimitConfig, StoreBackend};
use crate::dashboard::cache::DashboardCache;
use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::store::{MemoryStore, PgStore, Store};

/// Views that show booking data and must be refreshed after a booking write.
pub const BOOKING_VIEWS: &[&str] = &[
    "/dashboard",
    "/bookings",
    "/business/bookings",
    "/business/dashboard",
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub limiter: Arc<RateLimiter>,
    pub dashboards: Arc<DashboardCache>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.store {
            StoreBackend::Postgres {
                url,
                max_connections,
            } => {
                let pg = PgStore::connect(url, *max_connections).await?;
                if let Err(e) = sqlx::migrate!("./migrations").run(pg.pool()).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg) as Arc<dyn Store>
            }
            StoreBackend::Memory => {
                warn!("running with the in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };

        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        let dashboards = Arc::new(DashboardCache::new(Duration::from_secs(
            config.dashboard_cache_ttl_secs,
        )));
        Self {
            config,
            store,
            limiter,
            dashboards,
        }
    }

    /// In-memory state with a fixed JWT config.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            rate_limit: RateLimitConfig {
                capacity: 50.0,
                refill_per_sec: 1.0,
            },
            dashboard_cache_ttl_secs: 30,
        });
        Self::from_parts(config, Arc::new(MemoryStore::new()))
    }

    pub async fn throttle(&self, key: &str) -> Result<(), ApiError> {
        if self.limiter.allow(key).await {
            Ok(())
        } else {
            warn!(key, "rate limited");
            Err(ApiError::TooManyRequests)
        }
    }

    /// Drops memoised views that include this host's bookings.
    pub async fn invalidate_booking_views(&self, host_id: Uuid) {
        self.dashboards.invalidate(host_id).await;
        debug!(%host_id, paths = ?BOOKING_VIEWS, "views invalidated");
    }
}

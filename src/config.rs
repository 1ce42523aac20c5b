use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

/// Which store backs the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StoreBackend {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub dashboard_cache_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Err(_) => StoreBackend::Postgres {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            },
            Ok(other) => anyhow::bail!("unknown STORE backend: {other}"),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is required")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wavebook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wavebook-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let rate_limit = RateLimitConfig {
            capacity: env_parse("RATE_LIMIT_CAPACITY").unwrap_or(20.0),
            refill_per_sec: env_parse("RATE_LIMIT_REFILL_PER_SEC").unwrap_or(0.5),
        };
        Ok(Self {
            store,
            jwt,
            rate_limit,
            dashboard_cache_ttl_secs: env_parse("DASHBOARD_CACHE_TTL_SECS").unwrap_or(30),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_ignores_garbage() {
        std::env::set_var("WAVEBOOK_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse::<u64>("WAVEBOOK_TEST_GARBAGE"), None);
        std::env::set_var("WAVEBOOK_TEST_NUMBER", "42");
        assert_eq!(env_parse::<u64>("WAVEBOOK_TEST_NUMBER"), Some(42));
        assert_eq!(env_parse::<u64>("WAVEBOOK_TEST_MISSING"), None);
    }
}

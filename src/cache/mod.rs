//! Throttle cache adapter (C16): an at-most-once gate keyed by string,
//! grounded in `tasks.py`'s `get_from_redis`/`set_in_redis` (GET/SETEX with
//! a 30-day default TTL). The concrete adapter here is an in-process `moka`
//! TTL cache rather than a network round trip to Redis — a deliberate
//! divergence recorded in DESIGN.md, acceptable because this indexer is
//! single-process and the gate never needs to be shared across instances.

use std::time::Duration;

use moka::future::Cache;

use crate::config::CacheSettings;

pub struct ThrottleCache {
    cache: Cache<String, String>,
    default_ttl: Duration,
}

impl ThrottleCache {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(settings.default_ttl_secs))
                .build(),
            default_ttl: Duration::from_secs(settings.default_ttl_secs),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string()).await;
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_value() {
        let cache = ThrottleCache::new(&CacheSettings {
            url: String::new(),
            default_ttl_secs: 60,
        });
        assert_eq!(cache.get("k").await, None);
        cache.set("k", "42").await;
        assert_eq!(cache.get("k").await, Some("42".to_string()));
    }
}

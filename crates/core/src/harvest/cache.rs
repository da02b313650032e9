use crate::domain::observation::RawPriceRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Short TTL for interactive force-refresh runs.
pub const INTERACTIVE_TTL: Duration = Duration::from_secs(15 * 60);
/// Long TTL for background batch harvesting.
pub const BATCH_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Injectable clock so TTL expiry is deterministic under test instead of
/// depending on wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Normalized lookup key: lowercased, whitespace-collapsed query term plus
/// category, so "Acme  Fasteners" and "acme fasteners" share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(query: &str, category: &str) -> Self {
        let normalize = |s: &str| -> String {
            s.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        };
        Self(format!("{}|{}", normalize(query), normalize(category)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Vec<RawPriceRecord>,
    fetched_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.fetched_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            // Clock moved backwards; treat the entry as stale.
            Err(_) => false,
        }
    }
}

/// Per-query price cache with time-based expiry only: an entry goes stale and
/// is overwritten on the next miss, never explicitly evicted.
///
/// Concurrent callers on the same uncached key collapse into a single fetch:
/// each key has its own async lock held across the fetch, so the second
/// caller finds the fresh entry instead of re-fetching. Fetch errors are
/// never cached.
pub struct PriceCache {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CacheKey, Arc<Mutex<Option<CacheEntry>>>>>,
}

impl PriceCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<Vec<RawPriceRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RawPriceRecord>>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key).or_default())
        };

        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(self.clock.now()) {
                return Ok(cached.payload.clone());
            }
        }

        let payload = fetch().await?;
        *entry = Some(CacheEntry {
            payload: payload.clone(),
            fetched_at: self.clock.now(),
            ttl,
        });
        Ok(payload)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Manually advanced clock for deterministic TTL tests.
    pub struct ManualClock {
        now: StdMutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn starting_at(now: DateTime<Utc>) -> Self {
            Self {
                now: StdMutex::new(now),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut guard = self.now.lock().unwrap();
            *guard += chrono::Duration::from_std(by).expect("advance overflow");
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

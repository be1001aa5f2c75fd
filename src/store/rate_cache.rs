use super::entry::CacheState;
use crate::core::rate::{AcquisitionResult, RateSource};
use chrono::{DateTime, Duration, FixedOffset};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Serves the last good acquisition and decides when to ask upstream again.
///
/// The state lock is held for the whole check-fetch-store sequence, so
/// concurrent callers that find the cache stale wait for the one acquisition
/// in flight instead of starting their own.
pub struct RateCache {
    source: Box<dyn RateSource>,
    state: Mutex<CacheState>,
    fallback_retry_interval: Duration,
}

impl RateCache {
    pub fn new(source: Box<dyn RateSource>, fallback_retry_interval: Duration) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::Empty),
            fallback_retry_interval,
        }
    }

    pub async fn get(&self, now: DateTime<FixedOffset>) -> AcquisitionResult {
        let mut state = self.state.lock().await;
        if let Some(cached) = state.valid_result(now, self.fallback_retry_interval) {
            debug!(month = ?state.month(), fallback = state.is_fallback(), "Cache HIT");
            return cached.clone();
        }

        info!("Cache expired or empty, fetching fresh data...");
        let result = self.source.acquire(now).await;

        if let Some(next) = CacheState::from_result(&result, now) {
            if next.is_fallback() {
                info!(
                    retry_in_seconds = self.fallback_retry_interval.num_seconds(),
                    "Caching previous month data until retry"
                );
            } else {
                info!(rate = ?result.data.as_ref().and_then(|d| d.rate_kwh), "Caching current month rate");
            }
            *state = next;
            return result;
        }

        warn!(error = ?result.error, "Failed to fetch rates");
        match state.stale_result() {
            Some(stale) => {
                info!(month = ?state.month(), "Returning stale cached data");
                stale
            }
            None => result,
        }
    }

    /// Current cache state.
    pub async fn snapshot(&self) -> CacheState {
        self.state.lock().await.clone()
    }
}

use crate::core::rate::{AcquisitionResult, YearMonth};
use chrono::{DateTime, Duration, FixedOffset};

pub const STALE_WARNING: &str = "Current rates temporarily unavailable. Using cached values.";

/// The single cached acquisition.
///
/// Only successful results are ever stored. `month` is the calendar month the
/// cached figures belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CacheState {
    #[default]
    Empty,
    /// Current-month data, valid until the calendar month changes.
    Fresh {
        result: AcquisitionResult,
        month: YearMonth,
    },
    /// Previous-month data, rechecked once `fetched_at` is older than the
    /// retry interval.
    Fallback {
        result: AcquisitionResult,
        month: YearMonth,
        fetched_at: DateTime<FixedOffset>,
    },
}

impl CacheState {
    /// State after a successful acquisition, `None` for a failed one.
    pub fn from_result(result: &AcquisitionResult, now: DateTime<FixedOffset>) -> Option<Self> {
        if !result.success {
            return None;
        }
        let month = result.target_month;
        let result = result.clone();
        Some(if result.warning.is_some() {
            CacheState::Fallback {
                result,
                month,
                fetched_at: now,
            }
        } else {
            CacheState::Fresh { result, month }
        })
    }

    /// The cached result if it may still be served without asking upstream.
    pub fn valid_result(
        &self,
        now: DateTime<FixedOffset>,
        retry_interval: Duration,
    ) -> Option<&AcquisitionResult> {
        match self {
            CacheState::Empty => None,
            CacheState::Fresh { result, month } => {
                (*month == YearMonth::of(&now)).then_some(result)
            }
            CacheState::Fallback {
                result, fetched_at, ..
            } => (now - *fetched_at < retry_interval).then_some(result),
        }
    }

    /// The cached result shaped for serving after a failed refetch.
    pub fn stale_result(&self) -> Option<AcquisitionResult> {
        let result = self.result()?;
        let mut stale = result.clone();
        if stale.warning.is_none() {
            stale.warning = Some(STALE_WARNING.to_string());
        }
        Some(stale)
    }

    pub fn result(&self) -> Option<&AcquisitionResult> {
        match self {
            CacheState::Empty => None,
            CacheState::Fresh { result, .. } | CacheState::Fallback { result, .. } => Some(result),
        }
    }

    pub fn month(&self) -> Option<YearMonth> {
        match self {
            CacheState::Empty => None,
            CacheState::Fresh { month, .. } | CacheState::Fallback { month, .. } => Some(*month),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CacheState::Fallback { .. })
    }
}

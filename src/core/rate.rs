//! Rate announcement abstractions and core types

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Month};
use serde::{Serialize, Serializer};
use std::fmt::Display;

pub const RATE_UNIT: &str = "PHP/kWh";

/// Direction of the announced rate movement, as encoded in the candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Slug used by the announcement URLs (`lower-rates-…`, `higher-rates-…`).
    pub fn slug(&self) -> &'static str {
        match self {
            Trend::Up => "higher",
            Trend::Down => "lower",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Up => "up",
                Trend::Down => "down",
            }
        )
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// English month name, e.g. `June`.
    pub fn name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("Unknown", |m| m.name())
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Figures parsed from one announcement page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_charge: Option<f64>,
    pub rate_unit: &'static str,
    pub trend: Trend,
    pub raw_text: String,
}

impl RateReading {
    /// A reading carries information when it found the rate or at least some page text.
    pub fn is_informative(&self) -> bool {
        self.rate_kwh.is_some() || !self.raw_text.is_empty()
    }
}

/// Outcome of one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RateReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub target_month: YearMonth,
    pub timestamp: DateTime<FixedOffset>,
}

impl AcquisitionResult {
    pub fn resolved(
        url: String,
        data: RateReading,
        target_month: YearMonth,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            success: true,
            url: Some(url),
            data: Some(data),
            warning: None,
            error: None,
            target_month,
            timestamp,
        }
    }

    pub fn failed(
        error: impl Into<String>,
        target_month: YearMonth,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            success: false,
            url: None,
            data: None,
            warning: None,
            error: Some(error.into()),
            target_month,
            timestamp,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Produces the current rate announcement, falling back as it sees fit.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn acquire(&self, now: DateTime<FixedOffset>) -> AcquisitionResult;
}

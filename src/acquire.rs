use crate::core::page::PageFetcher;
use crate::core::rate::{AcquisitionResult, RateSource, YearMonth};
use crate::resolver::MonthResolver;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

/// Looks for the current month's announcement and falls back to the previous
/// month's while the current one is not yet published.
pub struct RateAcquirer<F: PageFetcher> {
    resolver: MonthResolver<F>,
}

impl<F: PageFetcher> RateAcquirer<F> {
    pub fn new(resolver: MonthResolver<F>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<F: PageFetcher> RateSource for RateAcquirer<F> {
    async fn acquire(&self, now: DateTime<FixedOffset>) -> AcquisitionResult {
        let current = YearMonth::of(&now);
        info!("Attempting to fetch rates for {}", current);
        let result = self.resolver.resolve_month(current, now).await;
        if result.success {
            return result;
        }

        let previous = current.previous();
        warn!("{} rates not found, trying {}", current, previous);
        let result = self.resolver.resolve_month(previous, now).await;
        if result.success {
            return result.with_warning(format!(
                "{current} rates not yet available. Using {previous} rates instead."
            ));
        }

        result.with_error("No rate information for current or previous month")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::Trend;
    use crate::resolver::UrlTemplate;
    use crate::resolver::tests::{MockFetcher, page};
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(year, month, day, 9, 30, 0)
            .unwrap()
    }

    fn acquirer(pages: &[(&str, &str)]) -> RateAcquirer<MockFetcher> {
        RateAcquirer::new(MonthResolver::new(
            MockFetcher::new(pages),
            UrlTemplate::new("https://example.com", "{direction}-rates-{month}-{year}"),
            "page not found",
        ))
    }

    #[tokio::test]
    async fn test_current_month() {
        let june = page("the overall rate for a typical household to P13.1145 per kWh");
        let may = page("the overall rate for a typical household to P13.4702 per kWh");
        let acquirer = acquirer(&[
            ("https://example.com/lower-rates-june-2026", june.as_str()),
            ("https://example.com/lower-rates-may-2026", may.as_str()),
        ]);

        let result = acquirer.acquire(at(2026, 6, 15)).await;
        assert!(result.success);
        assert!(result.warning.is_none());
        assert_eq!(result.target_month, YearMonth::new(2026, 6));
        assert_eq!(result.data.unwrap().rate_kwh, Some(13.1145));
    }

    #[tokio::test]
    async fn test_previous_month_fallback() {
        let may = page("an increase of P0.10 per kWh");
        let acquirer = acquirer(&[("https://example.com/higher-rates-may-2026", may.as_str())]);

        let result = acquirer.acquire(at(2026, 6, 2)).await;
        assert!(result.success);
        assert_eq!(
            result.warning.as_deref(),
            Some("June 2026 rates not yet available. Using May 2026 rates instead.")
        );
        assert!(result.error.is_none());
        assert_eq!(result.target_month, YearMonth::new(2026, 5));
        assert_eq!(result.data.unwrap().trend, Trend::Up);
    }

    #[tokio::test]
    async fn test_january_falls_back_to_previous_december() {
        let december = page("a reduction of P0.20 per kWh");
        let acquirer = acquirer(&[("https://example.com/lower-rates-december-2025", december.as_str())]);

        let result = acquirer.acquire(at(2026, 1, 3)).await;
        assert!(result.success);
        assert_eq!(result.target_month, YearMonth::new(2025, 12));
        assert_eq!(
            result.warning.as_deref(),
            Some("January 2026 rates not yet available. Using December 2025 rates instead.")
        );
    }

    #[tokio::test]
    async fn test_both_months_fail() {
        let acquirer = acquirer(&[]);

        let result = acquirer.acquire(at(2026, 6, 15)).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.warning.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("No rate information for current or previous month")
        );
    }
}

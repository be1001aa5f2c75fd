//! Finds the announcement for one calendar month.

use crate::core::config::SourceConfig;
use crate::core::page::PageFetcher;
use crate::core::rate::{AcquisitionResult, RateReading, Trend, YearMonth};
use crate::extract::extract_page;
use chrono::{DateTime, FixedOffset};
use futures::future::join;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Acceptance order for candidates. Decreases are announced more often, and
/// the two pages should never both exist.
const CANDIDATE_ORDER: [Trend; 2] = [Trend::Down, Trend::Up];

/// Why a candidate page was skipped.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("{url} is unreachable: {reason:#}")]
    Unreachable { url: String, reason: anyhow::Error },
    #[error("{url} reports page not found")]
    NotFound { url: String },
    #[error("{url} has no rate information")]
    NoMatch { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub trend: Trend,
    pub url: String,
}

/// Builds candidate URLs from a path template below a base URL.
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    base_url: String,
    template: String,
}

impl UrlTemplate {
    pub fn new(base_url: &str, template: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            template: template.trim_start_matches('/').to_string(),
        }
    }

    pub fn url(&self, month: YearMonth, trend: Trend) -> String {
        let path = self
            .template
            .replace("{direction}", trend.slug())
            .replace("{month}", &month.name().to_lowercase())
            .replace("{year}", &month.year.to_string());
        format!("{}/{}", self.base_url, path)
    }

    /// Candidates in acceptance order.
    pub fn candidates(&self, month: YearMonth) -> Vec<Candidate> {
        CANDIDATE_ORDER
            .iter()
            .map(|&trend| Candidate {
                trend,
                url: self.url(month, trend),
            })
            .collect()
    }
}

pub struct MonthResolver<F: PageFetcher> {
    fetcher: F,
    template: UrlTemplate,
    not_found_marker: String,
}

impl<F: PageFetcher> MonthResolver<F> {
    pub fn new(fetcher: F, template: UrlTemplate, not_found_marker: &str) -> Self {
        Self {
            fetcher,
            template,
            not_found_marker: not_found_marker.to_lowercase(),
        }
    }

    pub fn from_config(fetcher: F, config: &SourceConfig) -> Self {
        Self::new(
            fetcher,
            UrlTemplate::new(&config.base_url, &config.url_template),
            &config.not_found_marker,
        )
    }

    /// Fetches and reads one candidate.
    async fn try_candidate(&self, candidate: &Candidate) -> Result<RateReading, CandidateError> {
        let html = self
            .fetcher
            .fetch_page(&candidate.url)
            .await
            .map_err(|reason| CandidateError::Unreachable {
                url: candidate.url.clone(),
                reason,
            })?;

        if !self.not_found_marker.is_empty()
            && html.to_lowercase().contains(&self.not_found_marker)
        {
            return Err(CandidateError::NotFound {
                url: candidate.url.clone(),
            });
        }

        let mut reading = extract_page(&html);
        if !reading.is_informative() {
            return Err(CandidateError::NoMatch {
                url: candidate.url.clone(),
            });
        }
        reading.trend = candidate.trend;
        Ok(reading)
    }

    #[instrument(skip(self, target, now), fields(month = %target))]
    pub async fn resolve_month(
        &self,
        target: YearMonth,
        now: DateTime<FixedOffset>,
    ) -> AcquisitionResult {
        let candidates = self.template.candidates(target);
        let (down, up) = (&candidates[0], &candidates[1]);

        debug!(down = %down.url, up = %up.url, "Fetching candidates");
        let (down_outcome, up_outcome) =
            join(self.try_candidate(down), self.try_candidate(up)).await;

        for (candidate, outcome) in [(down, down_outcome), (up, up_outcome)] {
            match outcome {
                Ok(reading) => {
                    info!(url = %candidate.url, trend = %candidate.trend, rate = ?reading.rate_kwh, "Found rate announcement");
                    return AcquisitionResult::resolved(candidate.url.clone(), reading, target, now);
                }
                Err(e) => debug!(error = %e, "Skipping candidate"),
            }
        }

        warn!("No candidate page for {}", target);
        AcquisitionResult::failed(format!("No rate information for {target}"), target, now)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://example.com/news";

    pub(crate) struct MockFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub(crate) fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("timed out"))
        }
    }

    pub(crate) fn page(body: &str) -> String {
        format!("<html><body><main id=\"main-content\">{body}</main></body></html>")
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 6, 15, 12, 0, 0)
            .unwrap()
    }

    fn resolver(pages: &[(&str, &str)]) -> MonthResolver<MockFetcher> {
        MonthResolver::new(
            MockFetcher::new(pages),
            UrlTemplate::new(BASE, "{direction}-rates-{month}"),
            "Page Not Found",
        )
    }

    #[test]
    fn test_candidate_urls() {
        let template = UrlTemplate::new("https://example.com/news/", "{direction}-rates-{month}");
        let candidates = template.candidates(YearMonth::new(2026, 6));
        assert_eq!(
            candidates,
            vec![
                Candidate {
                    trend: Trend::Down,
                    url: "https://example.com/news/lower-rates-june".to_string()
                },
                Candidate {
                    trend: Trend::Up,
                    url: "https://example.com/news/higher-rates-june".to_string()
                },
            ]
        );

        let with_year = UrlTemplate::new(BASE, "{direction}-rates-{month}-{year}");
        assert_eq!(
            with_year.url(YearMonth::new(2025, 12), Trend::Up),
            "https://example.com/news/higher-rates-december-2025"
        );
    }

    #[tokio::test]
    async fn test_resolves_up_page() {
        let html = page("an increase of P0.20 per kWh, the overall rate for a typical household to P12.20 per kWh");
        let resolver = resolver(&[("https://example.com/news/higher-rates-june", html.as_str())]);

        let result = resolver.resolve_month(YearMonth::new(2026, 6), now()).await;
        assert!(result.success);
        assert_eq!(result.url.as_deref(), Some("https://example.com/news/higher-rates-june"));
        let data = result.data.unwrap();
        assert_eq!(data.trend, Trend::Up);
        assert_eq!(data.rate_kwh, Some(12.20));
        assert_eq!(data.rate_change, Some(0.20));
        assert!(result.error.is_none());
        assert_eq!(resolver.fetcher.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_prefers_down_when_both_resolve() {
        let down = page("the overall rate for a typical household to P11.00 per kWh");
        let up = page("the overall rate for a typical household to P12.00 per kWh");
        let resolver = resolver(&[
            ("https://example.com/news/higher-rates-june", up.as_str()),
            ("https://example.com/news/lower-rates-june", down.as_str()),
        ]);

        let result = resolver.resolve_month(YearMonth::new(2026, 6), now()).await;
        let data = result.data.unwrap();
        assert_eq!(data.trend, Trend::Down);
        assert_eq!(data.rate_kwh, Some(11.0));
    }

    #[tokio::test]
    async fn test_skips_not_found_page() {
        let missing = page("<h1>PAGE NOT FOUND</h1>");
        let up = page("Advisory without figures");
        let resolver = resolver(&[
            ("https://example.com/news/lower-rates-june", missing.as_str()),
            ("https://example.com/news/higher-rates-june", up.as_str()),
        ]);

        let result = resolver.resolve_month(YearMonth::new(2026, 6), now()).await;
        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data.trend, Trend::Up);
        assert_eq!(data.rate_kwh, None);
        assert_eq!(data.raw_text, "Advisory without figures");
    }

    #[tokio::test]
    async fn test_skips_page_without_container() {
        let empty = "<html><body><p>nothing</p></body></html>";
        let resolver = resolver(&[("https://example.com/news/lower-rates-june", empty)]);

        let result = resolver.resolve_month(YearMonth::new(2026, 6), now()).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_month_exhausted() {
        let resolver = resolver(&[]);

        let result = resolver.resolve_month(YearMonth::new(2026, 6), now()).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.url.is_none());
        assert_eq!(result.error.as_deref(), Some("No rate information for June 2026"));
        assert_eq!(result.target_month, YearMonth::new(2026, 6));
        assert_eq!(result.timestamp, now());
    }
}

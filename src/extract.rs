//! Rate figures from announcement prose.
//!
//! Every figure has its own matcher that runs over the same normalised body
//! text and yields an optional value. Matchers never fail: text that does not
//! mention a figure simply leaves it absent.

use crate::core::rate::{RATE_UNIT, RateReading, Trend};
use crate::providers::html::body_text;
use regex::Regex;
use std::sync::LazyLock;

const RAW_TEXT_CHARS: usize = 1000;

static OVERALL_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)overall\s+rate\s+for\s+a\s+typical\s+household\s+to\s+[P₱]\s*(\d+\.?\d*)\s*per\s*kWh",
    )
    .expect("overall rate pattern is valid")
});

static RATE_CHANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(increase|decrease|reduction|upward\s+adjustment)\s+(?:of\s+)?[P₱]\s*(\d+\.?\d*)\s*per\s*kWh",
    )
    .expect("rate change pattern is valid")
});

static GENERATION_CHARGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)generation\s+charge[:\s]+[P₱]\s*(\d+\.?\d*)")
        .expect("generation charge pattern is valid")
});

static TRANSMISSION_CHARGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)transmission\s+charge[:\s]+[P₱]\s*(\d+\.?\d*)")
        .expect("transmission charge pattern is valid")
});

/// Parses the first capture group of the first match as a number.
fn first_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Overall per-kWh rate for a typical household.
pub fn match_rate(text: &str) -> Option<f64> {
    first_number(&OVERALL_RATE, text)
}

/// Signed change versus the previous rate; decreases are negative.
pub fn match_rate_change(text: &str) -> Option<f64> {
    let caps = RATE_CHANGE.captures(text)?;
    let amount: f64 = caps.get(2)?.as_str().parse().ok()?;
    let direction = caps.get(1)?.as_str().to_lowercase();
    match direction.as_str() {
        "decrease" | "reduction" => Some(-amount),
        _ => Some(amount),
    }
}

pub fn match_generation_charge(text: &str) -> Option<f64> {
    first_number(&GENERATION_CHARGE, text)
}

pub fn match_transmission_charge(text: &str) -> Option<f64> {
    first_number(&TRANSMISSION_CHARGE, text)
}

/// Change relative to the previous rate, in percent, rounded to two decimals.
///
/// Absent when the previous rate (`rate - change`) is zero.
pub fn change_percent(rate: f64, change: f64) -> Option<f64> {
    let previous = rate - change;
    if previous == 0.0 {
        return None;
    }
    Some(round2(change / previous * 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Extracts every figure from already-extracted body text.
///
/// `trend` starts as [`Trend::Down`]; the resolver overwrites it with the
/// direction of the candidate the text came from.
pub fn extract(text: &str) -> RateReading {
    let rate_kwh = match_rate(text);
    let rate_change = match_rate_change(text);
    let rate_change_percent = match (rate_kwh, rate_change) {
        (Some(rate), Some(change)) => change_percent(rate, change),
        _ => None,
    };

    RateReading {
        rate_kwh,
        rate_change,
        rate_change_percent,
        generation_charge: match_generation_charge(text),
        transmission_charge: match_transmission_charge(text),
        rate_unit: RATE_UNIT,
        trend: Trend::Down,
        raw_text: text.chars().take(RAW_TEXT_CHARS).collect(),
    }
}

/// Extracts every figure from a full HTML page. A page without a content
/// container yields an empty, non-informative reading.
pub fn extract_page(html: &str) -> RateReading {
    let text = body_text(html).unwrap_or_default();
    extract(&text)
}

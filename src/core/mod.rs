//! Core business logic abstractions

pub mod clock;
pub mod config;
pub mod log;
pub mod page;
pub mod rate;

// Re-export main types for cleaner imports
pub use clock::{Clock, FixedClock, SystemClock};
pub use page::PageFetcher;
pub use rate::{AcquisitionResult, RateReading, RateSource, Trend, YearMonth};

//! In-process cache for the latest rate announcement

pub mod entry;
pub mod rate_cache;

pub use entry::{CacheState, STALE_WARNING};
pub use rate_cache::RateCache;

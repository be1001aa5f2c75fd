use chrono::{DateTime, FixedOffset, Utc};

/// Source of the current wall-clock time in the utility's timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_uses_configured_offset() {
        let manila = FixedOffset::east_opt(8 * 3600).unwrap();
        let before = Utc::now();
        let now = SystemClock::new(manila).now();
        assert_eq!(*now.offset(), manila);
        assert!(now >= before);
    }
}

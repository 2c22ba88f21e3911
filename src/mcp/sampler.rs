use chrono::{DateTime, Utc};
use rand::Rng;

/// Source of the random numbers in generated usage records.
#[cfg_attr(test, mockall::automock)]
pub trait UsageSampler: Send + Sync {
    /// A value in `low..=high`.
    fn sample(&self, low: u64, high: u64) -> u64;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl UsageSampler for RandomSampler {
    fn sample(&self, low: u64, high: u64) -> u64 {
        rand::rng().random_range(low..=high)
    }
}

/// Supplies "now" for generated timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

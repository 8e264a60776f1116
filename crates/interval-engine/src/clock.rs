//! Source of the current instant.
//!
//! The resolver never reads the system clock directly; it asks a [`Clock`].
//! Any `Fn() -> DateTime<Utc>` closure is a clock, which keeps tests
//! deterministic.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(FixedClock(at).now(), at);
    }

    #[test]
    fn test_closure_is_a_clock() {
        let at = Utc.with_ymd_and_hms(2020, 2, 29, 0, 0, 0).unwrap();
        let clock = move || at;
        assert_eq!(Clock::now(&clock), at);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}

//! Time source and record id generation.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Local>;

    /// Calendar date of `now` in local time.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to one instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Local>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Local>) -> Self {
        FixedClock { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.instant
    }
}

/// Local calendar day a stored UTC timestamp falls on.
pub fn local_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

/// Hands out creation-timestamp ids (epoch milliseconds).
///
/// Ids are strictly increasing within one generator, so two records created
/// in the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator {
            last: AtomicI64::new(0),
        }
    }

    pub fn next_id(&self, now: DateTime<Local>) -> String {
        let millis = now.timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = millis.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ids_follow_clock_and_never_repeat() {
        let now = Local.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let ids = IdGenerator::new();

        let first = ids.next_id(now);
        let second = ids.next_id(now);

        assert_eq!(first, now.timestamp_millis().to_string());
        assert_eq!(second, (now.timestamp_millis() + 1).to_string());
    }

    #[test]
    fn test_fixed_clock_today() {
        let now = Local.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap();
        let clock = FixedClock::new(now);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(local_day(now.with_timezone(&Utc)), clock.today());
    }
}

//! Injected time source.
//!
//! Token issuing, token verification and the scheduled jobs all read "now"
//! through a [`Clock`] so tests can pin wall-clock time.

use std::sync::RwLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C> Clock for std::sync::Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Process wall clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Tenant-local calendar.
///
/// Event dates and start/end times are stored as local wall-clock values; the
/// jobs compare them against `now` shifted by a fixed UTC offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl LocalCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from an offset in minutes east of UTC. Out-of-range values fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::from_offset_minutes(0)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local wall-clock date and time for the given instant.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    /// Local wall-clock "now" read from the clock.
    pub fn now(&self, clock: &dyn Clock) -> NaiveDateTime {
        self.local(clock.now())
    }

    /// Local calendar date of "now".
    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.now(clock).date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));
    }

    #[test]
    fn calendar_shifts_into_local_day() {
        // 23:30 UTC is already the next day at UTC+01:00.
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 5, 1, 23, 30, 0).unwrap());
        let calendar = LocalCalendar::from_offset_minutes(60);

        let local = calendar.now(&clock);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2026, 5, 2).unwrap());
        assert_eq!(local.time(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let calendar = LocalCalendar::from_offset_minutes(24 * 60);
        assert_eq!(calendar, LocalCalendar::utc());
    }
}

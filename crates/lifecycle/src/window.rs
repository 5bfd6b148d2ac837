//! The one "is now inside an optionally bounded window" predicate.
//!
//! Event, venue and staff statuses all go through [`TimeWindow::contains`] so
//! missing bounds behave the same everywhere.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Same-day time window `[start, end)` with optional bounds.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeWindow {
    pub fn new(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self { start, end }
    }

    /// Unbounded window: the whole day.
    pub fn all_day() -> Self {
        Self::default()
    }

    /// `start <= now < end`; a missing bound is open on that side.
    pub fn contains(&self, now: NaiveTime) -> bool {
        self.start.is_none_or(|start| start <= now) && self.end.is_none_or(|end| now < end)
    }

    /// True once a known end has been reached. A window without an end never ends.
    pub fn has_ended(&self, now: NaiveTime) -> bool {
        self.end.is_some_and(|end| end <= now)
    }

    /// True while a known start is still ahead (or there is no start).
    pub fn starts_at_or_after(&self, now: NaiveTime) -> bool {
        self.start.is_none_or(|start| start >= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn bounded_window_is_half_open() {
        let w = TimeWindow::new(Some(t(14, 0)), Some(t(16, 0)));
        assert!(!w.contains(t(13, 59)));
        assert!(w.contains(t(14, 0)));
        assert!(w.contains(t(15, 59)));
        assert!(!w.contains(t(16, 0)));
    }

    #[test]
    fn end_only_window() {
        let w = TimeWindow::new(None, Some(t(12, 0)));
        assert!(w.contains(t(0, 0)));
        assert!(!w.contains(t(12, 0)));
    }

    #[test]
    fn start_only_window_runs_to_midnight() {
        let w = TimeWindow::new(Some(t(20, 0)), None);
        assert!(!w.contains(t(19, 59)));
        assert!(w.contains(t(23, 59)));
        assert!(!w.has_ended(t(23, 59)));
    }

    #[test]
    fn unbounded_window_contains_every_time() {
        let w = TimeWindow::all_day();
        assert!(w.contains(t(0, 0)));
        assert!(w.contains(t(23, 59)));
        assert!(w.starts_at_or_after(t(23, 59)));
    }

    #[test]
    fn ended_only_with_known_end() {
        let w = TimeWindow::new(Some(t(9, 0)), Some(t(10, 0)));
        assert!(!w.has_ended(t(9, 59)));
        assert!(w.has_ended(t(10, 0)));
    }
}

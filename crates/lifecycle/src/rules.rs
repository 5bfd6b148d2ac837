//! Pure lifecycle rules.
//!
//! Every function here depends only on its arguments, so applying the rules a
//! second time at the same `now` changes nothing.

use chrono::NaiveDateTime;

use crate::{EventSchedule, EventStatus, StaffStatus, VenueStatus};

/// Status the event should move to at `now`, or `None` when it stays put.
///
/// First match wins:
/// 1. `confirme` inside today's window → `en_cours`
/// 2. `confirme`/`en_cours` whose window has elapsed → `termine`
/// 3. `en_attente` whose window has elapsed → `echoue`
pub fn next_event_status(event: &EventSchedule, now: NaiveDateTime) -> Option<EventStatus> {
    match event.status {
        EventStatus::Confirmed if event.in_window(now) => Some(EventStatus::Ongoing),
        EventStatus::Confirmed | EventStatus::Ongoing if event.has_elapsed(now) => {
            Some(EventStatus::Completed)
        }
        EventStatus::Pending if event.has_elapsed(now) => Some(EventStatus::Failed),
        _ => None,
    }
}

/// Occupancy of a venue given the events held there.
pub fn venue_status<'a, I>(events: I, now: NaiveDateTime) -> VenueStatus
where
    I: IntoIterator<Item = &'a EventSchedule>,
{
    let mut awaiting = false;
    for event in events {
        if event.is_happening(now) {
            return VenueStatus::Occupied;
        }
        awaiting |= event.is_upcoming(now);
    }

    if awaiting {
        VenueStatus::Awaiting
    } else {
        VenueStatus::Empty
    }
}

/// Availability of a staff member given the events they are assigned to.
pub fn staff_status<'a, I>(assigned: I, now: NaiveDateTime) -> StaffStatus
where
    I: IntoIterator<Item = &'a EventSchedule>,
{
    if assigned.into_iter().any(|event| event.is_happening(now)) {
        StaffStatus::Active
    } else {
        StaffStatus::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate, NaiveTime};
    use eventia_core::{EventId, TenantId, VenueId};
    use proptest::prelude::*;

    use crate::TimeWindow;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        today().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn t(h: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, 0, 0)
    }

    fn event(date: NaiveDate, start: Option<NaiveTime>, end: Option<NaiveTime>, status: EventStatus) -> EventSchedule {
        EventSchedule {
            id: EventId::new(),
            tenant_id: TenantId::new(),
            venue_id: Some(VenueId::new()),
            date,
            window: TimeWindow::new(start, end),
            status,
        }
    }

    #[test]
    fn confirmed_event_starts_inside_window() {
        let e = event(today(), t(14), t(16), EventStatus::Confirmed);
        assert_eq!(next_event_status(&e, at(15, 0)), Some(EventStatus::Ongoing));
    }

    #[test]
    fn confirmed_event_completes_after_end() {
        let e = event(today(), t(14), t(16), EventStatus::Confirmed);
        assert_eq!(next_event_status(&e, at(16, 30)), Some(EventStatus::Completed));
    }

    #[test]
    fn confirmed_event_waits_before_start() {
        let e = event(today(), t(14), t(16), EventStatus::Confirmed);
        assert_eq!(next_event_status(&e, at(13, 0)), None);
    }

    #[test]
    fn ongoing_event_completes_after_end() {
        let e = event(today(), t(14), t(16), EventStatus::Ongoing);
        assert_eq!(next_event_status(&e, at(15, 0)), None);
        assert_eq!(next_event_status(&e, at(16, 0)), Some(EventStatus::Completed));
    }

    #[test]
    fn pending_event_from_yesterday_fails() {
        let e = event(today() - Duration::days(1), None, None, EventStatus::Pending);
        assert_eq!(next_event_status(&e, at(0, 5)), Some(EventStatus::Failed));
    }

    #[test]
    fn pending_event_inside_window_is_not_started() {
        let e = event(today(), t(14), t(16), EventStatus::Pending);
        assert_eq!(next_event_status(&e, at(15, 0)), None);
        assert_eq!(next_event_status(&e, at(16, 0)), Some(EventStatus::Failed));
    }

    #[test]
    fn unbounded_confirmed_event_is_ongoing_all_day_and_completes_next_day() {
        let e = event(today(), None, None, EventStatus::Confirmed);
        assert_eq!(next_event_status(&e, at(0, 0)), Some(EventStatus::Ongoing));

        let ongoing = EventSchedule {
            status: EventStatus::Ongoing,
            ..e
        };
        assert_eq!(next_event_status(&ongoing, at(23, 59)), None);
        let tomorrow = at(0, 0) + Duration::days(1);
        assert_eq!(next_event_status(&ongoing, tomorrow), Some(EventStatus::Completed));
    }

    #[test]
    fn past_confirmed_event_completes_without_passing_through_ongoing() {
        let e = event(today() - Duration::days(3), t(10), t(11), EventStatus::Confirmed);
        assert_eq!(next_event_status(&e, at(9, 0)), Some(EventStatus::Completed));
    }

    #[test]
    fn terminal_and_cancelled_events_never_move() {
        for status in [EventStatus::Completed, EventStatus::Cancelled, EventStatus::Failed] {
            let e = event(today() - Duration::days(1), None, None, status);
            assert_eq!(next_event_status(&e, at(12, 0)), None);
        }
    }

    #[test]
    fn venue_with_ongoing_event_is_occupied() {
        let events = [event(today(), t(14), t(16), EventStatus::Ongoing)];
        assert_eq!(venue_status(&events, at(15, 0)), VenueStatus::Occupied);
    }

    #[test]
    fn venue_with_confirmed_event_inside_window_is_occupied() {
        let events = [event(today(), t(14), t(16), EventStatus::Confirmed)];
        assert_eq!(venue_status(&events, at(14, 0)), VenueStatus::Occupied);
    }

    #[test]
    fn venue_with_event_next_week_is_awaiting() {
        let events = [event(today() + Duration::days(7), t(14), t(16), EventStatus::Confirmed)];
        assert_eq!(venue_status(&events, at(15, 0)), VenueStatus::Awaiting);
    }

    #[test]
    fn venue_with_later_event_today_is_awaiting() {
        let events = [event(today(), t(18), t(20), EventStatus::Pending)];
        assert_eq!(venue_status(&events, at(15, 0)), VenueStatus::Awaiting);
    }

    #[test]
    fn venue_without_events_is_empty() {
        let events: [EventSchedule; 0] = [];
        assert_eq!(venue_status(&events, at(15, 0)), VenueStatus::Empty);
    }

    #[test]
    fn venue_with_only_started_pending_event_is_empty() {
        // Started but never confirmed: neither happening nor upcoming.
        let events = [event(today(), t(14), t(16), EventStatus::Pending)];
        assert_eq!(venue_status(&events, at(15, 0)), VenueStatus::Empty);
    }

    #[test]
    fn staff_active_only_while_an_assigned_event_happens() {
        let events = [
            event(today(), t(9), t(10), EventStatus::Completed),
            event(today(), t(14), t(16), EventStatus::Confirmed),
        ];
        assert_eq!(staff_status(&events, at(11, 0)), StaffStatus::Inactive);
        assert_eq!(staff_status(&events, at(14, 30)), StaffStatus::Active);
    }

    fn any_status() -> impl Strategy<Value = EventStatus> {
        prop::sample::select(EventStatus::ALL.to_vec())
    }

    fn any_event() -> impl Strategy<Value = EventSchedule> {
        (
            -3i64..=3,
            prop::option::of(0u32..24),
            prop::option::of(0u32..24),
            any_status(),
        )
            .prop_map(|(days, start, end, status)| {
                event(today() + Duration::days(days), start.and_then(t), end.and_then(t), status)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: one application reaches a fixed point at the same instant.
        #[test]
        fn transition_is_idempotent(e in any_event(), h in 0u32..24, m in 0u32..60) {
            let now = at(h, m);
            let once = match next_event_status(&e, now) {
                Some(status) => EventSchedule { status, ..e.clone() },
                None => e.clone(),
            };
            prop_assert_eq!(next_event_status(&once, now), None);
        }

        /// Property: the engine never reopens, cancels or fails a confirmed event.
        #[test]
        fn transitions_only_move_forward(e in any_event(), h in 0u32..24) {
            if let Some(next) = next_event_status(&e, at(h, 0)) {
                let allowed = match e.status {
                    EventStatus::Confirmed => vec![EventStatus::Ongoing, EventStatus::Completed],
                    EventStatus::Ongoing => vec![EventStatus::Completed],
                    EventStatus::Pending => vec![EventStatus::Failed],
                    _ => vec![],
                };
                prop_assert!(allowed.contains(&next));
            }
        }
    }
}

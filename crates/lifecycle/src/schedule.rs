use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use eventia_core::{EventId, TenantId, VenueId};

use crate::{EventStatus, TimeWindow};

/// The schedule fields of an event that drive its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSchedule {
    pub id: EventId,
    pub tenant_id: TenantId,
    pub venue_id: Option<VenueId>,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Local start/end times on `date`.
    pub window: TimeWindow,
    pub status: EventStatus,
}

impl EventSchedule {
    /// Dated today and `now` falls inside the window.
    pub fn in_window(&self, now: NaiveDateTime) -> bool {
        self.date == now.date() && self.window.contains(now.time())
    }

    /// The whole window lies in the past: an earlier day, or today with a reached end.
    pub fn has_elapsed(&self, now: NaiveDateTime) -> bool {
        self.date < now.date() || (self.date == now.date() && self.window.has_ended(now.time()))
    }

    /// Holding its venue and staff right now.
    pub fn is_happening(&self, now: NaiveDateTime) -> bool {
        match self.status {
            EventStatus::Ongoing => self.date == now.date(),
            EventStatus::Confirmed => self.in_window(now),
            _ => false,
        }
    }

    /// Still expected to take place later (pending or confirmed).
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        matches!(self.status, EventStatus::Pending | EventStatus::Confirmed)
            && (self.date > now.date()
                || (self.date == now.date() && self.window.starts_at_or_after(now.time())))
    }
}

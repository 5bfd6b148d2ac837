use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info};

use eventia_core::{Clock, EventId, LocalCalendar, StaffId, TenantId, VenueId};

use crate::rules::{next_event_status, staff_status, venue_status};
use crate::{EventSchedule, EventStatus, StaffStatus, VenueStatus};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleStoreError {
    #[error("lifecycle store backend error: {0}")]
    Backend(String),
}

/// A staff member assigned to an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StaffAssignment {
    pub staff_id: StaffId,
    pub event_id: EventId,
}

/// A venue and the company that owns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VenueRef {
    pub id: VenueId,
    pub tenant_id: TenantId,
}

/// Persistence seam for the status engine.
///
/// Every `set_*` call is one bulk write; implementations return the number of rows touched.
#[async_trait]
pub trait LifecycleStore: Send + Sync {
    /// Events whose status is still open (`en_attente`, `confirme`, `en_cours`).
    async fn load_open_events(&self) -> Result<Vec<EventSchedule>, LifecycleStoreError>;
    async fn list_venues(&self) -> Result<Vec<VenueRef>, LifecycleStoreError>;
    async fn list_staff(&self) -> Result<Vec<StaffId>, LifecycleStoreError>;
    async fn list_assignments(&self) -> Result<Vec<StaffAssignment>, LifecycleStoreError>;

    async fn set_event_status(&self, ids: &[EventId], status: EventStatus) -> Result<u64, LifecycleStoreError>;
    async fn set_venue_status(&self, ids: &[VenueId], status: VenueStatus) -> Result<u64, LifecycleStoreError>;
    async fn set_staff_status(&self, ids: &[StaffId], status: StaffStatus) -> Result<u64, LifecycleStoreError>;
}

#[async_trait]
impl<S> LifecycleStore for Arc<S>
where
    S: LifecycleStore + ?Sized,
{
    async fn load_open_events(&self) -> Result<Vec<EventSchedule>, LifecycleStoreError> {
        (**self).load_open_events().await
    }

    async fn list_venues(&self) -> Result<Vec<VenueRef>, LifecycleStoreError> {
        (**self).list_venues().await
    }

    async fn list_staff(&self) -> Result<Vec<StaffId>, LifecycleStoreError> {
        (**self).list_staff().await
    }

    async fn list_assignments(&self) -> Result<Vec<StaffAssignment>, LifecycleStoreError> {
        (**self).list_assignments().await
    }

    async fn set_event_status(&self, ids: &[EventId], status: EventStatus) -> Result<u64, LifecycleStoreError> {
        (**self).set_event_status(ids, status).await
    }

    async fn set_venue_status(&self, ids: &[VenueId], status: VenueStatus) -> Result<u64, LifecycleStoreError> {
        (**self).set_venue_status(ids, status).await
    }

    async fn set_staff_status(&self, ids: &[StaffId], status: StaffStatus) -> Result<u64, LifecycleStoreError> {
        (**self).set_staff_status(ids, status).await
    }
}

/// Outcome counters of one engine run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub events_started: usize,
    pub events_completed: usize,
    pub events_failed: usize,
    pub venues_occupied: usize,
    pub venues_awaiting: usize,
    pub venues_empty: usize,
    pub staff_active: usize,
    pub staff_inactive: usize,
    /// Bulk writes or listings that failed during this run.
    pub errors: usize,
}

/// Recomputes event, venue and staff statuses from the local wall clock.
///
/// Entity classes are written independently: a failed venue write does not
/// stop the staff pass, and the next run converges whatever was missed.
pub struct StatusEngine<S> {
    store: S,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl<S> StatusEngine<S>
where
    S: LifecycleStore,
{
    pub fn new(store: S, clock: Arc<dyn Clock>, calendar: LocalCalendar) -> Self {
        Self { store, clock, calendar }
    }

    pub async fn run(&self) -> Result<TransitionReport, LifecycleStoreError> {
        let now = self.calendar.now(self.clock.as_ref());
        self.run_at(now).await
    }

    /// One pass at local time `now`. Only a failure to load events aborts the run.
    pub async fn run_at(&self, now: NaiveDateTime) -> Result<TransitionReport, LifecycleStoreError> {
        let mut report = TransitionReport::default();
        let mut events = self.store.load_open_events().await?;

        self.apply_event_transitions(&mut events, now, &mut report).await;

        let by_id: HashMap<EventId, &EventSchedule> = events.iter().map(|e| (e.id, e)).collect();
        self.sync_venues(&events, now, &mut report).await;
        self.sync_staff(&by_id, now, &mut report).await;

        info!(
            started = report.events_started,
            completed = report.events_completed,
            failed = report.events_failed,
            occupied = report.venues_occupied,
            staff_active = report.staff_active,
            errors = report.errors,
            "status sync finished"
        );
        Ok(report)
    }

    /// Moves events forward and projects the new statuses onto `events`.
    async fn apply_event_transitions(
        &self,
        events: &mut [EventSchedule],
        now: NaiveDateTime,
        report: &mut TransitionReport,
    ) {
        let mut targets: BTreeMap<&'static str, (EventStatus, Vec<EventId>)> = BTreeMap::new();
        for event in events.iter_mut() {
            if let Some(next) = next_event_status(event, now) {
                targets
                    .entry(next.as_str())
                    .or_insert_with(|| (next, Vec::new()))
                    .1
                    .push(event.id);
                event.status = next;
            }
        }

        for (status, ids) in targets.into_values() {
            match self.store.set_event_status(&ids, status).await {
                Ok(_) => match status {
                    EventStatus::Ongoing => report.events_started += ids.len(),
                    EventStatus::Completed => report.events_completed += ids.len(),
                    EventStatus::Failed => report.events_failed += ids.len(),
                    _ => {}
                },
                Err(e) => {
                    report.errors += 1;
                    error!(status = %status, count = ids.len(), error = %e, "event status update failed");
                }
            }
        }
    }

    async fn sync_venues(&self, events: &[EventSchedule], now: NaiveDateTime, report: &mut TransitionReport) {
        let venues = match self.store.list_venues().await {
            Ok(v) => v,
            Err(e) => {
                report.errors += 1;
                error!(error = %e, "listing venues failed");
                return;
            }
        };

        // Keyed by (venue, company): another company's event never holds a venue.
        let mut by_venue: HashMap<(VenueId, TenantId), Vec<&EventSchedule>> = HashMap::new();
        for event in events {
            if let Some(venue_id) = event.venue_id {
                by_venue.entry((venue_id, event.tenant_id)).or_default().push(event);
            }
        }

        let mut groups: [(VenueStatus, Vec<VenueId>); 3] = VenueStatus::ALL.map(|s| (s, Vec::new()));
        for venue in venues {
            let held = by_venue
                .get(&(venue.id, venue.tenant_id))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let status = venue_status(held.iter().copied(), now);
            if let Some((_, ids)) = groups.iter_mut().find(|(s, _)| *s == status) {
                ids.push(venue.id);
            }
        }

        for (status, ids) in groups {
            if ids.is_empty() {
                continue;
            }
            match self.store.set_venue_status(&ids, status).await {
                Ok(_) => match status {
                    VenueStatus::Occupied => report.venues_occupied += ids.len(),
                    VenueStatus::Awaiting => report.venues_awaiting += ids.len(),
                    VenueStatus::Empty => report.venues_empty += ids.len(),
                },
                Err(e) => {
                    report.errors += 1;
                    error!(status = %status, count = ids.len(), error = %e, "venue status update failed");
                }
            }
        }
    }

    async fn sync_staff(
        &self,
        events: &HashMap<EventId, &EventSchedule>,
        now: NaiveDateTime,
        report: &mut TransitionReport,
    ) {
        let (staff, assignments) = match (self.store.list_staff().await, self.store.list_assignments().await) {
            (Ok(s), Ok(a)) => (s, a),
            (Err(e), _) | (_, Err(e)) => {
                report.errors += 1;
                error!(error = %e, "listing staff failed");
                return;
            }
        };

        let mut assigned: HashMap<StaffId, Vec<&EventSchedule>> = HashMap::new();
        for a in &assignments {
            if let Some(event) = events.get(&a.event_id) {
                assigned.entry(a.staff_id).or_default().push(event);
            }
        }

        let (mut active, mut inactive) = (Vec::new(), Vec::new());
        for staff_id in staff {
            let held = assigned.get(&staff_id).map(Vec::as_slice).unwrap_or_default();
            match staff_status(held.iter().copied(), now) {
                StaffStatus::Active => active.push(staff_id),
                StaffStatus::Inactive => inactive.push(staff_id),
            }
        }

        for (status, ids) in [(StaffStatus::Active, active), (StaffStatus::Inactive, inactive)] {
            if ids.is_empty() {
                continue;
            }
            match self.store.set_staff_status(&ids, status).await {
                Ok(_) => match status {
                    StaffStatus::Active => report.staff_active += ids.len(),
                    StaffStatus::Inactive => report.staff_inactive += ids.len(),
                },
                Err(e) => {
                    report.errors += 1;
                    error!(status = %status, count = ids.len(), error = %e, "staff status update failed");
                }
            }
        }
    }
}

//! In-memory store for tests/dev.
//!
//! One value backs every storage seam so a test can seed companies, users,
//! venues, events and staff, run the jobs, and inspect the result.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use eventia_auth::{
    CredentialStore, DirectoryError, Role, TenantRecord, TenantStatus, UserDirectory, UserRecord,
};
use eventia_core::{EventId, StaffId, TenantId, UserId, VenueId};
use eventia_lifecycle::{
    EventSchedule, EventStatus, EventStatusWriter, LifecycleStore, LifecycleStoreError,
    StaffAssignment, StaffStatus, TimeWindow, VenueRef, VenueStatus,
};
use eventia_notify::{
    LedgerError, NotificationKey, NotificationLedger, NotificationRecord, NotifyError,
    ReminderSource, ReminderTarget,
};

#[derive(Debug, Clone)]
struct UserRow {
    record: UserRecord,
    password: String,
}

#[derive(Debug, Clone)]
struct VenueRow {
    tenant_id: TenantId,
    name: String,
    status: VenueStatus,
}

#[derive(Debug, Clone)]
struct EventRow {
    schedule: EventSchedule,
    title: String,
}

#[derive(Debug, Clone)]
struct StaffRow {
    phone: Option<String>,
    status: StaffStatus,
}

#[derive(Debug, Default)]
struct Tables {
    tenants: BTreeMap<TenantId, TenantRecord>,
    users: BTreeMap<UserId, UserRow>,
    venues: BTreeMap<VenueId, VenueRow>,
    events: BTreeMap<EventId, EventRow>,
    staff: BTreeMap<StaffId, StaffRow>,
    assignments: Vec<StaffAssignment>,
    notifications: Vec<NotificationRecord>,
}

/// Event fields accepted by [`InMemoryStore::add_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub tenant_id: TenantId,
    pub venue_id: Option<VenueId>,
    pub title: String,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub status: EventStatus,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, String> {
        self.inner.read().map_err(|_| POISONED.to_string())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, String> {
        self.inner.write().map_err(|_| POISONED.to_string())
    }

    pub fn add_tenant(&self, name: &str, status: TenantStatus, contact_phone: Option<&str>) -> TenantRecord {
        let tenant = TenantRecord {
            id: TenantId::new(),
            name: name.to_string(),
            status,
            contact_phone: contact_phone.map(String::from),
        };
        if let Ok(mut t) = self.write() {
            t.tenants.insert(tenant.id, tenant.clone());
        }
        tenant
    }

    pub fn set_tenant_status(&self, id: TenantId, status: TenantStatus) {
        if let Ok(mut t) = self.write() {
            if let Some(tenant) = t.tenants.get_mut(&id) {
                tenant.status = status;
            }
        }
    }

    /// Passwords are kept in clear; this store is never used in production.
    pub fn add_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        tenant_id: Option<TenantId>,
    ) -> UserRecord {
        let record = UserRecord {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            tenant_id,
        };
        if let Ok(mut t) = self.write() {
            t.users.insert(
                record.id,
                UserRow {
                    record: record.clone(),
                    password: password.to_string(),
                },
            );
        }
        record
    }

    pub fn add_venue(&self, tenant_id: TenantId, name: &str) -> VenueId {
        let id = VenueId::new();
        if let Ok(mut t) = self.write() {
            t.venues.insert(
                id,
                VenueRow {
                    tenant_id,
                    name: name.to_string(),
                    status: VenueStatus::Empty,
                },
            );
        }
        id
    }

    pub fn add_event(&self, event: NewEvent) -> EventId {
        let id = EventId::new();
        if let Ok(mut t) = self.write() {
            t.events.insert(
                id,
                EventRow {
                    schedule: EventSchedule {
                        id,
                        tenant_id: event.tenant_id,
                        venue_id: event.venue_id,
                        date: event.date,
                        window: event.window,
                        status: event.status,
                    },
                    title: event.title,
                },
            );
        }
        id
    }

    pub fn add_staff(&self, phone: Option<&str>) -> StaffId {
        let id = StaffId::new();
        if let Ok(mut t) = self.write() {
            t.staff.insert(
                id,
                StaffRow {
                    phone: phone.map(String::from),
                    status: StaffStatus::Inactive,
                },
            );
        }
        id
    }

    pub fn assign(&self, staff_id: StaffId, event_id: EventId) {
        if let Ok(mut t) = self.write() {
            let assignment = StaffAssignment { staff_id, event_id };
            if !t.assignments.contains(&assignment) {
                t.assignments.push(assignment);
            }
        }
    }

    pub fn event_status(&self, id: EventId) -> Option<EventStatus> {
        self.read().ok()?.events.get(&id).map(|e| e.schedule.status)
    }

    pub fn venue_status(&self, id: VenueId) -> Option<VenueStatus> {
        self.read().ok()?.venues.get(&id).map(|v| v.status)
    }

    pub fn staff_status(&self, id: StaffId) -> Option<StaffStatus> {
        self.read().ok()?.staff.get(&id).map(|s| s.status)
    }

    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.read().map(|t| t.notifications.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let t = self.read().map_err(DirectoryError::Backend)?;
        Ok(t.users.get(&id).map(|u| u.record.clone()))
    }

    async fn find_tenant(&self, id: TenantId) -> Result<Option<TenantRecord>, DirectoryError> {
        let t = self.read().map_err(DirectoryError::Backend)?;
        Ok(t.tenants.get(&id).cloned())
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let t = self.read().map_err(DirectoryError::Backend)?;
        Ok(t.users
            .values()
            .find(|u| u.record.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .map(|u| u.record.clone()))
    }
}

#[async_trait]
impl LifecycleStore for InMemoryStore {
    async fn load_open_events(&self) -> Result<Vec<EventSchedule>, LifecycleStoreError> {
        let t = self.read().map_err(LifecycleStoreError::Backend)?;
        Ok(t.events
            .values()
            .filter(|e| e.schedule.status.is_open())
            .map(|e| e.schedule.clone())
            .collect())
    }

    async fn list_venues(&self) -> Result<Vec<VenueRef>, LifecycleStoreError> {
        let t = self.read().map_err(LifecycleStoreError::Backend)?;
        Ok(t
            .venues
            .iter()
            .map(|(id, v)| VenueRef {
                id: *id,
                tenant_id: v.tenant_id,
            })
            .collect())
    }

    async fn list_staff(&self) -> Result<Vec<StaffId>, LifecycleStoreError> {
        let t = self.read().map_err(LifecycleStoreError::Backend)?;
        Ok(t.staff.keys().copied().collect())
    }

    async fn list_assignments(&self) -> Result<Vec<StaffAssignment>, LifecycleStoreError> {
        let t = self.read().map_err(LifecycleStoreError::Backend)?;
        Ok(t.assignments.clone())
    }

    async fn set_event_status(&self, ids: &[EventId], status: EventStatus) -> Result<u64, LifecycleStoreError> {
        let mut t = self.write().map_err(LifecycleStoreError::Backend)?;
        let mut touched = 0;
        for id in ids {
            if let Some(e) = t.events.get_mut(id) {
                e.schedule.status = status;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn set_venue_status(&self, ids: &[VenueId], status: VenueStatus) -> Result<u64, LifecycleStoreError> {
        let mut t = self.write().map_err(LifecycleStoreError::Backend)?;
        let mut touched = 0;
        for id in ids {
            if let Some(v) = t.venues.get_mut(id) {
                v.status = status;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn set_staff_status(&self, ids: &[StaffId], status: StaffStatus) -> Result<u64, LifecycleStoreError> {
        let mut t = self.write().map_err(LifecycleStoreError::Backend)?;
        let mut touched = 0;
        for id in ids {
            if let Some(s) = t.staff.get_mut(id) {
                s.status = status;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl EventStatusWriter for InMemoryStore {
    async fn set_event_status_for_tenant(
        &self,
        tenant: TenantId,
        event: EventId,
        status: EventStatus,
    ) -> Result<bool, LifecycleStoreError> {
        let mut t = self.write().map_err(LifecycleStoreError::Backend)?;
        match t.events.get_mut(&event) {
            Some(e) if e.schedule.tenant_id == tenant => {
                e.schedule.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReminderSource for InMemoryStore {
    async fn confirmed_events_on(&self, date: NaiveDate) -> Result<Vec<ReminderTarget>, NotifyError> {
        let t = self.read().map_err(NotifyError::Source)?;
        let targets = t
            .events
            .values()
            .filter(|e| e.schedule.date == date && e.schedule.status == EventStatus::Confirmed)
            .map(|e| {
                let staff_phones = t
                    .assignments
                    .iter()
                    .filter(|a| a.event_id == e.schedule.id)
                    .filter_map(|a| t.staff.get(&a.staff_id)?.phone.clone())
                    .collect();
                ReminderTarget {
                    event_id: e.schedule.id,
                    tenant_id: e.schedule.tenant_id,
                    title: e.title.clone(),
                    date: e.schedule.date,
                    window: e.schedule.window,
                    venue_name: e
                        .schedule
                        .venue_id
                        .and_then(|v| t.venues.get(&v))
                        .filter(|v| v.tenant_id == e.schedule.tenant_id)
                        .map(|v| v.name.clone()),
                    tenant_phone: t
                        .tenants
                        .get(&e.schedule.tenant_id)
                        .and_then(|tenant| tenant.contact_phone.clone()),
                    staff_phones,
                }
            })
            .collect();
        Ok(targets)
    }
}

#[async_trait]
impl NotificationLedger for InMemoryStore {
    async fn exists(&self, key: &NotificationKey) -> Result<bool, LedgerError> {
        let t = self.read().map_err(LedgerError::Backend)?;
        Ok(t.notifications.iter().any(|n| &n.key == key))
    }

    async fn record(&self, record: NotificationRecord) -> Result<bool, LedgerError> {
        let mut t = self.write().map_err(LedgerError::Backend)?;
        if t.notifications.iter().any(|n| n.key == record.key) {
            return Ok(false);
        }
        t.notifications.push(record);
        Ok(true)
    }
}

//! Postgres-backed implementation of every storage seam.
//!
//! ## Error mapping
//!
//! SQLx errors are flattened to the `Backend(String)` variant of the seam's
//! error type, prefixed with the operation name. Rows carrying an unknown
//! status/role string are reported the same way.
//!
//! ## Bulk writes
//!
//! Status writes issue one `UPDATE … WHERE id = ANY($n)` per target status,
//! with no transaction spanning entity classes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};
use uuid::Uuid;

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

/// Connect and apply the embedded migrations.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database migrations applied");
    Ok(pool)
}

fn db_error(operation: &str, err: impl core::fmt::Display) -> String {
    format!("{operation}: {err}")
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, String> {
    let role: String = row.try_get("role").map_err(|e| db_error("user.role", e))?;
    Ok(UserRecord {
        id: UserId::from_uuid(row.try_get("id").map_err(|e| db_error("user.id", e))?),
        name: row.try_get("name").map_err(|e| db_error("user.name", e))?,
        email: row.try_get("email").map_err(|e| db_error("user.email", e))?,
        role: role.parse::<Role>().map_err(|e| db_error("user.role", e))?,
        tenant_id: row
            .try_get::<Option<Uuid>, _>("entreprise_id")
            .map_err(|e| db_error("user.entreprise_id", e))?
            .map(TenantId::from_uuid),
    })
}

fn schedule_from_row(row: &PgRow) -> Result<EventSchedule, String> {
    let status: String = row.try_get("status").map_err(|e| db_error("event.status", e))?;
    Ok(EventSchedule {
        id: EventId::from_uuid(row.try_get("id").map_err(|e| db_error("event.id", e))?),
        tenant_id: TenantId::from_uuid(
            row.try_get("entreprise_id").map_err(|e| db_error("event.entreprise_id", e))?,
        ),
        venue_id: row
            .try_get::<Option<Uuid>, _>("lieu_id")
            .map_err(|e| db_error("event.lieu_id", e))?
            .map(VenueId::from_uuid),
        date: row.try_get::<NaiveDate, _>("date").map_err(|e| db_error("event.date", e))?,
        window: TimeWindow::new(
            row.try_get::<Option<NaiveTime>, _>("start_time")
                .map_err(|e| db_error("event.start_time", e))?,
            row.try_get::<Option<NaiveTime>, _>("end_time")
                .map_err(|e| db_error("event.end_time", e))?,
        ),
        status: status.parse::<EventStatus>().map_err(|e| db_error("event.status", e))?,
    })
}

const USER_COLUMNS: &str = "id, name, email, role, entreprise_id";

#[async_trait]
impl UserDirectory for PostgresStore {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| DirectoryError::Backend(db_error("find_user", e)))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DirectoryError::Backend)
    }

    #[instrument(skip(self), fields(tenant_id = %id), err)]
    async fn find_tenant(&self, id: TenantId) -> Result<Option<TenantRecord>, DirectoryError> {
        let row = sqlx::query("SELECT id, name, status, contact_phone FROM entreprises WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| DirectoryError::Backend(db_error("find_tenant", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let decode = |row: &PgRow| -> Result<TenantRecord, String> {
            let status: String = row.try_get("status").map_err(|e| db_error("tenant.status", e))?;
            Ok(TenantRecord {
                id: TenantId::from_uuid(row.try_get("id").map_err(|e| db_error("tenant.id", e))?),
                name: row.try_get("name").map_err(|e| db_error("tenant.name", e))?,
                status: status.parse::<TenantStatus>().map_err(|e| db_error("tenant.status", e))?,
                contact_phone: row
                    .try_get("contact_phone")
                    .map_err(|e| db_error("tenant.contact_phone", e))?,
            })
        };
        decode(&row).map(Some).map_err(DirectoryError::Backend)
    }
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE lower(email) = lower($1) AND password_hash = crypt($2, password_hash)"
        ))
        .bind(email.trim())
        .bind(password)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DirectoryError::Backend(db_error("authenticate", e)))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DirectoryError::Backend)
    }
}

#[async_trait]
impl LifecycleStore for PostgresStore {
    async fn load_open_events(&self) -> Result<Vec<EventSchedule>, LifecycleStoreError> {
        let open: Vec<String> = EventStatus::OPEN.iter().map(|s| s.as_str().to_string()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, entreprise_id, lieu_id, date, start_time, end_time, status
            FROM evenements
            WHERE status = ANY($1)
            "#,
        )
        .bind(open)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| LifecycleStoreError::Backend(db_error("load_open_events", e)))?;

        rows.iter()
            .map(schedule_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(LifecycleStoreError::Backend)
    }

    async fn list_venues(&self) -> Result<Vec<VenueRef>, LifecycleStoreError> {
        let rows = sqlx::query("SELECT id, entreprise_id FROM lieux")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("list_venues", e)))?;
        rows.iter()
            .map(|row| -> Result<VenueRef, sqlx::Error> {
                Ok(VenueRef {
                    id: VenueId::from_uuid(row.try_get("id")?),
                    tenant_id: TenantId::from_uuid(row.try_get("entreprise_id")?),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LifecycleStoreError::Backend(db_error("list_venues", e)))
    }

    async fn list_staff(&self) -> Result<Vec<StaffId>, LifecycleStoreError> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM staff")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("list_staff", e)))?;
        Ok(ids.into_iter().map(StaffId::from_uuid).collect())
    }

    async fn list_assignments(&self) -> Result<Vec<StaffAssignment>, LifecycleStoreError> {
        let rows = sqlx::query("SELECT staff_id, event_id FROM event_staff")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("list_assignments", e)))?;

        rows.iter()
            .map(|row| -> Result<StaffAssignment, sqlx::Error> {
                Ok(StaffAssignment {
                    staff_id: StaffId::from_uuid(row.try_get("staff_id")?),
                    event_id: EventId::from_uuid(row.try_get("event_id")?),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| LifecycleStoreError::Backend(db_error("list_assignments", e)))
    }

    async fn set_event_status(&self, ids: &[EventId], status: EventStatus) -> Result<u64, LifecycleStoreError> {
        let result = sqlx::query("UPDATE evenements SET status = $1, updated_at = $2 WHERE id = ANY($3)")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(uuids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("set_event_status", e)))?;
        Ok(result.rows_affected())
    }

    async fn set_venue_status(&self, ids: &[VenueId], status: VenueStatus) -> Result<u64, LifecycleStoreError> {
        let result = sqlx::query("UPDATE lieux SET status = $1 WHERE id = ANY($2)")
            .bind(status.as_str())
            .bind(uuids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("set_venue_status", e)))?;
        Ok(result.rows_affected())
    }

    async fn set_staff_status(&self, ids: &[StaffId], status: StaffStatus) -> Result<u64, LifecycleStoreError> {
        let result = sqlx::query("UPDATE staff SET status = $1 WHERE id = ANY($2)")
            .bind(status.as_str())
            .bind(uuids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| LifecycleStoreError::Backend(db_error("set_staff_status", e)))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EventStatusWriter for PostgresStore {
    async fn set_event_status_for_tenant(
        &self,
        tenant: TenantId,
        event: EventId,
        status: EventStatus,
    ) -> Result<bool, LifecycleStoreError> {
        let result = sqlx::query(
            "UPDATE evenements SET status = $1, updated_at = $2 WHERE id = $3 AND entreprise_id = $4",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(*event.as_uuid())
        .bind(*tenant.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| LifecycleStoreError::Backend(db_error("set_event_status_for_tenant", e)))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReminderSource for PostgresStore {
    async fn confirmed_events_on(&self, date: NaiveDate) -> Result<Vec<ReminderTarget>, NotifyError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.entreprise_id, e.title, e.date, e.start_time, e.end_time,
                   l.name AS venue_name, c.contact_phone
            FROM evenements e
            JOIN entreprises c ON c.id = e.entreprise_id
            LEFT JOIN lieux l ON l.id = e.lieu_id AND l.entreprise_id = e.entreprise_id
            WHERE e.date = $1 AND e.status = $2
            ORDER BY e.id
            "#,
        )
        .bind(date)
        .bind(EventStatus::Confirmed.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| NotifyError::Source(db_error("confirmed_events_on", e)))?;

        let mut targets = rows
            .iter()
            .map(|row| -> Result<ReminderTarget, sqlx::Error> {
                Ok(ReminderTarget {
                    event_id: EventId::from_uuid(row.try_get("id")?),
                    tenant_id: TenantId::from_uuid(row.try_get("entreprise_id")?),
                    title: row.try_get("title")?,
                    date: row.try_get("date")?,
                    window: TimeWindow::new(row.try_get("start_time")?, row.try_get("end_time")?),
                    venue_name: row.try_get("venue_name")?,
                    tenant_phone: row.try_get("contact_phone")?,
                    staff_phones: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| NotifyError::Source(db_error("confirmed_events_on", e)))?;

        if targets.is_empty() {
            return Ok(targets);
        }

        let event_ids: Vec<Uuid> = targets.iter().map(|t| *t.event_id.as_uuid()).collect();
        let phones = sqlx::query(
            r#"
            SELECT es.event_id, s.phone
            FROM event_staff es
            JOIN staff s ON s.id = es.staff_id
            WHERE es.event_id = ANY($1) AND s.phone IS NOT NULL
            ORDER BY s.id
            "#,
        )
        .bind(event_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| NotifyError::Source(db_error("staff_phones", e)))?;

        for row in &phones {
            let (event_id, phone): (Uuid, String) = (
                row.try_get("event_id").map_err(|e| NotifyError::Source(db_error("staff_phones", e)))?,
                row.try_get("phone").map_err(|e| NotifyError::Source(db_error("staff_phones", e)))?,
            );
            if let Some(t) = targets.iter_mut().find(|t| *t.event_id.as_uuid() == event_id) {
                t.staff_phones.push(phone);
            }
        }
        Ok(targets)
    }
}

#[async_trait]
impl NotificationLedger for PostgresStore {
    async fn exists(&self, key: &NotificationKey) -> Result<bool, LedgerError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE event_id = $1 AND channel = $2 AND category = $3 AND recipient = $4
            )
            "#,
        )
        .bind(*key.event_id.as_uuid())
        .bind(&key.channel)
        .bind(&key.category)
        .bind(&key.recipient)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| LedgerError::Backend(db_error("notification_exists", e)))
    }

    async fn record(&self, record: NotificationRecord) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (
                entreprise_id, event_id, channel, category, recipient,
                body, status, provider_status, provider_body, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (event_id, channel, category, recipient) DO NOTHING
            "#,
        )
        .bind(*record.tenant_id.as_uuid())
        .bind(*record.key.event_id.as_uuid())
        .bind(&record.key.channel)
        .bind(&record.key.category)
        .bind(&record.key.recipient)
        .bind(&record.body)
        .bind(record.status.as_str())
        .bind(record.provider_status.map(i32::from))
        .bind(&record.provider_body)
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| LedgerError::Backend(db_error("record_notification", e)))?;
        Ok(result.rows_affected() == 1)
    }
}

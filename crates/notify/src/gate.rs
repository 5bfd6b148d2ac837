use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::{error, info, warn};

use eventia_core::{Clock, EventId, LocalCalendar, TenantId};
use eventia_lifecycle::TimeWindow;

use crate::message::{ReminderDetails, compose_reminder};
use crate::{
    DeliveryStatus, LedgerError, MessagingClient, NotificationKey, NotificationLedger,
    NotificationRecord, normalize_phone,
};

pub const CHANNEL_WHATSAPP: &str = "whatsapp";
pub const CATEGORY_DAY_BEFORE: &str = "jminus1";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("reminder source error: {0}")]
    Source(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Local hour before which a run does nothing.
    pub send_hour: u32,
    pub default_country_code: String,
    pub channel: String,
    pub category: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            send_hour: 9,
            default_country_code: "+241".to_string(),
            channel: CHANNEL_WHATSAPP.to_string(),
            category: CATEGORY_DAY_BEFORE.to_string(),
        }
    }
}

/// A confirmed event together with everyone who should hear about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTarget {
    pub event_id: EventId,
    pub tenant_id: TenantId,
    pub title: String,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub venue_name: Option<String>,
    pub tenant_phone: Option<String>,
    /// Raw phone numbers of staff assigned to the event.
    pub staff_phones: Vec<String>,
}

#[async_trait]
pub trait ReminderSource: Send + Sync {
    /// Confirmed events dated `date`, across all tenants.
    async fn confirmed_events_on(&self, date: NaiveDate) -> Result<Vec<ReminderTarget>, NotifyError>;
}

#[async_trait]
impl<S> ReminderSource for Arc<S>
where
    S: ReminderSource + ?Sized,
{
    async fn confirmed_events_on(&self, date: NaiveDate) -> Result<Vec<ReminderTarget>, NotifyError> {
        (**self).confirmed_events_on(date).await
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub skipped_before_send_hour: bool,
    pub events: usize,
    pub sent: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Sends each day-before reminder at most once per recipient.
///
/// Every attempt is written to the ledger, failed ones included, so a failed
/// send is never retried by a later run.
pub struct DispatchGate<S, L, M> {
    source: S,
    ledger: L,
    messenger: M,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
    config: ReminderConfig,
}

impl<S, L, M> DispatchGate<S, L, M>
where
    S: ReminderSource,
    L: NotificationLedger,
    M: MessagingClient,
{
    pub fn new(
        source: S,
        ledger: L,
        messenger: M,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
        config: ReminderConfig,
    ) -> Self {
        Self {
            source,
            ledger,
            messenger,
            clock,
            calendar,
            config,
        }
    }

    pub async fn run(&self) -> Result<DispatchReport, NotifyError> {
        let now = self.calendar.now(self.clock.as_ref());
        self.run_at(now).await
    }

    pub async fn run_at(&self, now: NaiveDateTime) -> Result<DispatchReport, NotifyError> {
        let mut report = DispatchReport::default();
        if now.hour() < self.config.send_hour {
            report.skipped_before_send_hour = true;
            return Ok(report);
        }

        let Some(tomorrow) = now.date().checked_add_days(Days::new(1)) else {
            return Ok(report);
        };
        let targets = self.source.confirmed_events_on(tomorrow).await?;
        report.events = targets.len();

        for target in &targets {
            self.dispatch_event(target, &mut report).await;
        }

        info!(
            date = %tomorrow,
            events = report.events,
            sent = report.sent,
            failed = report.failed,
            duplicates = report.duplicates,
            errors = report.errors,
            "reminder dispatch finished"
        );
        Ok(report)
    }

    /// Union of staff and tenant phones, normalized and deduplicated in input order.
    fn recipients(&self, target: &ReminderTarget) -> Vec<String> {
        let mut seen = HashSet::new();
        target
            .staff_phones
            .iter()
            .chain(target.tenant_phone.iter())
            .filter_map(|raw| normalize_phone(raw, &self.config.default_country_code))
            .filter(|phone| seen.insert(phone.clone()))
            .collect()
    }

    async fn dispatch_event(&self, target: &ReminderTarget, report: &mut DispatchReport) {
        let body = compose_reminder(&ReminderDetails {
            title: &target.title,
            date: target.date,
            window: target.window,
            venue_name: target.venue_name.as_deref(),
        });

        for recipient in self.recipients(target) {
            let key = NotificationKey {
                event_id: target.event_id,
                channel: self.config.channel.clone(),
                category: self.config.category.clone(),
                recipient,
            };

            match self.ledger.exists(&key).await {
                Ok(true) => {
                    report.duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    report.errors += 1;
                    error!(event_id = %target.event_id, error = %e, "ledger lookup failed");
                    continue;
                }
            }

            let outcome = self.messenger.send_text(&key.recipient, &body).await;
            let status = if outcome.ok {
                report.sent += 1;
                DeliveryStatus::Sent
            } else {
                report.failed += 1;
                warn!(
                    event_id = %target.event_id,
                    recipient = %key.recipient,
                    provider_status = ?outcome.provider_status,
                    "reminder send failed"
                );
                DeliveryStatus::Failed
            };

            let record = NotificationRecord {
                tenant_id: target.tenant_id,
                key,
                body: body.clone(),
                status,
                provider_status: outcome.provider_status,
                provider_body: outcome.provider_body,
                created_at: self.clock.now(),
            };
            if let Err(e) = self.ledger.record(record).await {
                report.errors += 1;
                error!(event_id = %target.event_id, error = %e, "recording reminder failed");
            }
        }
    }
}

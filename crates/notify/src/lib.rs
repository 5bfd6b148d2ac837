//! `eventia-notify`: day-before reminders with at-most-once delivery.

pub mod gate;
pub mod ledger;
pub mod message;
pub mod messaging;
pub mod phone;
pub mod whatsapp;

pub use gate::{
    CATEGORY_DAY_BEFORE, CHANNEL_WHATSAPP, DispatchGate, DispatchReport, NotifyError,
    ReminderConfig, ReminderSource, ReminderTarget,
};
pub use ledger::{DeliveryStatus, LedgerError, NotificationKey, NotificationLedger, NotificationRecord};
pub use message::{ReminderDetails, compose_reminder};
pub use messaging::{MessagingClient, SendOutcome};
pub use phone::normalize_phone;
pub use whatsapp::{WhatsAppClient, WhatsAppConfig};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventia_core::{EventId, TenantId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedupe key: at most one record per (event, channel, category, recipient).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationKey {
    pub event_id: EventId,
    pub channel: String,
    pub category: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub tenant_id: TenantId,
    pub key: NotificationKey,
    pub body: String,
    pub status: DeliveryStatus,
    pub provider_status: Option<u16>,
    pub provider_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("notification ledger backend error: {0}")]
    Backend(String),
}

/// Record of every reminder attempt, sent or failed.
#[async_trait]
pub trait NotificationLedger: Send + Sync {
    async fn exists(&self, key: &NotificationKey) -> Result<bool, LedgerError>;

    /// Insert `record` unless its key is already present. Returns `true` on insert.
    async fn record(&self, record: NotificationRecord) -> Result<bool, LedgerError>;
}

#[async_trait]
impl<L> NotificationLedger for Arc<L>
where
    L: NotificationLedger + ?Sized,
{
    async fn exists(&self, key: &NotificationKey) -> Result<bool, LedgerError> {
        (**self).exists(key).await
    }

    async fn record(&self, record: NotificationRecord) -> Result<bool, LedgerError> {
        (**self).record(record).await
    }
}

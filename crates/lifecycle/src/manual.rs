use std::sync::Arc;

use async_trait::async_trait;

use eventia_core::{EventId, TenantId};

use crate::{EventStatus, LifecycleStoreError};

/// Manual status change by a company admin.
#[async_trait]
pub trait EventStatusWriter: Send + Sync {
    /// Set `event`'s status within `tenant`. Returns `false` when the event is
    /// not found in that tenant.
    async fn set_event_status_for_tenant(
        &self,
        tenant: TenantId,
        event: EventId,
        status: EventStatus,
    ) -> Result<bool, LifecycleStoreError>;
}

#[async_trait]
impl<W> EventStatusWriter for Arc<W>
where
    W: EventStatusWriter + ?Sized,
{
    async fn set_event_status_for_tenant(
        &self,
        tenant: TenantId,
        event: EventId,
        status: EventStatus,
    ) -> Result<bool, LifecycleStoreError> {
        (**self).set_event_status_for_tenant(tenant, event, status).await
    }
}

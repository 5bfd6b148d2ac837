use std::sync::Arc;

use eventia_auth::{Principal, Role};
use eventia_core::{TenantId, UserId};

/// Tenant context for a request.
///
/// Present only when the principal belongs to an active company.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Principal context for a request (verified identity, role and company).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Arc<Principal>,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Arc::new(principal),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.id()
    }

    pub fn role(&self) -> Role {
        self.principal.role()
    }
}

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventia_core::{DomainError, TenantId, UserId};

use crate::{AuthError, Role};

/// Company activation status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TenantStatus::Active)
    }
}

impl FromStr for TenantStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TenantStatus::Active),
            "inactive" => Ok(TenantStatus::Inactive),
            other => Err(DomainError::unknown_variant("tenant status", other)),
        }
    }
}

/// User row as seen by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
}

/// Company ("entreprise") row as seen by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,
    pub name: String,
    pub status: TenantStatus,
    pub contact_phone: Option<String>,
}

/// An authenticated actor, rebuilt per request from a verified token.
///
/// Never persisted: this is a view over the user row plus its resolved company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user: UserRecord,
    /// Resolved company; `None` for tenant-less users (superadmins) and for
    /// references that no longer resolve.
    pub tenant: Option<TenantRecord>,
}

impl Principal {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant.as_ref().map(|t| t.id)
    }

    /// Company the principal acts within, for tenant-scoped operations.
    pub fn require_tenant(&self) -> Result<TenantId, AuthError> {
        match &self.tenant {
            Some(tenant) if tenant.status.is_active() => Ok(tenant.id),
            Some(_) => Err(AuthError::TenantInactive),
            None => Err(AuthError::Forbidden),
        }
    }
}

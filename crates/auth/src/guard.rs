//! Role-based access guard.
//!
//! - No IO
//! - No panics
//! - Pure policy check over an already verified [`Principal`]

use serde::Serialize;
use tracing::debug;

use crate::{AuthError, Principal, Role};

/// Allow the principal only if its role is in `permitted`.
///
/// There is no implicit superadmin bypass: a route that should admit
/// superadmins lists them.
pub fn authorize(principal: &Principal, permitted: &[Role]) -> Result<(), AuthError> {
    if permitted.contains(&principal.role()) {
        Ok(())
    } else {
        debug!(
            user = %principal.id(),
            role = %principal.role(),
            "role not permitted for operation"
        );
        Err(AuthError::Forbidden)
    }
}

/// Route groups and the roles each admits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationGroup {
    /// Company administration and platform jobs.
    Companies,
    /// Events, venues, staff, tables and providers of one company.
    Management,
    /// Guest invite scanning at the door.
    GuestCheckIn,
    /// The caller's own account.
    Account,
}

impl OperationGroup {
    pub fn permitted_roles(self) -> &'static [Role] {
        match self {
            OperationGroup::Companies => &[Role::Superadmin],
            OperationGroup::Management => &[Role::Admin],
            OperationGroup::GuestCheckIn => &[Role::Admin, Role::Hostess],
            OperationGroup::Account => &Role::ALL,
        }
    }
}

pub fn authorize_group(principal: &Principal, group: OperationGroup) -> Result<(), AuthError> {
    authorize(principal, group.permitted_roles())
}

#[cfg(test)]
mod tests {
    use super::*;

    use eventia_core::{TenantId, UserId};

    use crate::{TenantRecord, TenantStatus, UserRecord};

    fn principal(role: Role) -> Principal {
        let tenant_id = TenantId::new();
        Principal {
            user: UserRecord {
                id: UserId::new(),
                name: "Lia".into(),
                email: "lia@example.com".into(),
                role,
                tenant_id: Some(tenant_id),
            },
            tenant: Some(TenantRecord {
                id: tenant_id,
                name: "Lia Events".into(),
                status: TenantStatus::Active,
                contact_phone: None,
            }),
        }
    }

    #[test]
    fn permitted_role_is_allowed() {
        assert_eq!(authorize(&principal(Role::Hostess), &[Role::Admin, Role::Hostess]), Ok(()));
    }

    #[test]
    fn unlisted_role_is_forbidden() {
        assert_eq!(
            authorize(&principal(Role::User), &[Role::Admin]),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn superadmin_has_no_implicit_access() {
        assert_eq!(
            authorize_group(&principal(Role::Superadmin), OperationGroup::Management),
            Err(AuthError::Forbidden)
        );
        assert_eq!(
            authorize_group(&principal(Role::Superadmin), OperationGroup::Companies),
            Ok(())
        );
    }

    #[test]
    fn every_role_reaches_its_own_account() {
        for role in Role::ALL {
            assert_eq!(authorize_group(&principal(role), OperationGroup::Account), Ok(()));
        }
    }

    #[test]
    fn empty_permitted_set_denies_everyone() {
        for role in Role::ALL {
            assert_eq!(authorize(&principal(role), &[]), Err(AuthError::Forbidden));
        }
    }
}

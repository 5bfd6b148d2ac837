use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventia_core::DomainError;

/// Role identifier used for route-level access control.
///
/// Closed set; the wire names are the ones persisted in `users.role`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator. Tenant-less, manages companies.
    Superadmin,
    /// Company administrator.
    Admin,
    /// Hostess: guest check-in at events.
    #[serde(rename = "hotesse")]
    Hostess,
    /// Regular company user.
    #[serde(rename = "utilisateur")]
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Superadmin, Role::Admin, Role::Hostess, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Hostess => "hotesse",
            Role::User => "utilisateur",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::unknown_variant("role", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for role in Role::ALL {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("hostess".parse::<Role>().is_err());
    }
}

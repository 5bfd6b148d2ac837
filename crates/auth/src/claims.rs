use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use eventia_core::{TenantId, UserId};

use crate::Role;

/// Claim names stamped by the codec.
pub const CLAIM_ISSUED_AT: &str = "iat";
pub const CLAIM_EXPIRES_AT: &str = "exp";
pub const CLAIM_TYPE: &str = "type";

/// Free-form claim set carried in a token payload.
pub type Claims = Map<String, Value>;

/// Intended use of a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Authorizes API calls.
    Access,
    /// Only exchangeable for a new token pair.
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view over a decoded claim set.
///
/// Only `sub` and `type` are required; `role`/`tenant_id` are informational
/// (the verifier always re-reads them from the user directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub tenant_id: Option<TenantId>,
}

impl VerifiedClaims {
    pub fn from_claims(claims: Claims) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(claims))
    }
}

/// Claims embedded in an access token for `user`.
pub fn access_claims(sub: UserId, role: Role, tenant_id: Option<TenantId>) -> Claims {
    let mut claims = Claims::new();
    claims.insert("sub".into(), Value::String(sub.to_string()));
    claims.insert("role".into(), Value::String(role.as_str().to_string()));
    if let Some(tenant_id) = tenant_id {
        claims.insert("tenant_id".into(), Value::String(tenant_id.to_string()));
    }
    claims
}

/// Claims embedded in a refresh token: the subject only.
pub fn refresh_claims(sub: UserId) -> Claims {
    let mut claims = Claims::new();
    claims.insert("sub".into(), Value::String(sub.to_string()));
    claims
}

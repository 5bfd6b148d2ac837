use thiserror::Error;

/// Request-facing authentication/authorization failure.
///
/// Decode-level detail (`TokenError`) never reaches this type: every token
/// problem is reported as `Unauthenticated`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("tenant is inactive")]
    TenantInactive,

    #[error("forbidden")]
    Forbidden,

    /// The user directory could not be reached.
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
}

//! `eventia-auth`: stateless token authentication and role/tenant gating.
//!
//! No HTTP or storage here: user and tenant lookups go through the
//! [`UserDirectory`] seam, and "now" through an injected [`eventia_core::Clock`].

pub mod claims;
pub mod codec;
pub mod directory;
pub mod error;
pub mod guard;
pub mod issuer;
pub mod principal;
pub mod roles;
pub mod verifier;

pub use claims::{Claims, TokenType, VerifiedClaims};
pub use codec::{TokenCodec, TokenError};
pub use directory::{CredentialStore, DirectoryError, UserDirectory};
pub use error::AuthError;
pub use guard::{OperationGroup, authorize, authorize_group};
pub use issuer::{TokenIssuer, TokenPair, TokenTtls};
pub use principal::{Principal, TenantRecord, TenantStatus, UserRecord};
pub use roles::Role;
pub use verifier::{CredentialVerifier, PresentedCredentials};

use async_trait::async_trait;
use thiserror::Error;

use eventia_core::{TenantId, UserId};

use crate::{TenantRecord, UserRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Read-only lookup of users and their companies.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;

    async fn find_tenant(&self, id: TenantId) -> Result<Option<TenantRecord>, DirectoryError>;
}

/// Password check used at login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the user when `password` matches the stored hash for `email`.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, DirectoryError>;
}

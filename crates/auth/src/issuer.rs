//! Token issuing at login and refresh time.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::claims::{access_claims, refresh_claims};
use crate::{
    AuthError, CredentialStore, CredentialVerifier, Principal, TokenCodec, TokenType, UserRecord,
};

/// Lifetimes of issued tokens, in seconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TokenTtls {
    pub access: i64,
    pub refresh: i64,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: 60 * 60,
            refresh: 14 * 24 * 60 * 60,
        }
    }
}

/// Freshly minted access/refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    verifier: CredentialVerifier,
    ttls: TokenTtls,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, verifier: CredentialVerifier, ttls: TokenTtls) -> Self {
        Self {
            codec,
            verifier,
            ttls,
        }
    }

    pub fn ttls(&self) -> TokenTtls {
        self.ttls
    }

    /// Mint a new pair for `user`. Earlier pairs stay valid until they expire.
    pub fn issue(&self, user: &UserRecord) -> Result<TokenPair, AuthError> {
        let access_token = self
            .codec
            .encode(
                access_claims(user.id, user.role, user.tenant_id),
                self.ttls.access,
                TokenType::Access,
            )
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let refresh_token = self
            .codec
            .encode(refresh_claims(user.id), self.ttls.refresh, TokenType::Refresh)
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.ttls.access,
            refresh_expires_in: self.ttls.refresh,
        })
    }

    /// Check a password and issue a pair. Members of inactive companies are refused.
    pub async fn login(
        &self,
        store: &dyn CredentialStore,
        email: &str,
        password: &str,
    ) -> Result<(Principal, TokenPair), AuthError> {
        let user = store
            .authenticate(email, password)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .ok_or_else(|| {
                warn!("login rejected");
                AuthError::Unauthenticated
            })?;

        let principal = self.verifier.admit(user).await?;
        let pair = self.issue(&principal.user)?;
        info!(user = %principal.id(), role = %principal.role(), "login succeeded");
        Ok((principal, pair))
    }

    /// Exchange a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(Principal, TokenPair), AuthError> {
        let principal = self
            .verifier
            .verify_token(refresh_token, TokenType::Refresh)
            .await?;
        let pair = self.issue(&principal.user)?;
        Ok((principal, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use eventia_core::FixedClock;

    use crate::verifier::test_support::TestDirectory;
    use crate::{DirectoryError, PresentedCredentials, Role, TenantStatus};

    struct OnePassword {
        user: UserRecord,
        password: &'static str,
    }

    #[async_trait]
    impl CredentialStore for OnePassword {
        async fn authenticate(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Option<UserRecord>, DirectoryError> {
            Ok((email == self.user.email && password == self.password).then(|| self.user.clone()))
        }
    }

    fn issuer() -> (TokenIssuer, Arc<TestDirectory>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
        ));
        let codec = Arc::new(TokenCodec::new("issuer-secret", clock.clone()));
        let directory = Arc::new(TestDirectory::default());
        let verifier = CredentialVerifier::new(codec.clone(), directory.clone());
        (
            TokenIssuer::new(codec, verifier, TokenTtls::default()),
            directory,
            clock,
        )
    }

    #[tokio::test]
    async fn issued_access_token_authenticates() {
        let (issuer, directory, _) = issuer();
        let tenant = directory.add_tenant(TenantStatus::Active);
        let user = directory.add_user(Role::Hostess, Some(tenant));

        let pair = issuer.issue(&user).unwrap();
        let principal = issuer
            .verifier
            .verify(PresentedCredentials {
                cookie: Some(&pair.access_token),
                authorization: None,
            })
            .await
            .unwrap();
        assert_eq!(principal.id(), user.id);
    }

    #[tokio::test]
    async fn refresh_requires_refresh_token() {
        let (issuer, directory, _) = issuer();
        let user = directory.add_user(Role::Superadmin, None);
        let pair = issuer.issue(&user).unwrap();

        assert_eq!(
            issuer.refresh(&pair.access_token).await.unwrap_err(),
            AuthError::Unauthenticated
        );
        let (principal, _) = issuer.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(principal.id(), user.id);
    }

    #[tokio::test]
    async fn refresh_after_expiry_is_refused() {
        let (issuer, directory, clock) = issuer();
        let user = directory.add_user(Role::Superadmin, None);
        let pair = issuer.issue(&user).unwrap();

        clock.advance(chrono::Duration::seconds(issuer.ttls().refresh));
        assert_eq!(
            issuer.refresh(&pair.refresh_token).await.unwrap_err(),
            AuthError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn login_checks_password_and_tenant() {
        let (issuer, directory, _) = issuer();
        let tenant = directory.add_tenant(TenantStatus::Inactive);
        let user = directory.add_user(Role::Admin, Some(tenant));
        let store = OnePassword {
            user: user.clone(),
            password: "s3cret",
        };

        assert_eq!(
            issuer.login(&store, &user.email, "wrong").await.unwrap_err(),
            AuthError::Unauthenticated
        );
        assert_eq!(
            issuer.login(&store, &user.email, "s3cret").await.unwrap_err(),
            AuthError::TenantInactive
        );
    }
}

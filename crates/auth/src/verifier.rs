//! Credential verification: raw request credentials → resolved [`Principal`].

use std::sync::Arc;

use tracing::debug;

use eventia_core::UserId;

use crate::{
    AuthError, Principal, Role, TokenCodec, TokenType, UserDirectory, UserRecord,
    VerifiedClaims,
};

/// Credentials as they arrive on a request.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresentedCredentials<'a> {
    /// Value of the access-token cookie, if any.
    pub cookie: Option<&'a str>,
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<&'a str>,
}

impl<'a> PresentedCredentials<'a> {
    /// Token to verify. The cookie wins when both are present.
    pub fn token(&self) -> Option<&'a str> {
        if let Some(cookie) = self.cookie.map(str::trim).filter(|c| !c.is_empty()) {
            return Some(cookie);
        }

        self.authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Validates presented tokens and resolves them to principals.
///
/// Read-only and safe to share across concurrent requests.
#[derive(Clone)]
pub struct CredentialVerifier {
    codec: Arc<TokenCodec>,
    directory: Arc<dyn UserDirectory>,
}

impl CredentialVerifier {
    pub fn new(codec: Arc<TokenCodec>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { codec, directory }
    }

    /// Authenticate an API request. Only `access` tokens are accepted.
    pub async fn verify(&self, credentials: PresentedCredentials<'_>) -> Result<Principal, AuthError> {
        let token = credentials.token().ok_or(AuthError::Unauthenticated)?;
        self.verify_token(token, TokenType::Access).await
    }

    /// Verify a bare token of the `expected` type and resolve its subject.
    pub async fn verify_token(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<Principal, AuthError> {
        let claims = self.codec.decode(token).map_err(|e| {
            debug!(reason = %e, "token rejected");
            AuthError::Unauthenticated
        })?;

        let claims = VerifiedClaims::from_claims(claims).map_err(|e| {
            debug!(reason = %e, "token claims rejected");
            AuthError::Unauthenticated
        })?;

        if claims.token_type != expected {
            debug!(expected = %expected, presented = %claims.token_type, "token type mismatch");
            return Err(AuthError::Unauthenticated);
        }

        self.resolve(claims.sub).await
    }

    /// Load the subject and its company.
    pub async fn resolve(&self, user_id: UserId) -> Result<Principal, AuthError> {
        let user = self
            .directory
            .find_user(user_id)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .ok_or_else(|| {
                debug!(user = %user_id, "token subject not found");
                AuthError::Unauthenticated
            })?;

        self.admit(user).await
    }

    /// Attach the user's company.
    ///
    /// Every role but superadmin must belong to an existing, active company.
    pub async fn admit(&self, user: UserRecord) -> Result<Principal, AuthError> {
        let exempt = user.role == Role::Superadmin;

        let Some(tenant_id) = user.tenant_id else {
            if exempt {
                return Ok(Principal { user, tenant: None });
            }
            debug!(user = %user.id, role = %user.role, "user has no tenant");
            return Err(AuthError::Forbidden);
        };

        let tenant = self
            .directory
            .find_tenant(tenant_id)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match tenant {
            Some(tenant) if !tenant.status.is_active() && !exempt => {
                debug!(user = %user.id, tenant = %tenant.id, "tenant inactive");
                Err(AuthError::TenantInactive)
            }
            Some(tenant) => Ok(Principal {
                user,
                tenant: Some(tenant),
            }),
            None if exempt => Ok(Principal { user, tenant: None }),
            None => {
                debug!(user = %user.id, tenant = %tenant_id, "tenant reference does not resolve");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use async_trait::async_trait;

    use eventia_core::{TenantId, UserId};

    use crate::{
        DirectoryError, Role, TenantRecord, TenantStatus, UserDirectory, UserRecord,
    };

    #[derive(Debug, Default)]
    pub struct TestDirectory {
        pub users: RwLock<HashMap<UserId, UserRecord>>,
        pub tenants: RwLock<HashMap<TenantId, TenantRecord>>,
    }

    impl TestDirectory {
        pub fn add_tenant(&self, status: TenantStatus) -> TenantId {
            let id = TenantId::new();
            self.tenants.write().unwrap().insert(
                id,
                TenantRecord {
                    id,
                    name: "Maison Nzeng".to_string(),
                    status,
                    contact_phone: Some("+24177000000".to_string()),
                },
            );
            id
        }

        pub fn add_user(&self, role: Role, tenant_id: Option<TenantId>) -> UserRecord {
            let user = UserRecord {
                id: UserId::new(),
                name: "Awa".to_string(),
                email: format!("{}@example.com", role.as_str()),
                role,
                tenant_id,
            };
            self.users.write().unwrap().insert(user.id, user.clone());
            user
        }
    }

    #[async_trait]
    impl UserDirectory for TestDirectory {
        async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
            Ok(self.users.read().unwrap().get(&id).cloned())
        }

        async fn find_tenant(&self, id: TenantId) -> Result<Option<TenantRecord>, DirectoryError> {
            Ok(self.tenants.read().unwrap().get(&id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestDirectory;
    use super::*;

    use chrono::{TimeZone, Utc};
    use eventia_core::{FixedClock, TenantId};

    use crate::claims::{access_claims, refresh_claims};
    use crate::{Role, TenantStatus};

    struct Fixture {
        clock: Arc<FixedClock>,
        codec: Arc<TokenCodec>,
        directory: Arc<TestDirectory>,
        verifier: CredentialVerifier,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
        ));
        let codec = Arc::new(TokenCodec::new("verifier-secret", clock.clone()));
        let directory = Arc::new(TestDirectory::default());
        let verifier = CredentialVerifier::new(codec.clone(), directory.clone());
        Fixture {
            clock,
            codec,
            directory,
            verifier,
        }
    }

    fn access_token(f: &Fixture, user: &UserRecord) -> String {
        f.codec
            .encode(
                access_claims(user.id, user.role, user.tenant_id),
                3600,
                TokenType::Access,
            )
            .unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn cookie_takes_precedence_over_header() {
        let creds = PresentedCredentials {
            cookie: Some("from-cookie"),
            authorization: Some("Bearer from-header"),
        };
        assert_eq!(creds.token(), Some("from-cookie"));
    }

    #[test]
    fn header_used_when_cookie_missing_or_blank() {
        let creds = PresentedCredentials {
            cookie: Some("  "),
            authorization: Some("Bearer  abc "),
        };
        assert_eq!(creds.token(), Some("abc"));
    }

    #[test]
    fn non_bearer_header_is_ignored() {
        let creds = PresentedCredentials {
            cookie: None,
            authorization: Some("Basic dXNlcjpwYXNz"),
        };
        assert_eq!(creds.token(), None);
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let f = fixture();
        let err = f.verifier.verify(PresentedCredentials::default()).await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn valid_access_token_resolves_principal() {
        let f = fixture();
        let tenant_id = f.directory.add_tenant(TenantStatus::Active);
        let user = f.directory.add_user(Role::Admin, Some(tenant_id));
        let header = bearer(&access_token(&f, &user));

        let principal = f
            .verifier
            .verify(PresentedCredentials {
                cookie: None,
                authorization: Some(&header),
            })
            .await
            .unwrap();

        assert_eq!(principal.id(), user.id);
        assert_eq!(principal.role(), Role::Admin);
        assert_eq!(principal.tenant_id(), Some(tenant_id));
    }

    #[tokio::test]
    async fn refresh_token_cannot_authorize_api_calls() {
        let f = fixture();
        let user = f.directory.add_user(Role::Superadmin, None);
        let token = f
            .codec
            .encode(refresh_claims(user.id), 3600, TokenType::Refresh)
            .unwrap();

        let err = f
            .verifier
            .verify(PresentedCredentials {
                cookie: Some(&token),
                authorization: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn expired_and_forged_tokens_look_the_same() {
        let f = fixture();
        let user = f.directory.add_user(Role::Superadmin, None);
        let token = access_token(&f, &user);

        let mut forged = token.clone();
        forged.push('x');
        let forged_err = f
            .verifier
            .verify_token(&forged, TokenType::Access)
            .await
            .unwrap_err();

        f.clock.advance(chrono::Duration::hours(2));
        let expired_err = f
            .verifier
            .verify_token(&token, TokenType::Access)
            .await
            .unwrap_err();

        assert_eq!(forged_err, AuthError::Unauthenticated);
        assert_eq!(expired_err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn unknown_subject_is_unauthenticated() {
        let f = fixture();
        let ghost = UserRecord {
            id: UserId::new(),
            name: "ghost".into(),
            email: "ghost@example.com".into(),
            role: Role::Admin,
            tenant_id: None,
        };
        let token = access_token(&f, &ghost);

        let err = f
            .verifier
            .verify_token(&token, TokenType::Access)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn inactive_tenant_denied_even_with_valid_token() {
        let f = fixture();
        let tenant_id = f.directory.add_tenant(TenantStatus::Inactive);

        for role in [Role::Admin, Role::Hostess, Role::User] {
            let user = f.directory.add_user(role, Some(tenant_id));
            let token = access_token(&f, &user);
            let err = f
                .verifier
                .verify_token(&token, TokenType::Access)
                .await
                .unwrap_err();
            assert_eq!(err, AuthError::TenantInactive, "role {role}");
        }
    }

    #[tokio::test]
    async fn dangling_tenant_reference_is_unauthenticated() {
        let f = fixture();
        let user = f.directory.add_user(Role::Admin, Some(TenantId::new()));
        let token = access_token(&f, &user);

        let err = f
            .verifier
            .verify_token(&token, TokenType::Access)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn tenantless_members_are_forbidden() {
        let f = fixture();

        for role in [Role::Admin, Role::Hostess, Role::User] {
            let user = f.directory.add_user(role, None);
            let token = access_token(&f, &user);
            let err = f
                .verifier
                .verify_token(&token, TokenType::Access)
                .await
                .unwrap_err();
            assert_eq!(err, AuthError::Forbidden, "role {role}");
        }
    }

    #[tokio::test]
    async fn superadmin_needs_no_tenant() {
        let f = fixture();
        let user = f.directory.add_user(Role::Superadmin, None);
        let token = access_token(&f, &user);

        let principal = f
            .verifier
            .verify_token(&token, TokenType::Access)
            .await
            .unwrap();
        assert_eq!(principal.tenant, None);
        assert_eq!(principal.require_tenant(), Err(AuthError::Forbidden));
    }

    #[tokio::test]
    async fn superadmin_is_not_blocked_by_inactive_tenant() {
        let f = fixture();
        let tenant_id = f.directory.add_tenant(TenantStatus::Inactive);
        let user = f.directory.add_user(Role::Superadmin, Some(tenant_id));
        let token = access_token(&f, &user);

        let principal = f
            .verifier
            .verify_token(&token, TokenType::Access)
            .await
            .unwrap();
        assert_eq!(principal.require_tenant(), Err(AuthError::TenantInactive));
    }
}

//! HS256 token codec.
//!
//! Tokens are three dot-separated base64url (unpadded) segments:
//! `header.payload.signature`, where the signature is HMAC-SHA256 over
//! `header.payload` keyed by the shared secret.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use eventia_core::Clock;

use crate::claims::{CLAIM_EXPIRES_AT, CLAIM_ISSUED_AT, CLAIM_TYPE, Claims, TokenType};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not made of three segments")]
    MalformedToken,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token payload is not a claim object")]
    BadPayload,

    #[error("token has expired")]
    Expired,

    #[error("token could not be encoded: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Shared signing secret. Never printed.
#[derive(Clone)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("TokenSecret(**redacted**)")
    }
}

/// Stateless encoder/decoder for signed, expiring tokens.
#[derive(Clone)]
pub struct TokenCodec {
    secret: TokenSecret,
    clock: Arc<dyn Clock>,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: TokenSecret::new(secret),
            clock,
        }
    }

    /// Sign `claims` stamped with `iat`, `exp = iat + ttl_seconds` and `type`.
    ///
    /// Stamped names overwrite any caller-provided values.
    pub fn encode(
        &self,
        mut claims: Claims,
        ttl_seconds: i64,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at.saturating_add(ttl_seconds);

        claims.insert(CLAIM_ISSUED_AT.into(), Value::from(issued_at));
        claims.insert(CLAIM_EXPIRES_AT.into(), Value::from(expires_at));
        claims.insert(CLAIM_TYPE.into(), Value::from(token_type.as_str()));

        let header = serde_json::to_vec(&HEADER).map_err(|e| TokenError::Encode(e.to_string()))?;
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Encode(e.to_string()))?;

        let header = URL_SAFE_NO_PAD.encode(header);
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&header, &payload)?);

        Ok(format!("{header}.{payload}.{signature}"))
    }

    /// Verify and decode a token into its claim set.
    ///
    /// Checks run in order: shape, signature, payload, expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::MalformedToken);
        };

        let expected = self
            .sign(header, payload)
            .map_err(|_| TokenError::BadSignature)?;
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::BadSignature)?;
        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(TokenError::BadSignature);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::BadPayload)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::BadPayload)?;

        if let Some(exp) = claims.get(CLAIM_EXPIRES_AT) {
            let exp = exp.as_i64().ok_or(TokenError::BadPayload)?;
            if exp <= self.clock.now().timestamp() {
                return Err(TokenError::Expired);
            }
        }

        Ok(claims)
    }

    fn sign(&self, header: &str, payload: &str) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| TokenError::Encode(e.to_string()))?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

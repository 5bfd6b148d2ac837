use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// Result of handing a message to the provider. Never an error: misconfiguration
/// and transport failures are reported as `ok = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub ok: bool,
    pub provider_status: Option<u16>,
    pub provider_body: Option<String>,
}

impl SendOutcome {
    pub fn delivered(status: u16, body: impl Into<String>) -> Self {
        Self {
            ok: true,
            provider_status: Some(status),
            provider_body: Some(body.into()),
        }
    }

    pub fn rejected(status: Option<u16>, body: impl Into<String>) -> Self {
        Self {
            ok: false,
            provider_status: status,
            provider_body: Some(body.into()),
        }
    }

    pub fn disabled() -> Self {
        Self::rejected(None, "messaging disabled")
    }

    pub fn missing_credentials() -> Self {
        Self::rejected(None, "messaging credentials missing")
    }
}

/// Outbound text messaging provider.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// `recipient` is a normalized `+<digits>` number.
    async fn send_text(&self, recipient: &str, body: &str) -> SendOutcome;
}

#[async_trait]
impl<M> MessagingClient for Arc<M>
where
    M: MessagingClient + ?Sized,
{
    async fn send_text(&self, recipient: &str, body: &str) -> SendOutcome {
        (**self).send_text(recipient, body).await
    }
}

//! WhatsApp Cloud API text sender.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::{MessagingClient, SendOutcome};

const GRAPH_API_BASE: &str = "https://graph.facebook.com";

#[derive(Clone, Default)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub phone_number_id: Option<String>,
    pub api_version: String,
    /// Overrides the Graph API host; used by tests.
    pub base_url: Option<String>,
}

impl core::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("enabled", &self.enabled)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("phone_number_id", &self.phone_number_id)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    fn messages_url(&self, phone_number_id: &str) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(GRAPH_API_BASE);
        format!(
            "{}/{}/{}/messages",
            base.trim_end_matches('/'),
            self.config.api_version,
            phone_number_id
        )
    }
}

#[async_trait]
impl MessagingClient for WhatsAppClient {
    async fn send_text(&self, recipient: &str, body: &str) -> SendOutcome {
        if !self.config.enabled {
            return SendOutcome::disabled();
        }
        let (Some(token), Some(phone_number_id)) = (
            self.config.token.as_deref().filter(|t| !t.is_empty()),
            self.config.phone_number_id.as_deref().filter(|p| !p.is_empty()),
        ) else {
            warn!("whatsapp enabled without token or phone number id");
            return SendOutcome::missing_credentials();
        };

        let payload = json!({
            "messaging_product": "whatsapp",
            "to": recipient.trim_start_matches('+'),
            "type": "text",
            "text": { "preview_url": false, "body": body },
        });

        let resp = match self
            .http
            .post(self.messages_url(phone_number_id))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "whatsapp request failed");
                return SendOutcome::rejected(None, e.to_string());
            }
        };

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "whatsapp response");

        if status.is_success() {
            SendOutcome::delivered(status.as_u16(), text)
        } else {
            SendOutcome::rejected(Some(status.as_u16()), text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            enabled: true,
            token: Some("tok".into()),
            phone_number_id: Some("12345".into()),
            api_version: "v19.0".into(),
            base_url: None,
        }
    }

    #[test]
    fn messages_url_includes_version_and_sender() {
        let client = WhatsAppClient::new(config());
        assert_eq!(
            client.messages_url("12345"),
            "https://graph.facebook.com/v19.0/12345/messages"
        );
    }

    #[tokio::test]
    async fn disabled_client_does_not_send() {
        let client = WhatsAppClient::new(WhatsAppConfig {
            enabled: false,
            ..config()
        });
        assert_eq!(client.send_text("+24111223344", "hi").await, SendOutcome::disabled());
    }

    #[tokio::test]
    async fn missing_credentials_are_reported() {
        let client = WhatsAppClient::new(WhatsAppConfig {
            token: None,
            ..config()
        });
        assert_eq!(
            client.send_text("+24111223344", "hi").await,
            SendOutcome::missing_credentials()
        );
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("tok\""));
        assert!(rendered.contains("<redacted>"));
    }
}

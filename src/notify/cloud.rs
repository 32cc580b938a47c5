//! WhatsApp Cloud API strategy.

use super::{DeliveryJob, Document, Notifier, error_body, normalize_phone};
use crate::config::CloudConfig;
use crate::error::{DeliveryError, DeliveryResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct DocumentPayload<'a> {
    link: &'a str,
    caption: &'a str,
}

#[derive(Debug, Serialize)]
struct DocumentMessage<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    document: DocumentPayload<'a>,
}

/// Sends document messages through the Graph API.
pub struct CloudApiNotifier {
    config: CloudConfig,
    http_client: reqwest::Client,
}

impl CloudApiNotifier {
    pub fn new(config: CloudConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("invoice-whatsapp/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl Notifier for CloudApiNotifier {
    fn strategy(&self) -> &'static str {
        "cloud"
    }

    async fn deliver(&self, job: &DeliveryJob) -> DeliveryResult {
        let access_token = self.config.access_token();
        let Some(url) = self.config.messages_url() else {
            return Err(DeliveryError::NotConfigured(
                "cloud.access_token and cloud.phone_number_id",
            ));
        };
        if access_token.is_empty() {
            return Err(DeliveryError::NotConfigured(
                "cloud.access_token and cloud.phone_number_id",
            ));
        }

        let to = normalize_phone(&job.phone);
        if to.is_empty() {
            return Err(DeliveryError::InvalidPhone);
        }

        // The Cloud API only accepts links; local files go through the companion
        let Document::Link(link) = &job.document else {
            return Err(DeliveryError::UnsupportedDocument(
                "the Cloud API needs a document link",
            ));
        };

        let body = DocumentMessage {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: &to,
            kind: "document",
            document: DocumentPayload {
                link,
                caption: &job.caption,
            },
        };

        debug!(url = %url, to = %to, "Posting WhatsApp document message");
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Remote {
                service: "WhatsApp API",
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        info!(to = %to, "WhatsApp Cloud API accepted document message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> DeliveryJob {
        DeliveryJob {
            phone: "+91 98765-43210".into(),
            document: Document::Link("https://erp.example.com/invoice_pdf?id=1".into()),
            caption: "Please find your invoice attached.".into(),
        }
    }

    #[test]
    fn payload_shape() {
        let body = DocumentMessage {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: "919876543210",
            kind: "document",
            document: DocumentPayload {
                link: "https://x/y.pdf",
                caption: "hi",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "919876543210",
                "type": "document",
                "document": {"link": "https://x/y.pdf", "caption": "hi"}
            })
        );
    }

    #[tokio::test]
    async fn missing_credentials_are_reported_before_any_request() {
        let notifier = CloudApiNotifier::new(CloudConfig::default());
        let err = notifier.deliver(&job()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));

        let notifier = CloudApiNotifier::new(CloudConfig {
            phone_number_id: Some("123".into()),
            ..CloudConfig::default()
        });
        let err = notifier.deliver(&job()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn empty_phone_is_rejected() {
        let notifier = CloudApiNotifier::new(CloudConfig {
            access_token: Some("EAAG".into()),
            phone_number_id: Some("123".into()),
            ..CloudConfig::default()
        });
        let mut job = job();
        job.phone = " + ".into();
        let err = notifier.deliver(&job).await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidPhone));
    }
}

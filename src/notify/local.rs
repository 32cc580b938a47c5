//! Local WhatsApp Web companion strategy.
//!
//! The companion is expected to be up already; see [`crate::supervisor`].

use super::{DeliveryJob, Document, Notifier, error_body};
use crate::config::CompanionConfig;
use crate::error::{DeliveryError, DeliveryResult};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SendInvoiceRequest<'a> {
    phone: &'a str,
    file_path: &'a Path,
    message: &'a str,
}

/// Posts `{phone, file_path, message}` to `<service_url>/send-invoice`.
pub struct LocalServiceNotifier {
    base_url: String,
    http_client: reqwest::Client,
}

impl LocalServiceNotifier {
    pub fn new(config: &CompanionConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.send_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.base_url().to_string(),
            http_client,
        }
    }
}

#[async_trait]
impl Notifier for LocalServiceNotifier {
    fn strategy(&self) -> &'static str {
        "local"
    }

    async fn deliver(&self, job: &DeliveryJob) -> DeliveryResult {
        let Document::File(path) = &job.document else {
            return Err(DeliveryError::UnsupportedDocument(
                "the local companion needs a file path",
            ));
        };

        let url = format!("{}/send-invoice", self.base_url);
        let body = SendInvoiceRequest {
            phone: &job.phone,
            file_path: path,
            message: &job.caption,
        };

        debug!(url = %url, file = %path.display(), "Posting invoice to companion");
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Remote {
                service: "Node service",
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        info!(phone = %job.phone, "Companion accepted invoice");
        Ok(())
    }
}

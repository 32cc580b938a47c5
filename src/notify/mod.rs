//! Outbound delivery of invoice PDFs to WhatsApp.
//!
//! Two strategies share one [`Notifier`] seam and one result type:
//!
//! - [`CloudApiNotifier`]: posts a document message that references a signed
//!   download link; WhatsApp fetches the PDF itself.
//! - [`LocalServiceNotifier`]: hands a local file path to the WhatsApp Web
//!   companion, which attaches the file in a real browser session.
//!
//! Neither strategy retries. A repeated send on a browser automation target
//! can deliver the same invoice twice.

mod cloud;
mod local;

pub use cloud::CloudApiNotifier;
pub use local::LocalServiceNotifier;

use crate::error::DeliveryResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// What the recipient receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Publicly fetchable URL (Cloud API).
    Link(String),
    /// File on this machine (local companion).
    File(PathBuf),
}

/// One outbound message.
#[derive(Debug, Clone)]
pub struct DeliveryJob {
    pub phone: String,
    pub document: Document,
    pub caption: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Label used in logs and metrics.
    fn strategy(&self) -> &'static str;

    /// Deliver one job. No retries.
    async fn deliver(&self, job: &DeliveryJob) -> DeliveryResult;
}

/// Reduce a phone number to the form the Cloud API expects: no leading `+`,
/// no spaces or dashes.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

/// Read an error response body for diagnostics, tolerating failures.
async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
    }
}

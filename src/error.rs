//! Unified error handling for invoice delivery.
//!
//! Delivery failures keep "could not reach the service" apart from "the
//! service answered with an error", so an operator can tell a down
//! companion from a rejected request.

use crate::invoice::{RenderError, StoreError};
use thiserror::Error;

// ============================================================================
// Delivery Errors (outbound notifier)
// ============================================================================

/// Errors from one outbound delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Credentials or identifiers needed for this strategy are missing.
    #[error("WhatsApp API not configured: set {0}")]
    NotConfigured(&'static str),

    #[error("invalid phone number")]
    InvalidPhone,

    /// The strategy cannot carry this kind of document.
    #[error("unsupported document: {0}")]
    UnsupportedDocument(&'static str),

    /// The local companion service could not be contacted at all.
    #[error("Cannot reach WhatsApp service at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The Cloud API could not be contacted (DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The peer answered with a non-2xx status.
    #[error("{service} error (HTTP {status}): {body}")]
    Remote {
        service: &'static str,
        status: u16,
        body: String,
    },
}

impl DeliveryError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::InvalidPhone => "invalid_phone",
            Self::UnsupportedDocument(_) => "unsupported_document",
            Self::Unreachable { .. } => "unreachable",
            Self::Transport(_) => "transport",
            Self::Remote { .. } => "remote",
        }
    }
}

/// Result type for delivery strategies.
pub type DeliveryResult = Result<(), DeliveryError>;

// ============================================================================
// Send Errors (user-triggered actions)
// ============================================================================

/// Errors surfaced to the operator by the send actions.
#[derive(Debug, Error)]
pub enum SendError {
    /// Missing configuration; the message carries remediation steps.
    #[error("{0}")]
    Configuration(String),

    /// The invoice cannot be sent as-is (no partner, no phone, wrong kind).
    #[error("{0}")]
    Validation(String),

    #[error("invoice {0} not found")]
    NotFound(i64),

    #[error("Could not write PDF to temp: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invoice could not be rendered: {0}")]
    Render(#[from] RenderError),

    #[error("Invoice lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Invoice could not be sent via WhatsApp.\n\n{0}")]
    Delivery(#[from] DeliveryError),

    /// Cloud API delivery failed; the message lists what to check.
    #[error(
        "Invoice PDF could not be sent via WhatsApp.\n\n{0}\n\n\
         Check: (1) server.public_base_url is the public HTTPS address (not localhost), \
         (2) cloud.access_token and cloud.phone_number_id are correct, \
         (3) the PDF URL opens from the internet."
    )]
    CloudDelivery(#[source] DeliveryError),
}

impl SendError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io",
            Self::Render(_) => "render",
            Self::Store(_) => "store",
            Self::Delivery(e) | Self::CloudDelivery(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_and_remote_messages_differ() {
        let unreachable = DeliveryError::Unreachable {
            url: "http://127.0.0.1:3000".into(),
            reason: "connection refused".into(),
        };
        let remote = DeliveryError::Remote {
            service: "Node service",
            status: 500,
            body: "boom".into(),
        };

        assert!(unreachable.to_string().starts_with("Cannot reach WhatsApp service"));
        assert_eq!(remote.to_string(), "Node service error (HTTP 500): boom");
        assert_ne!(unreachable.error_code(), remote.error_code());
    }

    #[test]
    fn send_error_wraps_delivery_detail() {
        let err = SendError::from(DeliveryError::InvalidPhone);
        assert_eq!(err.error_code(), "invalid_phone");
        assert!(err.to_string().contains("invalid phone number"));
    }
}

//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, DeliveryMode};
use crate::security::signed_url;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.public_base_url is required for cloud delivery")]
    MissingPublicBaseUrl,
    #[error("server.public_base_url is not a valid http(s) URL: '{0}'")]
    InvalidPublicBaseUrl(String),
    #[error("token.secret is required for cloud delivery")]
    MissingTokenSecret,
    #[error("token.validity_secs must be greater than zero")]
    ZeroValidityWindow,
    #[error("cloud.access_token is required for cloud delivery")]
    MissingAccessToken,
    #[error("cloud.phone_number_id is required for cloud delivery")]
    MissingPhoneNumberId,
    #[error("companion.service_url is not a valid http(s) URL: '{0}'")]
    InvalidCompanionUrl(String),
    #[error("companion.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base_url = config.server.public_base_url();
    if !base_url.is_empty() && !is_http_url(base_url) {
        errors.push(ValidationError::InvalidPublicBaseUrl(base_url.to_string()));
    }

    if config.token.validity_secs == 0 {
        errors.push(ValidationError::ZeroValidityWindow);
    }

    if !is_http_url(config.companion.base_url()) {
        errors.push(ValidationError::InvalidCompanionUrl(
            config.companion.service_url.clone(),
        ));
    }
    if config.companion.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    // Cloud delivery needs everything the signed URL and the API call use
    if config.delivery.mode == DeliveryMode::Cloud {
        if base_url.is_empty() {
            errors.push(ValidationError::MissingPublicBaseUrl);
        }
        if config.token.secret().is_empty() {
            errors.push(ValidationError::MissingTokenSecret);
        }
        if config.cloud.access_token().is_empty() {
            errors.push(ValidationError::MissingAccessToken);
        }
        if config.cloud.messages_url().is_none() {
            errors.push(ValidationError::MissingPhoneNumberId);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Emit warnings for settings that load fine but will not work in practice.
pub fn warn_misconfiguration(config: &Config) {
    if config.token.secret().is_empty() {
        tracing::warn!(
            "No [token].secret configured - signed PDF URLs cannot be issued and /invoice_pdf will answer 404 to every request"
        );
    }

    let base_url = config.server.public_base_url();
    if !base_url.is_empty() && signed_url::is_private_base_url(base_url) {
        tracing::warn!(
            base_url,
            "[server].public_base_url is not publicly reachable - the WhatsApp Cloud API will fail to download PDFs. Use the public HTTPS address of this service"
        );
    }
}

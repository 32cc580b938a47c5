//! WhatsApp Cloud API configuration.

use serde::Deserialize;

use super::defaults::*;

/// WhatsApp Cloud API credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    /// Bearer token from Meta Business Suite.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Sender phone number ID.
    #[serde(default)]
    pub phone_number_id: Option<String>,
    /// Graph API version (default: v18.0).
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Graph API host (default: https://graph.facebook.com).
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_cloud_timeout_secs")]
    pub timeout_secs: u64,
    /// Caption attached to the document and prefilled in the chat link.
    #[serde(default = "default_caption")]
    pub caption: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            api_version: default_api_version(),
            graph_base_url: default_graph_base_url(),
            timeout_secs: default_cloud_timeout_secs(),
            caption: default_caption(),
        }
    }
}

impl CloudConfig {
    /// Messages endpoint for the configured sender, if a sender is set.
    pub fn messages_url(&self) -> Option<String> {
        let sender = self.phone_number_id.as_deref().map(str::trim)?;
        if sender.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}/{}/messages",
            self.graph_base_url.trim_end_matches('/'),
            self.api_version,
            sender
        ))
    }

    /// Access token, or "" when unset.
    pub fn access_token(&self) -> &str {
        self.access_token.as_deref().map(str::trim).unwrap_or("")
    }
}

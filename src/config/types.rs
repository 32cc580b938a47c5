//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::cloud::CloudConfig;
use super::companion::CompanionConfig;
use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP listener and public address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Capability token signing.
    #[serde(default)]
    pub token: TokenConfig,
    /// WhatsApp Cloud API.
    #[serde(default)]
    pub cloud: CloudConfig,
    /// Local WhatsApp Web companion service.
    #[serde(default)]
    pub companion: CompanionConfig,
    /// Delivery mode and temp file handling.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Invoice source.
    #[serde(default)]
    pub store: StoreConfig,
    /// External PDF renderer.
    #[serde(default)]
    pub renderer: RendererConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the PDF endpoint binds to (default: 127.0.0.1:8069).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Publicly reachable base URL of this service, e.g. "https://erp.example.com".
    /// The Cloud API downloads PDFs from here, so it must not be a loopback address.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            public_base_url: None,
        }
    }
}

impl ServerConfig {
    /// Base URL without trailing slash, or "" when unset.
    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .unwrap_or("")
    }
}

/// Capability token configuration.
///
/// The signing secret is kept apart from the Cloud API access token so that
/// rotating one does not invalidate the other.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// HMAC-SHA256 key for signed PDF URLs. Unset means no URL can be signed
    /// and the endpoint rejects every request.
    #[serde(default)]
    pub secret: Option<String>,
    /// Seconds a signed URL stays valid on either side of its timestamp (default: 600).
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            validity_secs: default_validity_secs(),
        }
    }
}

impl TokenConfig {
    /// Signing secret, or "" when unset.
    pub fn secret(&self) -> &str {
        self.secret.as_deref().unwrap_or("")
    }
}

/// How invoices are handed to WhatsApp.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Local WhatsApp Web automation via the companion service.
    #[default]
    Local,
    /// WhatsApp Cloud API with a signed download link.
    Cloud,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }
}

/// Delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub mode: DeliveryMode,
    /// Directory for rendered PDFs handed to the companion (default: system temp dir).
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Seconds before a handed-off PDF is deleted (default: 90).
    #[serde(default = "default_cleanup_delay_secs")]
    pub cleanup_delay_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            temp_dir: None,
            cleanup_delay_secs: default_cleanup_delay_secs(),
        }
    }
}

impl DeliveryConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Invoice source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the exported invoices (default: "invoices.json").
    #[serde(default = "default_invoices_path")]
    pub invoices_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            invoices_path: default_invoices_path(),
        }
    }
}

/// External PDF renderer.
///
/// Invoked as `<program> <args...> <template> <invoice id>`; the PDF is read
/// from stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_renderer_program(),
            args: Vec::new(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;
use std::path::PathBuf;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8069))
}

// =============================================================================
// Token Defaults
// =============================================================================

pub fn default_validity_secs() -> u64 {
    crate::security::token::DEFAULT_VALIDITY_SECS
}

// =============================================================================
// Cloud API Defaults
// =============================================================================

pub fn default_api_version() -> String {
    "v18.0".to_string()
}

pub fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

pub fn default_cloud_timeout_secs() -> u64 {
    30
}

pub fn default_caption() -> String {
    "Please find your invoice attached.".to_string()
}

// =============================================================================
// Companion Defaults
// =============================================================================

pub fn default_service_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

pub fn default_companion_dir() -> PathBuf {
    PathBuf::from("whatsapp-automation")
}

pub fn default_companion_entry() -> String {
    "server.js".to_string()
}

pub fn default_companion_program() -> String {
    "node".to_string()
}

pub fn default_health_timeout_secs() -> u64 {
    5
}

pub fn default_settle_secs() -> u64 {
    3
}

pub fn default_ready_timeout_secs() -> u64 {
    45
}

pub fn default_poll_interval_secs() -> u64 {
    2
}

pub fn default_send_timeout_secs() -> u64 {
    180
}

// =============================================================================
// Delivery / Store / Renderer Defaults
// =============================================================================

pub fn default_cleanup_delay_secs() -> u64 {
    90
}

pub fn default_invoices_path() -> PathBuf {
    PathBuf::from("invoices.json")
}

pub fn default_renderer_program() -> String {
    "render-invoice".to_string()
}

pub fn default_render_timeout_secs() -> u64 {
    120
}

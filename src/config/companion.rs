//! Local WhatsApp Web companion service configuration.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

/// Where the companion lives and how patiently to wait for it.
///
/// The supervisor launches `<program> <entry>` inside `working_dir` when
/// `<service_url>/health` does not answer.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanionConfig {
    /// Base URL of the companion (default: http://127.0.0.1:3000).
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_companion_dir")]
    pub working_dir: PathBuf,
    #[serde(default = "default_companion_entry")]
    pub entry: String,
    #[serde(default = "default_companion_program")]
    pub program: String,
    /// Per-probe timeout for `/health` (default: 5).
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    /// Pause after launching before the first readiness probe (default: 3).
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    /// Upper bound on readiness polling (default: 45).
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Timeout for `/send-invoice`; the companion drives a real browser (default: 180).
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            working_dir: default_companion_dir(),
            entry: default_companion_entry(),
            program: default_companion_program(),
            health_timeout_secs: default_health_timeout_secs(),
            settle_secs: default_settle_secs(),
            ready_timeout_secs: default_ready_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl CompanionConfig {
    /// Service URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.service_url.trim().trim_end_matches('/')
    }

    pub fn entry_path(&self) -> PathBuf {
        self.working_dir.join(&self.entry)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Number of readiness probes after the settle delay.
    pub fn max_polls(&self) -> u64 {
        self.ready_timeout_secs / self.poll_interval_secs.max(1)
    }
}

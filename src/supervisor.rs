//! Best-effort supervision of the WhatsApp Web companion service.
//!
//! [`Supervisor::ensure_running`] probes `/health`, launches the companion if
//! nothing answers, then polls until it reports ready or the wait budget runs
//! out. It never fails: if the companion does not come up, the following
//! `/send-invoice` call surfaces the real error.
//!
//! The companion answers `503` while its browser session is still starting
//! (for example while a QR code waits to be scanned).

use crate::config::CompanionConfig;
use reqwest::StatusCode;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How [`Supervisor::ensure_running`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The first probe succeeded; nothing was launched.
    AlreadyRunning,
    /// Launched and reported healthy.
    Ready,
    /// Launched, but never reported healthy (timeout or unexpected status).
    GaveUp,
    /// Not running and could not be launched.
    Unavailable,
}

/// Result of one `/health` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Healthy,
    Starting,
    Unexpected(StatusCode),
    Unreachable,
}

pub struct Supervisor {
    config: CompanionConfig,
    http_client: reqwest::Client,
}

impl Supervisor {
    pub fn new(config: CompanionConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.health_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url())
    }

    async fn probe(&self) -> Probe {
        match self.http_client.get(self.health_url()).send().await {
            Ok(resp) if resp.status().is_success() => Probe::Healthy,
            Ok(resp) if resp.status() == StatusCode::SERVICE_UNAVAILABLE => Probe::Starting,
            Ok(resp) => Probe::Unexpected(resp.status()),
            Err(e) => {
                debug!(error = %e, "Companion health probe failed");
                Probe::Unreachable
            }
        }
    }

    /// Make the companion reachable if possible. Advisory only.
    pub async fn ensure_running(&self) -> Readiness {
        if self.probe().await == Probe::Healthy {
            debug!(url = %self.config.base_url(), "Companion already running");
            return Readiness::AlreadyRunning;
        }

        if !self.launch() {
            return Readiness::Unavailable;
        }

        tokio::time::sleep(self.config.settle_delay()).await;
        for attempt in 1..=self.config.max_polls() {
            match self.probe().await {
                Probe::Healthy => {
                    info!(attempt, "Companion ready");
                    return Readiness::Ready;
                }
                Probe::Starting | Probe::Unreachable => {
                    tokio::time::sleep(self.config.poll_interval()).await;
                }
                Probe::Unexpected(status) => {
                    warn!(status = %status, "Companion health returned unexpected status");
                    return Readiness::GaveUp;
                }
            }
        }

        warn!(
            timeout_secs = self.config.ready_timeout_secs,
            "Companion did not report ready in time"
        );
        Readiness::GaveUp
    }

    /// Start the companion as a detached process. Returns whether it started.
    fn launch(&self) -> bool {
        let entry = self.config.entry_path();
        if !entry.is_file() {
            warn!(
                path = %entry.display(),
                "Companion not found; WhatsApp send will fail until it is started manually"
            );
            return false;
        }

        let spawned = Command::new(&self.config.program)
            .arg(&self.config.entry)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match spawned {
            // Dropping the handle leaves the process running on its own
            Ok(child) => {
                info!(
                    pid = child.id(),
                    dir = %self.config.working_dir.display(),
                    "Companion started"
                );
                crate::metrics::record_companion_launch();
                true
            }
            Err(e) => {
                warn!(error = %e, program = %self.config.program, "Could not start companion");
                false
            }
        }
    }
}

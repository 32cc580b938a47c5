//! PDF rendering, delegated to the host application's report engine.
//!
//! [`CommandRenderer`] runs an external program and reads the PDF from its
//! stdout. Whatever the program prints on stderr is re-emitted as warnings
//! under [`RENDER_TARGET`], which is where the scoped mute in the send path
//! applies.

use super::{Invoice, ReportTemplate};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Log target for diagnostics coming out of the renderer.
pub const RENDER_TARGET: &str = "invoice_whatsapp::render";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("renderer exited with {0}")]
    Failed(std::process::ExitStatus),
    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),
    #[error("renderer produced no output")]
    Empty,
}

#[async_trait]
pub trait InvoiceRenderer: Send + Sync {
    /// Render `invoice` with `template` into PDF bytes.
    async fn render(
        &self,
        invoice: &Invoice,
        template: ReportTemplate,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Renders by running `<program> <args...> <template> <invoice id>`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &crate::config::RendererConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl InvoiceRenderer for CommandRenderer {
    async fn render(
        &self,
        invoice: &Invoice,
        template: ReportTemplate,
    ) -> Result<Vec<u8>, RenderError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(template.as_str())
            .arg(invoice.id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| RenderError::Timeout(self.timeout))?
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            tracing::warn!(target: RENDER_TARGET, "{}", line);
        }

        if !output.status.success() {
            return Err(RenderError::Failed(output.status));
        }
        if output.stdout.is_empty() {
            return Err(RenderError::Empty);
        }

        tracing::debug!(
            invoice_id = invoice.id,
            template = template.as_str(),
            bytes = output.stdout.len(),
            "Invoice rendered"
        );
        Ok(output.stdout)
    }
}

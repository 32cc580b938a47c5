//! invoice-whatsapp - command line entry point.
//!
//! `serve` runs the public PDF endpoint; `send`, `sign-url`, and `render`
//! are the operator actions.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use invoice_whatsapp::actions::InvoiceSender;
use invoice_whatsapp::config::{Config, DeliveryMode, validation};
use invoice_whatsapp::http::{self, PdfService};
use invoice_whatsapp::invoice::{CommandRenderer, InvoiceRenderer, InvoiceStore, JsonInvoiceStore};
use invoice_whatsapp::{metrics, telemetry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "invoice-whatsapp", version, about = "Send invoice PDFs over WhatsApp")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve signed invoice PDF downloads and metrics.
    Serve,
    /// Send an invoice to its customer over WhatsApp.
    Send {
        invoice_id: i64,
        /// Override the configured delivery mode.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Print a signed download URL for an invoice.
    SignUrl { invoice_id: i64 },
    /// Render an invoice PDF to a file.
    Render {
        invoice_id: i64,
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Local,
    Cloud,
}

impl From<ModeArg> for DeliveryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => DeliveryMode::Local,
            ModeArg::Cloud => DeliveryMode::Cloud,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let config = Config::load(&cli.config).map_err(|e| {
        error!(path = %cli.config.display(), error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!("Invalid configuration: {}", e);
        }
        anyhow::bail!("{} configuration error(s), see messages above", errors.len());
    }
    validation::warn_misconfiguration(&config);
    metrics::init();

    let store: Arc<dyn InvoiceStore> = Arc::new(
        JsonInvoiceStore::load(&config.store.invoices_path).with_context(|| {
            format!(
                "failed to load invoices from {}",
                config.store.invoices_path.display()
            )
        })?,
    );
    let renderer: Arc<dyn InvoiceRenderer> =
        Arc::new(CommandRenderer::from_config(&config.renderer));

    match cli.command {
        Command::Serve => {
            let service = Arc::new(PdfService {
                store,
                renderer,
                secret: config.token.secret().to_string(),
                validity_secs: config.token.validity_secs,
            });
            info!(
                listen = %config.server.listen,
                validity_secs = config.token.validity_secs,
                "Starting invoice-whatsapp"
            );
            http::run_http_server(config.server.listen, service).await?;
        }
        Command::Send { invoice_id, mode } => {
            let mode = mode.map(DeliveryMode::from).unwrap_or(config.delivery.mode);
            info!(invoice_id, mode = mode.as_str(), "Sending invoice");
            let cleanup_delay_secs = config.delivery.cleanup_delay_secs;
            let sender = InvoiceSender::new(config, store, renderer);
            let result = sender.send_with(invoice_id, mode).await;
            let pending = sender.pending_cleanups();
            if pending > 0 {
                info!(
                    pending,
                    cleanup_delay_secs,
                    "Waiting to remove temporary invoice PDF"
                );
                sender.wait_for_cleanup().await;
            }
            let receipt = result?;
            println!("{}", receipt);
            if let Some(chat_url) = receipt.chat_url {
                println!("{}", chat_url);
            }
        }
        Command::SignUrl { invoice_id } => {
            let sender = InvoiceSender::new(config, store, renderer);
            println!("{}", sender.signed_url(invoice_id)?);
        }
        Command::Render { invoice_id, output } => {
            let sender = InvoiceSender::new(config, store, renderer);
            let (invoice, pdf) = sender.download_pdf(invoice_id).await?;
            std::fs::write(&output, &pdf)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(
                invoice = %invoice.display_name(),
                path = %output.display(),
                bytes = pdf.len(),
                "Invoice PDF written"
            );
        }
    }

    Ok(())
}

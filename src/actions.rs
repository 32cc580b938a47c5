//! Operator-triggered invoice actions.
//!
//! - [`InvoiceSender::send_via_local_service`]: render, write a temp file,
//!   hand it to the WhatsApp Web companion, delete the file later.
//! - [`InvoiceSender::send_via_cloud_api`]: sign a download link, post it to
//!   the Cloud API, return a WhatsApp Web chat link for the customer.
//! - [`InvoiceSender::download_pdf`]: render only.
//!
//! Every failure surfaces as one [`SendError`] with text meant for the
//! operator. Nothing is retried.

use crate::cleanup;
use crate::config::{Config, DeliveryMode};
use crate::error::{DeliveryResult, SendError};
use crate::invoice::{Invoice, InvoiceRenderer, InvoiceStore, RENDER_TARGET};
use crate::notify::{
    CloudApiNotifier, DeliveryJob, Document, LocalServiceNotifier, Notifier, normalize_phone,
};
use crate::security::signed_url;
use crate::supervisor::Supervisor;
use crate::telemetry::{self, DeliveryTimer};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

/// Warnings wkhtmltopdf prints for every PDF even when output is fine: the
/// message names wkhtmltopdf and one of the network failures.
const RENDER_NOISE_SOURCE: &[&str] = &["wkhtmltopdf"];
const RENDER_NOISE: &[&str] = &["UnknownContentError", "network error"];

const WHATSAPP_WEB_SEND: &str = "https://web.whatsapp.com/send";

const CLOUD_SETUP_HELP: &str = "A PDF attachment needs the WhatsApp Cloud API and a public download link.\n\n\
    1. Set [cloud].access_token to your WhatsApp Cloud API token\n\
    2. Set [cloud].phone_number_id to your Phone Number ID\n\
    3. Set [token].secret to a long random string\n\n\
    [server].public_base_url must be the public HTTPS address of this service \
    (e.g. https://erp.example.com), not localhost: WhatsApp downloads the PDF from it.";

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub invoice_id: i64,
    /// Customer number as entered on the partner.
    pub recipient: String,
    /// WhatsApp Web chat to open after a Cloud API send.
    pub chat_url: Option<String>,
}

impl fmt::Display for SendReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invoice sent on WhatsApp to {}", self.recipient)
    }
}

pub struct InvoiceSender {
    config: Config,
    store: Arc<dyn InvoiceStore>,
    renderer: Arc<dyn InvoiceRenderer>,
    supervisor: Supervisor,
    local: LocalServiceNotifier,
    cloud: CloudApiNotifier,
    /// Scheduled temp-file removals; they die with the runtime unless awaited.
    cleanups: Mutex<Vec<JoinHandle<()>>>,
}

impl InvoiceSender {
    pub fn new(
        config: Config,
        store: Arc<dyn InvoiceStore>,
        renderer: Arc<dyn InvoiceRenderer>,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(config.companion.clone()),
            local: LocalServiceNotifier::new(&config.companion),
            cloud: CloudApiNotifier::new(config.cloud.clone()),
            cleanups: Mutex::new(Vec::new()),
            config,
            store,
            renderer,
        }
    }

    /// Send with the configured delivery mode.
    pub async fn send(&self, id: i64) -> Result<SendReceipt, SendError> {
        self.send_with(id, self.config.delivery.mode).await
    }

    pub async fn send_with(&self, id: i64, mode: DeliveryMode) -> Result<SendReceipt, SendError> {
        match mode {
            DeliveryMode::Local => self.send_via_local_service(id).await,
            DeliveryMode::Cloud => self.send_via_cloud_api(id).await,
        }
    }

    /// Render the invoice PDF without sending it.
    pub async fn download_pdf(&self, id: i64) -> Result<(Invoice, Vec<u8>), SendError> {
        let invoice = self.find(id).await?;
        let pdf = self.render_quietly(&invoice).await?;
        Ok((invoice, pdf))
    }

    /// Signed download link for `id`, valid from now.
    pub fn signed_url(&self, id: i64) -> Result<String, SendError> {
        signed_url::build(
            self.config.server.public_base_url(),
            self.config.token.secret(),
            id,
        )
        .ok_or_else(|| SendError::Configuration(CLOUD_SETUP_HELP.to_string()))
    }

    pub async fn send_via_local_service(&self, id: i64) -> Result<SendReceipt, SendError> {
        async {
            let invoice = self.find(id).await?;
            let (phone, recipient) = recipient(&invoice)?;

            let readiness = self.supervisor.ensure_running().await;
            info!(readiness = ?readiness, "Companion check finished");

            let pdf = self.render_quietly(&invoice).await?;
            let path = self
                .config
                .delivery
                .temp_dir()
                .join(format!("invoice_{}.pdf", invoice.id));
            tokio::fs::write(&path, &pdf).await?;

            let job = DeliveryJob {
                phone,
                document: Document::File(path.clone()),
                caption: format!(
                    "Please find your invoice {} attached.",
                    invoice.display_name()
                ),
            };
            let result = deliver(&self.local, &job).await;
            let removal = cleanup::schedule_removal(
                path,
                Duration::from_secs(self.config.delivery.cleanup_delay_secs),
            );
            self.cleanups.lock().push(removal);
            result?;

            let receipt = SendReceipt {
                invoice_id: invoice.id,
                recipient,
                chat_url: None,
            };
            info!(recipient = %receipt.recipient, "Invoice sent via companion");
            Ok::<_, SendError>(receipt)
        }
        .instrument(telemetry::spans::send("local", id))
        .await
    }

    pub async fn send_via_cloud_api(&self, id: i64) -> Result<SendReceipt, SendError> {
        async {
            let invoice = self.find(id).await?;
            let (phone, recipient) = recipient(&invoice)?;

            let cloud = &self.config.cloud;
            if cloud.access_token().is_empty() || cloud.messages_url().is_none() {
                return Err(SendError::Configuration(CLOUD_SETUP_HELP.to_string()));
            }
            let pdf_url = self.signed_url(invoice.id)?;
            if signed_url::is_private_base_url(self.config.server.public_base_url()) {
                warn!(
                    base_url = self.config.server.public_base_url(),
                    "Signed URL points at a private address; WhatsApp will not be able to fetch it"
                );
            }

            let caption = cloud.caption.clone();
            let job = DeliveryJob {
                phone: phone.clone(),
                document: Document::Link(pdf_url),
                caption: caption.clone(),
            };
            deliver(&self.cloud, &job)
                .await
                .map_err(SendError::CloudDelivery)?;

            let chat_url = reqwest::Url::parse_with_params(
                WHATSAPP_WEB_SEND,
                &[("phone", normalize_phone(&phone)), ("text", caption)],
            )
            .map_err(|e| SendError::Configuration(e.to_string()))?;

            let receipt = SendReceipt {
                invoice_id: invoice.id,
                recipient,
                chat_url: Some(chat_url.to_string()),
            };
            info!(recipient = %receipt.recipient, "Invoice sent via Cloud API");
            Ok::<_, SendError>(receipt)
        }
        .instrument(telemetry::spans::send("cloud", id))
        .await
    }

    /// Number of temp-file removals not yet finished.
    pub fn pending_cleanups(&self) -> usize {
        let mut cleanups = self.cleanups.lock();
        cleanups.retain(|handle| !handle.is_finished());
        cleanups.len()
    }

    /// Wait for every scheduled temp-file removal to run.
    ///
    /// A short-lived process must call this before its runtime shuts down,
    /// otherwise the removals are cancelled and the PDFs stay on disk.
    pub async fn wait_for_cleanup(&self) {
        let handles = std::mem::take(&mut *self.cleanups.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                debug!(error = %e, "Temp file removal task did not complete");
            }
        }
    }

    async fn find(&self, id: i64) -> Result<Invoice, SendError> {
        self.store.find(id).await?.ok_or(SendError::NotFound(id))
    }

    async fn render_quietly(&self, invoice: &Invoice) -> Result<Vec<u8>, SendError> {
        let _mute = telemetry::mute(RENDER_TARGET, RENDER_NOISE_SOURCE, RENDER_NOISE);
        Ok(self
            .renderer
            .render(invoice, invoice.report_template())
            .await?)
    }
}

/// Dialable phone and display contact for the invoice's customer.
fn recipient(invoice: &Invoice) -> Result<(String, String), SendError> {
    let Some(partner) = invoice.partner.as_ref() else {
        return Err(SendError::Validation(
            "Add number for this customer.".to_string(),
        ));
    };
    let Some(phone) = invoice.partner_phone() else {
        return Err(SendError::Validation(
            "Add number for this customer.".to_string(),
        ));
    };
    if !invoice.is_customer_invoice() {
        return Err(SendError::Validation(
            "Only customer invoices can be sent via WhatsApp.".to_string(),
        ));
    }
    let display = partner
        .contact_number()
        .map(str::to_string)
        .unwrap_or_else(|| phone.clone());
    Ok((phone, display))
}

async fn deliver(notifier: &dyn Notifier, job: &DeliveryJob) -> DeliveryResult {
    let timer = DeliveryTimer::start(notifier.strategy());
    let result = notifier.deliver(job).await;
    timer.finish(match &result {
        Ok(()) => "ok",
        Err(e) => e.error_code(),
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{InvoiceKind, InvoiceState, Partner};

    fn invoice() -> Invoice {
        Invoice {
            id: 9,
            name: Some("INV/9".into()),
            kind: InvoiceKind::OutInvoice,
            state: InvoiceState::Posted,
            partner: Some(Partner {
                name: "Acme".into(),
                phone: None,
                mobile: Some("+91 98765 43210".into()),
            }),
        }
    }

    #[test]
    fn recipient_uses_cleaned_phone_and_raw_contact() {
        let (phone, display) = recipient(&invoice()).unwrap();
        assert_eq!(phone, "+919876543210");
        assert_eq!(display, "+91 98765 43210");
    }

    #[test]
    fn recipient_requires_partner_and_phone() {
        let mut inv = invoice();
        inv.partner.as_mut().unwrap().mobile = None;
        let err = recipient(&inv).unwrap_err();
        assert_eq!(err.to_string(), "Add number for this customer.");

        inv.partner = None;
        assert!(matches!(recipient(&inv), Err(SendError::Validation(_))));
    }

    #[test]
    fn recipient_rejects_vendor_bills() {
        let mut inv = invoice();
        inv.kind = InvoiceKind::InInvoice;
        let err = recipient(&inv).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only customer invoices can be sent via WhatsApp."
        );
    }

    #[test]
    fn receipt_display() {
        let receipt = SendReceipt {
            invoice_id: 9,
            recipient: "+91 98765 43210".into(),
            chat_url: None,
        };
        assert_eq!(receipt.to_string(), "Invoice sent on WhatsApp to +91 98765 43210");
    }
}

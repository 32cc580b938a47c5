//! The renderer's stderr noise is hidden while a send renders, and only then.

use async_trait::async_trait;
use invoice_whatsapp::actions::InvoiceSender;
use invoice_whatsapp::config::Config;
use invoice_whatsapp::invoice::{
    Invoice, InvoiceKind, InvoiceRenderer, InvoiceState, JsonInvoiceStore, Partner, RENDER_TARGET,
    RenderError, ReportTemplate,
};
use invoice_whatsapp::telemetry::MuteLayer;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Renderer that logs like a real report engine does.
struct NoisyRenderer;

#[async_trait]
impl InvoiceRenderer for NoisyRenderer {
    async fn render(
        &self,
        _invoice: &Invoice,
        _template: ReportTemplate,
    ) -> Result<Vec<u8>, RenderError> {
        tracing::warn!(target: RENDER_TARGET, "wkhtmltopdf: Exit with code 1 due to network error: UnknownContentError");
        tracing::warn!(target: RENDER_TARGET, "Font cache rebuilt");
        tracing::warn!(target: RENDER_TARGET, "Asset server unreachable: network error");
        Ok(b"%PDF".to_vec())
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

/// Collects the messages of every event that reaches it.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<String>>>);

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.0.lock().push(visitor.0);
    }
}

fn store() -> Arc<JsonInvoiceStore> {
    Arc::new(JsonInvoiceStore::from_invoices([Invoice {
        id: 7,
        name: Some("INV/7".into()),
        kind: InvoiceKind::OutInvoice,
        state: InvoiceState::Posted,
        partner: Some(Partner {
            name: "Acme".into(),
            phone: Some("+15550100123".into()),
            mobile: None,
        }),
    }]))
}

#[test]
fn render_noise_is_muted_only_during_render() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(MuteLayer)
        .with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let sender = InvoiceSender::new(Config::default(), store(), Arc::new(NoisyRenderer));
            sender.download_pdf(7).await.unwrap();
        });
        tracing::warn!(target: RENDER_TARGET, "wkhtmltopdf: Exit with code 1 due to network error: UnknownContentError");
    });

    let messages = capture.0.lock().clone();
    let noise = messages
        .iter()
        .filter(|m| m.contains("UnknownContentError"))
        .count();
    assert_eq!(noise, 1, "only the post-render warning should get through: {messages:?}");
    assert!(messages.iter().any(|m| m == "Font cache rebuilt"));
    // Network errors that do not come from wkhtmltopdf stay visible
    assert!(
        messages
            .iter()
            .any(|m| m == "Asset server unreachable: network error")
    );
}

//! Invoice fixtures, a recording renderer, and a PDF server launcher.

#![allow(dead_code)]

use async_trait::async_trait;
use invoice_whatsapp::http::{PdfService, router};
use invoice_whatsapp::invoice::{
    Invoice, InvoiceKind, InvoiceRenderer, InvoiceState, JsonInvoiceStore, Partner, RenderError,
    ReportTemplate,
};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake invoice";

/// 1: posted customer invoice, 2: draft customer invoice, 3: vendor bill,
/// 4: customer invoice without a phone, 5: customer invoice without partner.
pub fn sample_invoices() -> Vec<Invoice> {
    let partner = |phone: Option<&str>| Partner {
        name: "Acme Traders".to_string(),
        phone: phone.map(str::to_string),
        mobile: None,
    };
    vec![
        Invoice {
            id: 1,
            name: Some("INV/2024/0001".into()),
            kind: InvoiceKind::OutInvoice,
            state: InvoiceState::Posted,
            partner: Some(partner(Some("+91 98765-43210"))),
        },
        Invoice {
            id: 2,
            name: None,
            kind: InvoiceKind::OutInvoice,
            state: InvoiceState::Draft,
            partner: Some(partner(Some("+91 98765-43210"))),
        },
        Invoice {
            id: 3,
            name: Some("BILL/2024/0003".into()),
            kind: InvoiceKind::InInvoice,
            state: InvoiceState::Posted,
            partner: Some(partner(Some("+91 98765-43210"))),
        },
        Invoice {
            id: 4,
            name: Some("INV/2024/0004".into()),
            kind: InvoiceKind::OutInvoice,
            state: InvoiceState::Posted,
            partner: Some(partner(None)),
        },
        Invoice {
            id: 5,
            name: Some("INV/2024/0005".into()),
            kind: InvoiceKind::OutInvoice,
            state: InvoiceState::Posted,
            partner: None,
        },
    ]
}

pub fn sample_store() -> Arc<JsonInvoiceStore> {
    Arc::new(JsonInvoiceStore::from_invoices(sample_invoices()))
}

/// Returns [`FAKE_PDF`] and remembers which template was asked for.
#[derive(Default)]
pub struct StaticRenderer {
    calls: Mutex<Vec<(i64, ReportTemplate)>>,
    fail: bool,
}

impl StaticRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(i64, ReportTemplate)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl InvoiceRenderer for StaticRenderer {
    async fn render(
        &self,
        invoice: &Invoice,
        template: ReportTemplate,
    ) -> Result<Vec<u8>, RenderError> {
        self.calls.lock().push((invoice.id, template));
        if self.fail {
            return Err(RenderError::Empty);
        }
        Ok(FAKE_PDF.to_vec())
    }
}

/// Serve the PDF endpoint on a loopback port.
pub async fn spawn_pdf_server(secret: &str, renderer: Arc<StaticRenderer>) -> SocketAddr {
    let service = Arc::new(PdfService {
        store: sample_store(),
        renderer,
        secret: secret.to_string(),
        validity_secs: 600,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind PDF server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(service)).await;
    });
    addr
}

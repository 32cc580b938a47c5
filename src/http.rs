//! Public HTTP endpoint for signed invoice PDF downloads.
//!
//! Serves `GET /invoice_pdf?id=&ts=&token=` and `GET /metrics`.
//!
//! Every validation failure answers the same `404`, whether the parameters
//! were malformed, the token expired or was forged, no secret is configured,
//! or the invoice does not exist. The handler has no side effects; the same
//! valid link can be fetched repeatedly until it expires.

use crate::invoice::{InvoiceRenderer, InvoiceStore};
use crate::security::{signed_url, token};
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Instrument, debug, error};

/// Shared state for the PDF endpoint.
pub struct PdfService {
    pub store: Arc<dyn InvoiceStore>,
    pub renderer: Arc<dyn InvoiceRenderer>,
    /// HMAC secret; empty disables the endpoint.
    pub secret: String,
    pub validity_secs: u64,
}

/// Raw query parameters. Parsed by hand so that bad input maps to 404.
#[derive(Debug, Default, Deserialize)]
pub struct PdfQuery {
    id: Option<String>,
    ts: Option<String>,
    token: Option<String>,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Handler for GET /invoice_pdf.
async fn invoice_pdf(
    State(service): State<Arc<PdfService>>,
    Query(query): Query<PdfQuery>,
) -> Response {
    let span = crate::telemetry::spans::pdf_request(query.id.as_deref().unwrap_or("-"));
    serve_pdf(&service, query).instrument(span).await
}

async fn serve_pdf(service: &PdfService, query: PdfQuery) -> Response {
    let (Some(id), Some(ts), Some(candidate)) = (
        query.id.as_deref().and_then(|v| v.trim().parse::<i64>().ok()),
        query.ts.as_deref().and_then(|v| v.trim().parse::<i64>().ok()),
        query.token.as_deref().filter(|t| !t.is_empty()),
    ) else {
        debug!("Malformed PDF request");
        crate::metrics::record_pdf_request("malformed");
        return not_found();
    };

    let now = chrono::Utc::now().timestamp();
    if let Err(reason) = token::check(
        &service.secret,
        id,
        ts,
        candidate,
        now,
        service.validity_secs,
    ) {
        debug!(reason = reason.as_str(), "PDF token rejected");
        crate::metrics::record_pdf_request(reason.as_str());
        return not_found();
    }

    let invoice = match service.store.find(id).await {
        Ok(Some(invoice)) if invoice.is_customer_invoice() => invoice,
        Ok(_) => {
            debug!("Invoice missing or not servable");
            crate::metrics::record_pdf_request("not_found");
            return not_found();
        }
        Err(e) => {
            error!(error = %e, "Invoice lookup failed");
            crate::metrics::record_pdf_request("error");
            return not_found();
        }
    };

    let pdf = match service
        .renderer
        .render(&invoice, invoice.report_template())
        .await
    {
        Ok(pdf) => pdf,
        Err(e) => {
            error!(error = %e, "Invoice rendering failed");
            crate::metrics::record_pdf_request("error");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    crate::metrics::record_pdf_request("served");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", invoice.attachment_filename()),
            ),
        ],
        pdf,
    )
        .into_response()
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Build the router for the PDF endpoint and metrics.
pub fn router(service: Arc<PdfService>) -> Router {
    Router::new()
        .route(signed_url::PDF_PATH, get(invoice_pdf))
        .route("/metrics", get(metrics_handler))
        .with_state(service)
}

/// Run the HTTP server until it fails.
///
/// Binds to `addr` and serves the PDF endpoint and `/metrics`.
pub async fn run_http_server(addr: SocketAddr, service: Arc<PdfService>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Invoice PDF server listening on {}", addr);
    axum::serve(listener, router(service)).await
}

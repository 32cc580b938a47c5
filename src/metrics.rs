//! Prometheus metrics for invoice delivery.
//!
//! Exposed on the same HTTP listener as the PDF endpoint under `/metrics`.
//!
//! - `invoice_pdf_requests_total{outcome}` - PDF endpoint requests by outcome
//! - `invoice_deliveries_total{strategy,outcome}` - delivery attempts
//! - `invoice_delivery_duration_seconds{strategy}` - outbound call latency
//! - `invoice_companion_launches_total` - companion service launches

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// PDF endpoint requests by outcome (served, rejected, not_found, error).
pub static PDF_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Delivery attempts by strategy and outcome (ok or an error code).
pub static DELIVERIES: OnceLock<IntCounterVec> = OnceLock::new();

/// Companion service processes launched by the supervisor.
pub static COMPANION_LAUNCHES: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Outbound delivery call latency by strategy.
pub static DELIVERY_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers anything.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                let m = $init.expect(concat!(stringify!($metric), " creation failed"));
                if let Err(e) = r.register(Box::new(m.clone())) {
                    tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                }
                let _ = $metric.set(m);
            }
        };
    }

    register!(PDF_REQUESTS, IntCounterVec::new(Opts::new("invoice_pdf_requests_total", "Invoice PDF endpoint requests by outcome"), &["outcome"]));
    register!(DELIVERIES, IntCounterVec::new(Opts::new("invoice_deliveries_total", "Invoice delivery attempts"), &["strategy", "outcome"]));
    register!(COMPANION_LAUNCHES, IntCounter::new("invoice_companion_launches_total", "Companion service launches"));
    register!(DELIVERY_LATENCY, HistogramVec::new(
        HistogramOpts::new("invoice_delivery_duration_seconds", "Outbound delivery call latency")
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 180.0]),
        &["strategy"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Update helpers (no-ops until init() has run)
// ============================================================================

/// Record one PDF endpoint outcome.
#[inline]
pub fn record_pdf_request(outcome: &str) {
    if let Some(c) = PDF_REQUESTS.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

/// Record a finished delivery attempt with its latency.
#[inline]
pub fn record_delivery(strategy: &str, outcome: &str, duration_secs: f64) {
    if let Some(c) = DELIVERIES.get() {
        c.with_label_values(&[strategy, outcome]).inc();
    }
    if let Some(h) = DELIVERY_LATENCY.get() {
        h.with_label_values(&[strategy]).observe(duration_secs);
    }
}

#[inline]
pub fn record_companion_launch() {
    if let Some(c) = COMPANION_LAUNCHES.get() {
        c.inc();
    }
}

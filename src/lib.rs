//! invoice-whatsapp - deliver invoice PDFs over WhatsApp.
//!
//! Two delivery paths:
//! - a local WhatsApp Web companion service, started on demand and handed a
//!   rendered PDF file;
//! - the WhatsApp Cloud API, which downloads the PDF from this service
//!   through a signed, time-limited link served by [`http`].

pub mod actions;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod http;
pub mod invoice;
pub mod metrics;
pub mod notify;
pub mod security;
pub mod supervisor;
pub mod telemetry;

//! Integration test common infrastructure.
//!
//! Provides scripted HTTP peers standing in for the WhatsApp Web companion
//! and the Cloud API, plus invoice fixtures and a fake renderer.

pub mod fixtures;
pub mod peer;

#[allow(unused_imports)]
pub use fixtures::{FAKE_PDF, StaticRenderer, sample_store, spawn_pdf_server};
#[allow(unused_imports)]
pub use peer::{FakePeer, closed_port_url};

//! Capability tokens for public PDF links.
//!
//! - **Token**: HMAC-SHA256 over invoice id and issue time, verified in constant time
//! - **Signed URL**: fetchable `/invoice_pdf` link carrying id, timestamp, and token
//!
//! # Architecture
//!
//! ```text
//! send action ──► signed_url::build ──► token::sign
//!                                            │
//! GET /invoice_pdf ──► token::check ◄────────┘ (same secret)
//! ```

pub mod signed_url;
pub mod token;

pub use token::{TokenRejection, check, sign, verify};

//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, TokenConfig, ...)
//! - [`cloud`]: WhatsApp Cloud API credentials and endpoint (CloudConfig)
//! - [`companion`]: Local WhatsApp Web companion service (CompanionConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks

mod cloud;
mod companion;
mod defaults;
mod types;
pub mod validation;

pub use cloud::CloudConfig;
pub use companion::CompanionConfig;
pub use types::{
    Config, ConfigError, DeliveryConfig, DeliveryMode, RendererConfig, ServerConfig, StoreConfig,
    TokenConfig,
};

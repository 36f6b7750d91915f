//! Chatlock Core Library
//!
//! Shared functionality for Chatlock components:
//! - Configuration resolution and hierarchy
//! - Tracing/logging initialization
//! - Common error types

pub mod config;
pub mod error;
pub mod tracing_init;

pub use config::{Config, ExchangeConfig, LoggingConfig, SuiteConfig};
pub use error::{Error, Result};
pub use tracing_init::init_tracing;

//! Configuration resolution for Chatlock.
//!
//! Built-in defaults, optionally overlaid by a JSON settings file
//! (e.g. `~/.config/chatlock/settings.json`). Every section and field is
//! optional in the file; anything absent keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Complete Chatlock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub suite: SuiteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key-exchange parameter generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Bit width of generated prime moduli.
    pub prime_bits: u64,
    /// Miller-Rabin rounds for primality testing.
    pub primality_rounds: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            prime_bits: 512,
            primality_rounds: 40,
        }
    }
}

/// Default cipher suite selectors for message traffic.
///
/// Stored as names and resolved by the crypto layer so an unknown
/// selector is reported against the configured string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuiteConfig {
    pub algorithm: String,
    pub mode: String,
    pub padding: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            algorithm: "rc6".to_string(),
            mode: "cbc".to_string(),
            padding: "pkcs7".to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set (e.g. `"chatlock=info"`).
    pub default_filter: String,
    /// Emit structured JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "chatlock=info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist. Parse failures still surface as errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings that would weaken the key exchange outright.
    pub fn validate(&self) -> Result<()> {
        if self.exchange.prime_bits < 64 {
            return Err(Error::Config(format!(
                "exchange.prime_bits must be at least 64, got {}",
                self.exchange.prime_bits
            )));
        }
        if self.exchange.primality_rounds == 0 {
            return Err(Error::Config(
                "exchange.primality_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

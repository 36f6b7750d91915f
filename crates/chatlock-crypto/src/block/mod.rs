//! Block cipher capability trait and algorithm selection.
//!
//! Both ciphers bind their key at construction time, so a cipher instance
//! can never observe two different keys. The trait carries the remaining
//! capabilities: block size and the per-block transforms.

mod feistel64;
mod rc6;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use feistel64::Feistel64;
pub use rc6::Rc6;

use crate::error::CryptoError;

/// One keyed block cipher: a fixed block size plus invertible
/// single-block transforms.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes. Constant per algorithm.
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block, returning a new block of the same size.
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt exactly one block, returning a new block of the same size.
    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Supported block cipher algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// 64-bit-block, 256-bit-key, 16-round Feistel network.
    Feistel64,
    /// RC6-32/20/16: 128-bit block, 128-bit key, 20 rounds.
    Rc6,
}

impl Algorithm {
    /// Required key length in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            Self::Feistel64 => 32,
            Self::Rc6 => 16,
        }
    }

    /// Block length in bytes.
    pub const fn block_size(self) -> usize {
        match self {
            Self::Feistel64 => 8,
            Self::Rc6 => 16,
        }
    }

    /// Construct a keyed cipher instance for this algorithm.
    pub fn cipher(self, key: &[u8]) -> Result<Box<dyn BlockCipher>, CryptoError> {
        match self {
            Self::Feistel64 => Ok(Box::new(Feistel64::new(key)?)),
            Self::Rc6 => Ok(Box::new(Rc6::new(key)?)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "feistel64" => Ok(Self::Feistel64),
            "rc6" => Ok(Self::Rc6),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Check a single-block argument against the cipher's block size.
pub(crate) fn check_block(block: &[u8], expected: usize) -> Result<(), CryptoError> {
    if block.len() == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidBlockSize {
            expected,
            actual: block.len(),
        })
    }
}

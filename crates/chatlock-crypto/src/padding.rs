//! Byte-padding schemes for block-aligned encryption.
//!
//! Block modes that encrypt whole blocks need plaintext padded to a
//! multiple of the cipher block size; these schemes add and remove that
//! padding. Removal failures surface as the detail-free
//! [`CryptoError::InvalidPadding`] so callers cannot be used as a padding
//! oracle; specifics are traced at debug level only.

use std::str::FromStr;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::CryptoError;

/// Supported padding schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// PKCS#7: `n` bytes of value `n`, always 1..=block_size bytes added.
    Pkcs7,
    /// Zero fill to the next block boundary; nothing added when already
    /// aligned. Removal strips trailing zero bytes, which is lossy when
    /// the plaintext itself ends in zeros.
    Zeros,
    /// ANSI X9.23: zero fill with the pad length in the final byte.
    AnsiX923,
    /// ISO 10126: random fill with the pad length in the final byte.
    Iso10126,
    /// No padding; input must already be block-aligned.
    None,
}

impl Padding {
    /// Pad `data` out to a multiple of `block_size`.
    pub fn pad(self, data: &[u8], block_size: usize) -> Vec<u8> {
        let mut padded = data.to_vec();
        match self {
            Self::Pkcs7 => {
                let n = block_size - data.len() % block_size;
                padded.resize(data.len() + n, n as u8);
            }
            Self::Zeros => {
                let remainder = data.len() % block_size;
                if remainder != 0 {
                    padded.resize(data.len() + block_size - remainder, 0);
                }
            }
            Self::AnsiX923 => {
                let n = block_size - data.len() % block_size;
                padded.resize(data.len() + n - 1, 0);
                padded.push(n as u8);
            }
            Self::Iso10126 => {
                let n = block_size - data.len() % block_size;
                let mut fill = vec![0u8; n - 1];
                OsRng.fill_bytes(&mut fill);
                padded.extend_from_slice(&fill);
                padded.push(n as u8);
            }
            Self::None => {}
        }
        padded
    }

    /// Remove the padding added by [`Padding::pad`].
    pub fn unpad(self, data: &[u8], block_size: usize) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Pkcs7 => {
                let n = Self::trailing_length(data, block_size)?;
                let (body, tail) = data.split_at(data.len() - n);
                let mut diff = 0u8;
                for &byte in tail {
                    diff |= byte ^ n as u8;
                }
                if bool::from(diff.ct_eq(&0)) {
                    Ok(body.to_vec())
                } else {
                    debug!(pad_len = n, "pkcs7 pad bytes do not all match length");
                    Err(CryptoError::InvalidPadding)
                }
            }
            Self::Zeros => {
                let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                Ok(data[..end].to_vec())
            }
            Self::AnsiX923 => {
                let n = Self::trailing_length(data, block_size)?;
                let (body, tail) = data.split_at(data.len() - n);
                if tail[..n - 1].iter().any(|&b| b != 0) {
                    debug!(pad_len = n, "ansi x9.23 fill bytes are not zero");
                    return Err(CryptoError::InvalidPadding);
                }
                Ok(body.to_vec())
            }
            Self::Iso10126 => {
                let n = Self::trailing_length(data, block_size)?;
                Ok(data[..data.len() - n].to_vec())
            }
            Self::None => Ok(data.to_vec()),
        }
    }

    /// Read and bounds-check the pad length encoded in the final byte.
    ///
    /// Rejects lengths of zero, beyond the block size, or beyond the
    /// buffer itself (the last would otherwise index out of range).
    fn trailing_length(data: &[u8], block_size: usize) -> Result<usize, CryptoError> {
        let Some(&last) = data.last() else {
            debug!("cannot unpad an empty buffer");
            return Err(CryptoError::InvalidPadding);
        };
        let n = usize::from(last);
        if n == 0 || n > block_size || n > data.len() {
            debug!(
                pad_len = n,
                data_len = data.len(),
                "pad length byte out of range"
            );
            return Err(CryptoError::InvalidPadding);
        }
        Ok(n)
    }
}

impl FromStr for Padding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pkcs7" => Ok(Self::Pkcs7),
            "zeros" => Ok(Self::Zeros),
            "ansix923" => Ok(Self::AnsiX923),
            "iso10126" => Ok(Self::Iso10126),
            "none" => Ok(Self::None),
            _ => Err(CryptoError::UnsupportedPadding(s.to_string())),
        }
    }
}

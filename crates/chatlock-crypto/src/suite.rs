//! Cipher suite selection and the buffer encrypt/decrypt surface.
//!
//! A [`CipherSuite`] names one algorithm, one mode, and one padding
//! scheme. Each call binds a fresh cipher instance to the supplied key,
//! so no chaining state ever leaks between messages; re-encrypting with
//! the same suite and IV is the caller's mistake to avoid.

use serde::{Deserialize, Serialize};

use crate::block::Algorithm;
use crate::error::CryptoError;
use crate::mode::{Mode, block_modes, stream_modes};
use crate::padding::Padding;

/// A complete symmetric-encryption configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    pub algorithm: Algorithm,
    pub mode: Mode,
    pub padding: Padding,
}

impl CipherSuite {
    /// Assemble a suite from its parts.
    pub const fn new(algorithm: Algorithm, mode: Mode, padding: Padding) -> Self {
        Self {
            algorithm,
            mode,
            padding,
        }
    }

    /// Parse a suite from selector names, e.g. `("rc6", "cbc", "pkcs7")`.
    ///
    /// Unknown selectors surface as the matching `Unsupported*` error.
    pub fn from_names(algorithm: &str, mode: &str, padding: &str) -> Result<Self, CryptoError> {
        Ok(Self {
            algorithm: algorithm.parse()?,
            mode: mode.parse()?,
            padding: padding.parse()?,
        })
    }

    /// Encrypt a whole plaintext buffer.
    ///
    /// A missing IV defaults to an all-zero block; ECB ignores the IV
    /// entirely. Stream modes ignore the padding selection since they
    /// never pad.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.algorithm.cipher(key)?;
        let block_size = cipher.block_size();
        let iv = self.resolve_iv(iv, block_size)?;

        match self.mode {
            Mode::Ecb => {
                let padded = self.padding.pad(plaintext, block_size);
                block_modes::ecb_encrypt(cipher.as_ref(), &padded)
            }
            Mode::Cbc => {
                let padded = self.padding.pad(plaintext, block_size);
                block_modes::cbc_encrypt(cipher.as_ref(), &iv, &padded)
            }
            Mode::Pcbc => {
                let padded = self.padding.pad(plaintext, block_size);
                block_modes::pcbc_encrypt(cipher.as_ref(), &iv, &padded)
            }
            Mode::RandomDelta => {
                let padded = self.padding.pad(plaintext, block_size);
                block_modes::random_delta_encrypt(cipher.as_ref(), &iv, &padded)
            }
            Mode::Cfb => stream_modes::cfb_encrypt(cipher.as_ref(), &iv, plaintext),
            Mode::Ofb => stream_modes::ofb_apply(cipher.as_ref(), &iv, plaintext),
            Mode::Ctr => stream_modes::ctr_apply(cipher.as_ref(), &iv, plaintext),
        }
    }

    /// Decrypt a whole ciphertext buffer; the inverse of
    /// [`CipherSuite::encrypt`] under the same key and IV.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.algorithm.cipher(key)?;
        let block_size = cipher.block_size();
        let iv = self.resolve_iv(iv, block_size)?;

        match self.mode {
            Mode::Ecb => {
                let padded = block_modes::ecb_decrypt(cipher.as_ref(), ciphertext)?;
                self.padding.unpad(&padded, block_size)
            }
            Mode::Cbc => {
                let padded = block_modes::cbc_decrypt(cipher.as_ref(), &iv, ciphertext)?;
                self.padding.unpad(&padded, block_size)
            }
            Mode::Pcbc => {
                let padded = block_modes::pcbc_decrypt(cipher.as_ref(), &iv, ciphertext)?;
                self.padding.unpad(&padded, block_size)
            }
            Mode::RandomDelta => {
                let padded = block_modes::random_delta_decrypt(cipher.as_ref(), &iv, ciphertext)?;
                self.padding.unpad(&padded, block_size)
            }
            Mode::Cfb => stream_modes::cfb_decrypt(cipher.as_ref(), &iv, ciphertext),
            Mode::Ofb => stream_modes::ofb_apply(cipher.as_ref(), &iv, ciphertext),
            Mode::Ctr => stream_modes::ctr_apply(cipher.as_ref(), &iv, ciphertext),
        }
    }

    /// Validate a caller-supplied IV or fall back to an all-zero block.
    fn resolve_iv(&self, iv: Option<&[u8]>, block_size: usize) -> Result<Vec<u8>, CryptoError> {
        if !self.mode.uses_iv() {
            return Ok(vec![0; block_size]);
        }
        match iv {
            Some(iv) if iv.len() == block_size => Ok(iv.to_vec()),
            Some(iv) => Err(CryptoError::InvalidBlockSize {
                expected: block_size,
                actual: iv.len(),
            }),
            None => Ok(vec![0; block_size]),
        }
    }
}

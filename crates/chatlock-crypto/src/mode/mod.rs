//! Block cipher modes of operation.
//!
//! Seven chaining modes over a [`BlockCipher`]. The padded block modes
//! (ECB, CBC, PCBC, RandomDelta) expect input already aligned to the
//! cipher block size; the stream modes (CFB, OFB, CTR) operate on any
//! length and preserve it exactly. Every function transforms one whole
//! buffer per call; chaining state never survives across calls.

pub(crate) mod block_modes;
pub(crate) mod stream_modes;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Supported modes of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Electronic codebook: independent blocks, no chaining, no IV.
    Ecb,
    /// Cipher block chaining: XOR-then-encrypt seeded by the IV.
    Cbc,
    /// Propagating CBC: feedback is plaintext XOR ciphertext.
    Pcbc,
    /// Cipher feedback: self-synchronizing stream mode.
    Cfb,
    /// Output feedback: plaintext-independent keystream.
    Ofb,
    /// Counter: keystream from an incrementing big-endian counter.
    Ctr,
    /// Rolling-delta chaining: the delta re-encrypts each ciphertext.
    RandomDelta,
}

impl Mode {
    /// Stream modes never pad and preserve the input length exactly.
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::Cfb | Self::Ofb | Self::Ctr)
    }

    /// Every mode except ECB consumes an IV.
    pub const fn uses_iv(self) -> bool {
        !matches!(self, Self::Ecb)
    }
}

impl FromStr for Mode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Self::Ecb),
            "cbc" => Ok(Self::Cbc),
            "pcbc" => Ok(Self::Pcbc),
            "cfb" => Ok(Self::Cfb),
            "ofb" => Ok(Self::Ofb),
            "ctr" => Ok(Self::Ctr),
            "randomdelta" => Ok(Self::RandomDelta),
            _ => Err(CryptoError::UnsupportedMode(s.to_string())),
        }
    }
}

/// XOR `src` into `dst` element-wise; the shorter slice bounds the work.
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mode_classification() {
        assert!(Mode::Cfb.is_stream());
        assert!(Mode::Ofb.is_stream());
        assert!(Mode::Ctr.is_stream());
        assert!(!Mode::Cbc.is_stream());
        assert!(!Mode::RandomDelta.is_stream());

        assert!(!Mode::Ecb.uses_iv());
        assert!(Mode::Cbc.uses_iv());
    }

    #[test]
    fn mode_parses_known_names() {
        for (name, mode) in [
            ("ecb", Mode::Ecb),
            ("CBC", Mode::Cbc),
            ("pcbc", Mode::Pcbc),
            ("cfb", Mode::Cfb),
            ("ofb", Mode::Ofb),
            ("ctr", Mode::Ctr),
            ("RandomDelta", Mode::RandomDelta),
        ] {
            assert_eq!(Mode::from_str(name).unwrap(), mode);
        }
    }

    #[test]
    fn unknown_mode_is_reported_by_name() {
        let err = Mode::from_str("gcm").unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedMode(name) if name == "gcm"));
    }

    #[test]
    fn xor_into_is_elementwise() {
        let mut dst = [0b1010, 0b0110];
        xor_into(&mut dst, &[0b0011, 0b0101]);
        assert_eq!(dst, [0b1001, 0b0011]);
    }
}

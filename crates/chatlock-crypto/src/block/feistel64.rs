//! 64-bit Feistel network cipher.
//!
//! A 16-round Feistel construction over two 32-bit halves with a 256-bit
//! key. The round function XORs in the round key, pushes every nibble
//! through one of two alternating 4-bit S-boxes, and rotates the result
//! left by 13. Because only the XOR with the opposite half needs to be
//! undone, the round function itself does not have to be invertible.

use zeroize::Zeroize;

use crate::block::{BlockCipher, check_block};
use crate::error::CryptoError;

/// Key length in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Block length in bytes (64 bits).
pub const BLOCK_SIZE: usize = 8;

const ROUNDS: usize = 16;

/// S-box applied to even-indexed nibbles.
const SBOX_EVEN: [u32; 16] = [
    0xE, 0x4, 0xD, 0x1, 0x2, 0xF, 0xB, 0x8, 0x3, 0xA, 0x6, 0xC, 0x5, 0x9, 0x0, 0x7,
];

/// S-box applied to odd-indexed nibbles.
const SBOX_ODD: [u32; 16] = [
    0xC, 0x5, 0x6, 0xB, 0x9, 0x0, 0xA, 0xD, 0x3, 0xE, 0xF, 0x8, 0x4, 0x7, 0x1, 0x2,
];

/// A keyed Feistel64 instance holding its expanded round keys.
pub struct Feistel64 {
    round_keys: [u32; ROUNDS],
}

impl Drop for Feistel64 {
    fn drop(&mut self) {
        self.round_keys.zeroize();
    }
}

impl std::fmt::Debug for Feistel64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feistel64")
            .field("round_keys", &"[REDACTED]")
            .finish()
    }
}

impl Feistel64 {
    /// Build a cipher instance from a 32-byte key.
    ///
    /// The round-key schedule splits the key into eight 32-bit words and
    /// combines adjacent words per round: `rk[i] = rotl(w[i], i) ^ w[i+1]`
    /// (indices mod 8).
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }

        let mut words = [0u32; 8];
        for (i, chunk) in key.chunks_exact(4).enumerate() {
            words[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut round_keys = [0u32; ROUNDS];
        for (i, rk) in round_keys.iter_mut().enumerate() {
            *rk = words[i % 8].rotate_left(i as u32) ^ words[(i + 1) % 8];
        }
        words.zeroize();

        Ok(Self { round_keys })
    }

    /// The Feistel round function.
    fn round_f(half: u32, round_key: u32) -> u32 {
        let mixed = half ^ round_key;
        let mut substituted = 0u32;
        for nibble in 0..8 {
            let shift = 28 - 4 * nibble;
            let value = ((mixed >> shift) & 0xF) as usize;
            let sbox = if nibble % 2 == 0 { &SBOX_EVEN } else { &SBOX_ODD };
            substituted |= sbox[value] << shift;
        }
        substituted.rotate_left(13)
    }
}

impl BlockCipher for Feistel64 {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block(block, BLOCK_SIZE)?;

        let mut left = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
        let mut right = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);

        for rk in &self.round_keys {
            let next_right = left ^ Self::round_f(right, *rk);
            left = right;
            right = next_right;
        }

        let mut out = Vec::with_capacity(BLOCK_SIZE);
        out.extend_from_slice(&left.to_be_bytes());
        out.extend_from_slice(&right.to_be_bytes());
        Ok(out)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block(block, BLOCK_SIZE)?;

        let mut left = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
        let mut right = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);

        for rk in self.round_keys.iter().rev() {
            let prev_left = right ^ Self::round_f(left, *rk);
            right = left;
            left = prev_left;
        }

        let mut out = Vec::with_capacity(BLOCK_SIZE);
        out.extend_from_slice(&left.to_be_bytes());
        out.extend_from_slice(&right.to_be_bytes());
        Ok(out)
    }
}

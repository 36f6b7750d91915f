//! RC6 block cipher (RC6-32/20/16).
//!
//! An ARX cipher over four little-endian 32-bit registers with
//! data-dependent rotations. All arithmetic is wrapping 32-bit; the key
//! schedule expands the 128-bit key into 44 words seeded from the P32/Q32
//! magic constants.

use zeroize::Zeroize;

use crate::block::{BlockCipher, check_block};
use crate::error::CryptoError;

/// Key length in bytes (128 bits).
pub const KEY_SIZE: usize = 16;

/// Block length in bytes (128 bits).
pub const BLOCK_SIZE: usize = 16;

const ROUNDS: usize = 20;
const SCHEDULE_WORDS: usize = 2 * ROUNDS + 4;

/// Odd((e - 2) * 2^32).
const P32: u32 = 0xB7E1_5163;
/// Odd((phi - 1) * 2^32).
const Q32: u32 = 0x9E37_79B9;
/// log2 of the word size, the fixed rotation amount.
const LG_W: u32 = 5;

/// A keyed RC6 instance holding its expanded key schedule.
pub struct Rc6 {
    schedule: [u32; SCHEDULE_WORDS],
}

impl Drop for Rc6 {
    fn drop(&mut self) {
        self.schedule.zeroize();
    }
}

impl std::fmt::Debug for Rc6 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rc6")
            .field("schedule", &"[REDACTED]")
            .finish()
    }
}

impl Rc6 {
    /// Build a cipher instance from a 16-byte key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }

        let mut key_words = [0u32; KEY_SIZE / 4];
        for (i, chunk) in key.chunks_exact(4).enumerate() {
            key_words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut schedule = [0u32; SCHEDULE_WORDS];
        schedule[0] = P32;
        for i in 1..SCHEDULE_WORDS {
            schedule[i] = schedule[i - 1].wrapping_add(Q32);
        }

        let mut a = 0u32;
        let mut b = 0u32;
        let mut i = 0usize;
        let mut j = 0usize;
        for _ in 0..3 * SCHEDULE_WORDS {
            a = schedule[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
            schedule[i] = a;
            b = key_words[j]
                .wrapping_add(a)
                .wrapping_add(b)
                .rotate_left(a.wrapping_add(b));
            key_words[j] = b;
            i = (i + 1) % SCHEDULE_WORDS;
            j = (j + 1) % key_words.len();
        }
        key_words.zeroize();

        Ok(Self { schedule })
    }

    /// The quadratic mixing term `rotl(x * (2x + 1), 5)`.
    fn mix(x: u32) -> u32 {
        x.wrapping_mul(x.wrapping_mul(2).wrapping_add(1))
            .rotate_left(LG_W)
    }

    fn load_registers(block: &[u8]) -> [u32; 4] {
        let mut regs = [0u32; 4];
        for (i, chunk) in block.chunks_exact(4).enumerate() {
            regs[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        regs
    }

    fn store_registers(regs: [u32; 4]) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_SIZE);
        for reg in regs {
            out.extend_from_slice(&reg.to_le_bytes());
        }
        out
    }
}

impl BlockCipher for Rc6 {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block(block, BLOCK_SIZE)?;
        let [mut a, mut b, mut c, mut d] = Self::load_registers(block);

        b = b.wrapping_add(self.schedule[0]);
        d = d.wrapping_add(self.schedule[1]);
        for round in 1..=ROUNDS {
            let t = Self::mix(b);
            let u = Self::mix(d);
            a = (a ^ t).rotate_left(u).wrapping_add(self.schedule[2 * round]);
            c = (c ^ u)
                .rotate_left(t)
                .wrapping_add(self.schedule[2 * round + 1]);
            (a, b, c, d) = (b, c, d, a);
        }
        a = a.wrapping_add(self.schedule[2 * ROUNDS + 2]);
        c = c.wrapping_add(self.schedule[2 * ROUNDS + 3]);

        Ok(Self::store_registers([a, b, c, d]))
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_block(block, BLOCK_SIZE)?;
        let [mut a, mut b, mut c, mut d] = Self::load_registers(block);

        c = c.wrapping_sub(self.schedule[2 * ROUNDS + 3]);
        a = a.wrapping_sub(self.schedule[2 * ROUNDS + 2]);
        for round in (1..=ROUNDS).rev() {
            (a, b, c, d) = (d, a, b, c);
            let u = Self::mix(d);
            let t = Self::mix(b);
            c = c
                .wrapping_sub(self.schedule[2 * round + 1])
                .rotate_right(t)
                ^ u;
            a = a.wrapping_sub(self.schedule[2 * round]).rotate_right(u) ^ t;
        }
        d = d.wrapping_sub(self.schedule[1]);
        b = b.wrapping_sub(self.schedule[0]);

        Ok(Self::store_registers([a, b, c, d]))
    }
}

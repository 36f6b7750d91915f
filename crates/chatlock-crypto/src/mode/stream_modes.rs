//! Stream modes: CFB, OFB, CTR.
//!
//! The block cipher only ever runs in the encrypt direction here; the
//! plaintext is XORed against a keystream, so ciphertext length always
//! equals plaintext length and no padding is involved. The final chunk
//! may be shorter than a block.

use crate::block::BlockCipher;
use crate::error::CryptoError;
use crate::mode::xor_into;

/// CFB encryption: keystream from encrypting the feedback register,
/// ciphertext becomes the next feedback.
pub fn cfb_encrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let block_size = cipher.block_size();
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for chunk in data.chunks(block_size) {
        let keystream = cipher.encrypt_block(&feedback)?;
        let mut ciphertext = chunk.to_vec();
        xor_into(&mut ciphertext, &keystream);
        if ciphertext.len() == block_size {
            feedback = ciphertext.clone();
        }
        out.extend_from_slice(&ciphertext);
    }
    Ok(out)
}

/// CFB decryption: same keystream, but the *received* ciphertext feeds
/// the register.
pub fn cfb_decrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let block_size = cipher.block_size();
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for chunk in data.chunks(block_size) {
        let keystream = cipher.encrypt_block(&feedback)?;
        let mut plaintext = chunk.to_vec();
        xor_into(&mut plaintext, &keystream);
        if chunk.len() == block_size {
            feedback = chunk.to_vec();
        }
        out.extend_from_slice(&plaintext);
    }
    Ok(out)
}

/// OFB: the keystream block itself is the next feedback, so the
/// keystream is independent of the data. Encryption and decryption are
/// the same operation.
pub fn ofb_apply(cipher: &dyn BlockCipher, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for chunk in data.chunks(cipher.block_size()) {
        feedback = cipher.encrypt_block(&feedback)?;
        let mut transformed = chunk.to_vec();
        xor_into(&mut transformed, &feedback);
        out.extend_from_slice(&transformed);
    }
    Ok(out)
}

/// CTR: keystream from encrypting a big-endian counter seeded by the IV.
/// Encryption and decryption are the same operation.
pub fn ctr_apply(cipher: &dyn BlockCipher, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut counter = iv.to_vec();
    for chunk in data.chunks(cipher.block_size()) {
        let keystream = cipher.encrypt_block(&counter)?;
        let mut transformed = chunk.to_vec();
        xor_into(&mut transformed, &keystream);
        out.extend_from_slice(&transformed);
        increment_counter(&mut counter);
    }
    Ok(out)
}

/// Big-endian increment over the counter's full width, carrying leftward
/// and wrapping silently at the top.
fn increment_counter(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

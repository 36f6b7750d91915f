//! Padded block modes: ECB, CBC, PCBC, RandomDelta.
//!
//! All functions here expect block-aligned input; a trailing partial
//! block propagates the cipher's `InvalidBlockSize` error. Padding is the
//! caller's concern (see the suite layer).

use crate::block::BlockCipher;
use crate::error::CryptoError;
use crate::mode::xor_into;

/// ECB: encrypt each block independently.
pub fn ecb_encrypt(cipher: &dyn BlockCipher, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(cipher.block_size()) {
        out.extend_from_slice(&cipher.encrypt_block(block)?);
    }
    Ok(out)
}

/// ECB: decrypt each block independently.
pub fn ecb_decrypt(cipher: &dyn BlockCipher, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    for block in data.chunks(cipher.block_size()) {
        out.extend_from_slice(&cipher.decrypt_block(block)?);
    }
    Ok(out)
}

/// CBC: XOR the previous ciphertext block (IV first) into each plaintext
/// block before encrypting.
pub fn cbc_encrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut mixed = block.to_vec();
        xor_into(&mut mixed, &feedback);
        let ciphertext = cipher.encrypt_block(&mixed)?;
        feedback = ciphertext.clone();
        out.extend_from_slice(&ciphertext);
    }
    Ok(out)
}

/// CBC: decrypt each block, then XOR with the previous ciphertext block.
pub fn cbc_decrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut plaintext = cipher.decrypt_block(block)?;
        xor_into(&mut plaintext, &feedback);
        feedback = block.to_vec();
        out.extend_from_slice(&plaintext);
    }
    Ok(out)
}

/// PCBC: like CBC, but the feedback for block i+1 is
/// `plaintext_i XOR ciphertext_i`.
pub fn pcbc_encrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut mixed = block.to_vec();
        xor_into(&mut mixed, &feedback);
        let ciphertext = cipher.encrypt_block(&mixed)?;
        feedback = block.to_vec();
        xor_into(&mut feedback, &ciphertext);
        out.extend_from_slice(&ciphertext);
    }
    Ok(out)
}

/// PCBC inverse of [`pcbc_encrypt`].
pub fn pcbc_decrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut feedback = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut plaintext = cipher.decrypt_block(block)?;
        xor_into(&mut plaintext, &feedback);
        feedback = plaintext.clone();
        xor_into(&mut feedback, block);
        out.extend_from_slice(&plaintext);
    }
    Ok(out)
}

/// RandomDelta: encrypt `plaintext XOR delta`, then advance the delta to
/// the encryption of the just-produced ciphertext block.
pub fn random_delta_encrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut delta = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut mixed = block.to_vec();
        xor_into(&mut mixed, &delta);
        let ciphertext = cipher.encrypt_block(&mixed)?;
        // Derived from the ciphertext, never the plaintext, so decryption
        // can reproduce the same delta chain.
        delta = cipher.encrypt_block(&ciphertext)?;
        out.extend_from_slice(&ciphertext);
    }
    Ok(out)
}

/// RandomDelta inverse of [`random_delta_encrypt`].
pub fn random_delta_decrypt(
    cipher: &dyn BlockCipher,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::with_capacity(data.len());
    let mut delta = iv.to_vec();
    for block in data.chunks(cipher.block_size()) {
        let mut plaintext = cipher.decrypt_block(block)?;
        xor_into(&mut plaintext, &delta);
        delta = cipher.encrypt_block(block)?;
        out.extend_from_slice(&plaintext);
    }
    Ok(out)
}

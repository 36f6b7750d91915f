//! Crypto error types.

/// Errors from cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key length does not match the selected algorithm.
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// A buffer fed to a block primitive is not exactly one block.
    #[error("Invalid block size: expected {expected}, got {actual}")]
    InvalidBlockSize { expected: usize, actual: usize },

    /// Padding removal found malformed pad bytes.
    ///
    /// Deliberately carries no detail about *what* was malformed so the
    /// error cannot be used as a padding oracle. Internals are traced at
    /// debug level only.
    #[error("Invalid padding")]
    InvalidPadding,

    /// Unrecognized algorithm selector.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Unrecognized mode selector.
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    /// Unrecognized padding selector.
    #[error("Unsupported padding: {0}")]
    UnsupportedPadding(String),

    /// A Diffie-Hellman public value outside the valid range (1, p-1).
    #[error("Invalid public key for key exchange")]
    InvalidPublicKey,
}

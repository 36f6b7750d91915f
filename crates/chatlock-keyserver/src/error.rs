//! Key-exchange error types.

use chatlock_crypto::CryptoError;

/// Errors from the session key protocol.
#[derive(Debug, thiserror::Error)]
pub enum KeyExchangeError {
    /// The room has no established parameters.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A participant public key failed to parse as a decimal integer.
    #[error("Malformed public key")]
    MalformedPublicKey,

    /// A numeric or encoded wire field failed to parse.
    #[error("Malformed field: {0}")]
    MalformedField(&'static str),

    /// The underlying store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// A cryptographic operation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

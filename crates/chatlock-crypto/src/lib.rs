//! Chatlock cryptographic core.
//!
//! Everything needed to secure chat traffic end to end:
//!
//! - **Block ciphers**: `Feistel64` (64-bit block, 256-bit key Feistel
//!   network) and `Rc6` (RC6-32/20/16) behind one capability trait
//! - **Modes**: ECB, CBC, PCBC, CFB, OFB, CTR, RandomDelta over whole
//!   buffers
//! - **Padding**: PKCS#7, zeros, ANSI X9.23, ISO 10126, none
//! - **Key agreement**: classic Diffie-Hellman over generated prime
//!   fields, with from-scratch modular exponentiation and Miller-Rabin
//!   primality testing
//!
//! Cipher, mode and padding are selected at runtime through
//! [`CipherSuite`]; contexts hold no state across calls, so independent
//! operations are freely concurrent.

pub mod block;
pub mod dh;
pub mod error;
pub mod mode;
pub mod padding;
pub mod prime;
pub mod suite;

pub use block::{Algorithm, BlockCipher, Feistel64, Rc6};
pub use dh::{DEFAULT_PRIME_BITS, DhKeyPair, DhParameters, PRIMALITY_ROUNDS};
pub use error::CryptoError;
pub use mode::Mode;
pub use padding::Padding;
pub use prime::{is_probable_prime, mod_pow, random_prime};
pub use suite::CipherSuite;

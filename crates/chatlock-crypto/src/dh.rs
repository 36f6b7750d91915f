//! Diffie-Hellman key agreement over a prime field.
//!
//! Parameters are a freshly generated prime modulus with generator 2.
//! Each party derives `public = g^private mod p`; both sides then arrive
//! at the same shared secret because modular exponentiation commutes:
//! `(g^a)^b = (g^b)^a (mod p)`.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::prime::{is_probable_prime, mod_pow, random_prime};

/// Default modulus width for generated parameters.
pub const DEFAULT_PRIME_BITS: u64 = 512;

/// Miller-Rabin rounds used when generating or validating a modulus.
pub const PRIMALITY_ROUNDS: u32 = 40;

/// Domain parameters shared by every party of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhParameters {
    /// Prime modulus.
    pub p: BigUint,
    /// Generator, fixed at 2 for generated parameters.
    pub g: BigUint,
}

impl DhParameters {
    /// Generate fresh parameters with a prime modulus of `bit_length` bits.
    ///
    /// CPU-bound and blocking; for large widths run it off any
    /// latency-sensitive thread.
    pub fn generate(bit_length: u64) -> Self {
        Self {
            p: random_prime(bit_length, PRIMALITY_ROUNDS),
            g: BigUint::from(2u32),
        }
    }

    /// Reuse parameters received from elsewhere (e.g. a key server).
    pub const fn new(p: BigUint, g: BigUint) -> Self {
        Self { p, g }
    }

    /// Re-check that the modulus is (probably) prime.
    pub fn validate(&self) -> bool {
        is_probable_prime(&self.p, PRIMALITY_ROUNDS)
    }
}

/// One party's key pair for a single exchange.
pub struct DhKeyPair {
    params: DhParameters,
    private: BigUint,
    public: BigUint,
}

impl std::fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

impl DhKeyPair {
    /// Generate a fresh key pair under the given parameters.
    ///
    /// The private exponent is drawn uniformly from `(1, p-1)` using the
    /// OS entropy source.
    pub fn generate(params: &DhParameters) -> Self {
        let mut rng = OsRng;
        let two = BigUint::from(2u32);
        let upper = &params.p - BigUint::one();
        let private = rng.gen_biguint_range(&two, &upper);
        let public = mod_pow(&params.g, &private, &params.p);
        Self {
            params: params.clone(),
            private,
            public,
        }
    }

    /// Reconstruct a key pair from a stored private exponent.
    pub fn from_private(params: &DhParameters, private: BigUint) -> Self {
        let public = mod_pow(&params.g, &private, &params.p);
        Self {
            params: params.clone(),
            private,
            public,
        }
    }

    /// The public value to send to the peer.
    pub const fn public(&self) -> &BigUint {
        &self.public
    }

    /// The private exponent. Handle with care.
    pub const fn private(&self) -> &BigUint {
        &self.private
    }

    /// The parameters this pair was generated under.
    pub const fn params(&self) -> &DhParameters {
        &self.params
    }

    /// Derive the shared secret from the peer's public value.
    ///
    /// Rejects degenerate publics outside `(1, p-1)`: 0, 1 and `p-1`
    /// would collapse the secret into a trivially guessable value.
    pub fn shared_secret(&self, other_public: &BigUint) -> Result<BigUint, CryptoError> {
        let one = BigUint::one();
        let upper = &self.params.p - &one;
        if *other_public <= one || *other_public >= upper {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(mod_pow(other_public, &self.private, &self.params.p))
    }
}

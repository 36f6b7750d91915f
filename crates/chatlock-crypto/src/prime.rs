//! Big-integer primitives: modular exponentiation and primality testing.
//!
//! `num-bigint` supplies the arbitrary-precision arithmetic; the
//! algorithms themselves live here because witness and candidate policy
//! is part of this system's security posture.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use tracing::debug;

/// Modular exponentiation by left-to-right square-and-multiply.
///
/// # Panics
///
/// Panics if `modulus` is zero.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_one() {
        return BigUint::zero();
    }
    let base = base % modulus;
    let mut result = BigUint::one();
    for i in (0..exponent.bits()).rev() {
        result = &result * &result % modulus;
        if exponent.bit(i) {
            result = result * &base % modulus;
        }
    }
    result
}

/// Miller-Rabin probabilistic primality test.
///
/// Runs `rounds` independent random witnesses; a composite survives with
/// probability at most `4^-rounds`. Witnesses are drawn from the OS
/// entropy source.
pub fn is_probable_prime(candidate: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if candidate < &two {
        return false;
    }
    if *candidate == two || *candidate == three {
        return true;
    }
    if !candidate.bit(0) {
        return false;
    }

    // Factor candidate - 1 as d * 2^s with d odd.
    let n_minus_one = candidate - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let mut rng = OsRng;
    'witness: for _ in 0..rounds {
        // Witness in [2, candidate - 2].
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = mod_pow(&a, &d, candidate);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..s.saturating_sub(1) {
            x = &x * &x % candidate;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Draw random odd candidates of exactly `bits` bits until one passes
/// Miller-Rabin with the given round count.
///
/// The top bit is forced so the result has the exact requested width;
/// the bottom bit is forced so only odd candidates are tested.
pub fn random_prime(bits: u64, rounds: u32) -> BigUint {
    debug_assert!(bits >= 2, "a prime needs at least 2 bits");
    let mut rng = OsRng;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, rounds) {
            debug!(bits, attempts, "prime candidate accepted");
            return candidate;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn big(n: u32) -> BigUint {
        BigUint::from(n)
    }

    /// 2^255 - 19, the curve25519 field prime.
    fn large_known_prime() -> BigUint {
        "57896044618658097711785492504343953926634992332820282019728792003956564819949"
            .parse()
            .unwrap()
    }

    #[test]
    fn mod_pow_matches_textbook_example() {
        // 4^13 mod 497 = 445
        assert_eq!(mod_pow(&big(4), &big(13), &big(497)), big(445));
    }

    #[test]
    fn mod_pow_edge_cases() {
        assert_eq!(mod_pow(&big(7), &big(0), &big(13)), big(1));
        assert_eq!(mod_pow(&big(0), &big(5), &big(13)), big(0));
        assert_eq!(mod_pow(&big(7), &big(5), &big(1)), big(0));
    }

    #[test]
    fn mod_pow_agrees_with_library_modpow() {
        let m = large_known_prime();
        for (base, exp) in [(2u32, 1000u32), (3, 65537), (65521, 12345)] {
            let base = big(base);
            let exp = big(exp);
            assert_eq!(mod_pow(&base, &exp, &m), base.modpow(&exp, &m));
        }
    }

    #[test]
    fn fermat_little_theorem_holds() {
        let p = large_known_prime();
        let exponent = &p - 1u32;
        assert_eq!(mod_pow(&big(2), &exponent, &p), BigUint::one());
        assert_eq!(mod_pow(&big(12345), &exponent, &p), BigUint::one());
    }

    #[test]
    fn small_numbers_classified_correctly() {
        let primes = [2u32, 3, 5, 7, 11, 13, 17, 19, 23, 65521];
        let composites = [0u32, 1, 4, 6, 8, 9, 15, 21, 25, 65519 * 3];
        for p in primes {
            assert!(is_probable_prime(&big(p), 40), "{p} should be prime");
        }
        for c in composites {
            assert!(!is_probable_prime(&big(c), 40), "{c} should be composite");
        }
    }

    #[test]
    fn large_known_prime_passes_forty_rounds() {
        assert!(is_probable_prime(&large_known_prime(), 40));
    }

    #[test]
    fn semiprime_is_rejected() {
        // Product of two large primes must fail the test.
        let p = large_known_prime();
        let semiprime = &p * &p;
        assert!(!is_probable_prime(&semiprime, 40));
        assert!(!is_probable_prime(&(big(101) * big(103)), 40));
    }

    #[test]
    fn carmichael_numbers_are_rejected() {
        // Fermat pseudoprimes to every base; Miller-Rabin still catches them.
        for n in [561u32, 1105, 1729, 41041] {
            assert!(!is_probable_prime(&big(n), 40), "{n} should be composite");
        }
    }

    #[test]
    fn random_prime_has_exact_bit_length_and_is_odd() {
        let prime = random_prime(64, 20);
        assert_eq!(prime.bits(), 64);
        assert!(prime.bit(0));
        assert!(is_probable_prime(&prime, 40));
    }
}

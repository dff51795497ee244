//! Word-sized modular arithmetic shared by the prime search, the NTT and the
//! RNS layer. Every modulus used by the crate is below `2^62`, so sums of two
//! reduced residues never overflow a `u64`.

#[inline]
pub fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let s = a + b;
    if s >= q { s - q } else { s }
}

#[inline]
pub fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { a + q - b }
}

#[inline]
pub fn neg_mod(a: u64, q: u64) -> u64 {
    if a == 0 { 0 } else { q - a }
}

/// Computes `(a * b) mod q` using `u128` intermediate arithmetic.
#[inline]
pub fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}

/// Computes `base^exp mod modulus` via binary exponentiation.
pub fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    assert!(modulus > 0, "mod_pow: modulus must be positive");
    if modulus == 1 {
        return 0;
    }
    let mut acc = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exp >>= 1;
    }
    acc
}

/// Modular inverse through the extended Euclidean algorithm.
///
/// # Panics
///
/// Panics if `value` and `modulus` are not coprime.
pub fn mod_inverse(value: u64, modulus: u64) -> u64 {
    fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
        if a == 0 {
            (b, 0, 1)
        } else {
            let (gcd, x1, y1) = extended_gcd(b % a, a);
            (gcd, y1 - (b / a) * x1, x1)
        }
    }
    let m = modulus as i128;
    let (gcd, x, _) = extended_gcd(value as i128 % m, m);
    assert_eq!(gcd, 1, "mod_inverse: values must be coprime");
    x.rem_euclid(m) as u64
}

/// Maps a residue in `[0, q)` to its centered representative in `(-q/2, q/2]`.
#[inline]
pub fn center(value: u64, q: u64) -> i64 {
    if value > q / 2 {
        -((q - value) as i64)
    } else {
        value as i64
    }
}

/// Reduces a signed integer into `[0, q)`.
#[inline]
pub fn reduce_i64(value: i64, q: u64) -> u64 {
    (value as i128).rem_euclid(q as i128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_mod_matches_widened_reference() {
        let a = u64::MAX - 11;
        let b = u64::MAX - 17;
        let modulus = 1_073_750_017u64;
        let expected = ((a as u128 * b as u128) % modulus as u128) as u64;
        assert_eq!(mul_mod(a, b, modulus), expected);
    }

    #[test]
    fn mod_pow_handles_edge_cases() {
        assert_eq!(mod_pow(2, 0, 17), 1);
        assert_eq!(mod_pow(5, 0, 1), 0);
        assert_eq!(mod_pow(0, 5, 17), 0);
        assert_eq!(mod_pow(7, 1, 19), 7);
        assert_eq!(mod_pow(3, 16, 17), 1);
    }

    #[test]
    #[should_panic(expected = "mod_pow: modulus must be positive")]
    fn mod_pow_panics_on_zero_modulus() {
        let _ = mod_pow(2, 10, 0);
    }

    #[test]
    fn mod_inverse_round_trips() {
        let q = 1_073_750_017u64;
        for value in [1u64, 2, 12345, q - 1] {
            let inv = mod_inverse(value, q);
            assert_eq!(mul_mod(value, inv, q), 1);
        }
    }

    #[test]
    #[should_panic(expected = "mod_inverse: values must be coprime")]
    fn mod_inverse_panics_on_shared_factor() {
        let _ = mod_inverse(6, 9);
    }

    #[test]
    fn center_and_reduce_are_inverse() {
        let q = 97;
        for value in -48i64..=48 {
            assert_eq!(center(reduce_i64(value, q), q), value);
        }
        assert_eq!(center(96, q), -1);
        assert_eq!(center(48, q), 48);
        assert_eq!(center(49, q), -48);
    }

    #[test]
    fn add_sub_neg_wrap_at_modulus() {
        assert_eq!(add_mod(16, 2, 17), 1);
        assert_eq!(sub_mod(2, 5, 17), 14);
        assert_eq!(neg_mod(3, 17), 14);
        assert_eq!(neg_mod(0, 17), 0);
    }
}

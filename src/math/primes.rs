//! Prime utilities for constructing NTT-friendly modulus chains.
//!
//! Primality uses Miller-Rabin with a fixed base set that is deterministic for
//! every `u64`. The chain helpers search only the arithmetic progression
//! `p = 1 (mod 2n)`, which is exactly the set of candidates that admit a
//! primitive `2n`-th root of unity and therefore a negacyclic NTT over
//! `X^n + 1`.
//!
//! Reference:
//! https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test

use super::modular::{mod_pow, mul_mod};

// Deterministic for all n < 318,665,857,834,031,151,167,461, which covers u64.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Returns `(odd_part, power_of_two)` such that `n = odd_part * 2^power_of_two`.
fn decompose(n: u64) -> (u64, u32) {
    assert!(n > 0, "decompose: n must be positive");
    let r = n.trailing_zeros();
    (n >> r, r)
}

/// Returns `true` if `n` is prime using deterministic Miller-Rabin on `u64`.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let (d, r) = decompose(n - 1);
    'bases: for &a in MILLER_RABIN_BASES.iter() {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// Returns `true` when `p` is prime and `p = 1 (mod 2n)`.
#[inline]
pub fn is_ntt_friendly_prime(p: u64, n: u64) -> bool {
    assert!(n > 0, "is_ntt_friendly_prime: n must be positive");
    let modulus = n
        .checked_mul(2)
        .expect("is_ntt_friendly_prime: 2 * n must fit in u64");
    is_prime(p) && p % modulus == 1
}

/// Returns the smallest `x >= value` such that `x % modulus == 1`.
fn snap_up_to_congruence(value: u64, modulus: u64) -> Option<u64> {
    let remainder = value % modulus;
    let delta = (modulus + 1 - remainder) % modulus;
    value.checked_add(delta)
}

/// Returns the largest `x <= value` such that `x % modulus == 1`.
fn snap_down_to_congruence(value: u64, modulus: u64) -> Option<u64> {
    let remainder = value % modulus;
    let delta = (remainder + modulus - 1) % modulus;
    value.checked_sub(delta)
}

fn step_for(n: u64) -> u64 {
    assert!(n > 0, "prime search: n must be positive");
    n.checked_mul(2)
        .expect("prime search: 2 * n must fit in u64")
}

/// Returns the smallest NTT-friendly prime strictly greater than `bound`.
///
/// Returns `None` if the search would overflow `u64`.
pub fn next_prime_up(bound: u64, n: u64) -> Option<u64> {
    let step = step_for(n);
    let mut candidate = snap_up_to_congruence(bound.checked_add(1)?, step)?;
    loop {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_add(step)?;
    }
}

/// Returns the largest NTT-friendly prime strictly less than `bound`.
///
/// Returns `None` if no such prime exists.
pub fn next_prime_down(bound: u64, n: u64) -> Option<u64> {
    let step = step_for(n);
    if bound <= 2 {
        return None;
    }
    let mut candidate = snap_down_to_congruence(bound - 1, step)?;
    loop {
        if candidate <= 2 {
            return None;
        }
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
}

/// Largest NTT-friendly prime below `2^bits` that is not in `exclude`.
pub fn largest_prime_below_bits(bits: u32, n: u64, exclude: &[u64]) -> Option<u64> {
    assert!(bits < 64, "largest_prime_below_bits: bits must be less than 64");
    let mut bound = 1u64 << bits;
    loop {
        let prime = next_prime_down(bound, n)?;
        if !exclude.contains(&prime) {
            return Some(prime);
        }
        bound = prime;
    }
}

/// Returns `count` distinct NTT-friendly primes clustered around `2^bits`.
///
/// Candidates are taken alternately below and above `2^bits`, so the product
/// of the returned primes stays close to `2^(bits * count)`. Primes listed in
/// `exclude` are skipped.
pub fn primes_near_power_of_two(
    bits: u32,
    count: usize,
    n: u64,
    exclude: &[u64],
) -> Option<Vec<u64>> {
    assert!(bits < 63, "primes_near_power_of_two: bits must be less than 63");
    let target = 1u64 << bits;
    let mut below = Some(target);
    let mut above = Some(target);
    let mut primes = Vec::with_capacity(count);
    let mut take_below = true;

    while primes.len() < count {
        let candidate = if take_below {
            below = below.and_then(|bound| next_prime_down(bound, n));
            below
        } else {
            above = above.and_then(|bound| next_prime_up(bound, n));
            above
        };
        take_below = !take_below;

        match candidate {
            Some(prime) if !exclude.contains(&prime) => primes.push(prime),
            Some(_) => {}
            None if below.is_none() && above.is_none() => return None,
            None => {}
        }
    }
    Some(primes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_SMALL_PRIMES: [u64; 8] = [2, 3, 5, 7, 11, 13, 17, 19];
    const KNOWN_SMALL_COMPOSITES: [u64; 10] = [0, 1, 4, 6, 8, 9, 10, 12, 15, 16];

    /// Slow-but-clear reference test using `6k +/- 1` trial division.
    fn is_prime_reference(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n == 2 || n == 3 {
            return true;
        }
        if n.is_multiple_of(2) || n.is_multiple_of(3) {
            return false;
        }
        let mut i = 5u64;
        while i.saturating_mul(i) <= n {
            if n.is_multiple_of(i) || n.is_multiple_of(i + 2) {
                return false;
            }
            i += 6;
        }
        true
    }

    #[test]
    fn test_is_prime_basic() {
        for &prime in &KNOWN_SMALL_PRIMES {
            assert!(is_prime(prime));
        }
        for &composite in &KNOWN_SMALL_COMPOSITES {
            assert!(!is_prime(composite));
        }
    }

    #[test]
    fn decompose_splits_power_of_two_factor() {
        assert_eq!(decompose(24), (3, 3));
        assert_eq!(decompose(40), (5, 3));
        assert_eq!(decompose(1), (1, 0));
    }

    #[test]
    fn test_is_prime_tricky_composites() {
        // Carmichael numbers and strong pseudoprimes for small base sets.
        let tricky = [561u64, 1_105, 1_729, 3_215_031_751];
        for &n in &tricky {
            assert!(!is_prime(n), "expected composite: {n}");
        }
    }

    #[test]
    fn test_is_prime_near_u64_limit() {
        assert!(!is_prime(u64::MAX));
        assert!(is_prime(18_446_744_073_709_551_557));
    }

    #[test]
    fn miller_rabin_matches_reference_on_selected_ranges() {
        let ranges: [(u64, u64); 3] = [(2, 200), (10_000, 10_100), (1_000_000, 1_000_100)];
        for (start, end) in ranges {
            for n in start..=end {
                assert_eq!(is_prime(n), is_prime_reference(n), "mismatch at {n}");
            }
        }
    }

    #[test]
    fn test_ntt_friendly_condition() {
        assert!(is_ntt_friendly_prime(12289, 1024));
        assert!(!is_ntt_friendly_prime(2049, 1024));
        assert!(!is_ntt_friendly_prime(4097, 1024));
    }

    #[test]
    fn next_prime_up_matches_known_value() {
        assert_eq!(next_prime_up(1 << 30, 1024), Some(1_073_750_017));
    }

    #[test]
    fn next_prime_down_descends() {
        let prime = next_prime_up(1 << 20, 1024).unwrap();
        let below = next_prime_down(prime, 1024).unwrap();
        assert!(below < prime);
        assert!(is_ntt_friendly_prime(below, 1024));
        assert_eq!(next_prime_down(2, 1024), None);
    }

    #[test]
    fn largest_prime_below_bits_skips_excluded() {
        let first = largest_prime_below_bits(40, 4096, &[]).unwrap();
        let second = largest_prime_below_bits(40, 4096, &[first]).unwrap();
        assert!(first < 1 << 40);
        assert!(second < first);
        assert!(is_ntt_friendly_prime(second, 4096));
    }

    #[test]
    fn primes_near_power_of_two_are_distinct_and_close() {
        let n = 8192u64;
        let primes = primes_near_power_of_two(30, 6, n, &[]).unwrap();
        assert_eq!(primes.len(), 6);
        for (i, &p) in primes.iter().enumerate() {
            assert!(is_ntt_friendly_prime(p, n));
            assert!(!primes[..i].contains(&p));
            let ratio = p as f64 / (1u64 << 30) as f64;
            assert!((ratio - 1.0).abs() < 0.01, "prime {p} too far from 2^30");
        }
    }

    #[test]
    fn primes_near_power_of_two_respects_exclusions() {
        let n = 1024u64;
        let first = primes_near_power_of_two(30, 2, n, &[]).unwrap();
        let second = primes_near_power_of_two(30, 2, n, &first).unwrap();
        assert!(second.iter().all(|p| !first.contains(p)));
    }
}

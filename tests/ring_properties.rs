use std::sync::{Arc, OnceLock};

use ckks_poly_bench::math::{center, largest_prime_below_bits};
use ckks_poly_bench::rns::{RnsBasis, RnsPoly};
use proptest::prelude::*;

const DEGREE: usize = 16;

fn basis() -> Arc<RnsBasis> {
    static BASIS: OnceLock<Arc<RnsBasis>> = OnceLock::new();
    BASIS
        .get_or_init(|| {
            let n = DEGREE as u64;
            let q0 = largest_prime_below_bits(30, n, &[]).unwrap();
            let q1 = largest_prime_below_bits(31, n, &[q0]).unwrap();
            Arc::new(RnsBasis::new(DEGREE, &[q0, q1]).unwrap())
        })
        .clone()
}

fn coeffs_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1000i64..1000, DEGREE)
}

fn poly(coeffs: &[i64]) -> RnsPoly {
    RnsPoly::from_coeffs(coeffs, basis())
}

/// Schoolbook multiplication in Z[X]/(X^N + 1).
fn negacyclic_mul(a: &[i64], b: &[i64]) -> Vec<i64> {
    let n = a.len();
    let mut out = vec![0i64; n];
    for i in 0..n {
        for j in 0..n {
            let term = a[i] * b[j];
            if i + j < n {
                out[i + j] += term;
            } else {
                out[i + j - n] -= term;
            }
        }
    }
    out
}

/// Centered coefficients read from the first channel. Every value in these
/// tests stays far below `q_0 / 2`.
fn centered(p: &RnsPoly) -> Vec<i64> {
    p.channel_centered(0)
}

proptest! {
    #[test]
    fn addition_is_commutative(a in coeffs_strategy(), b in coeffs_strategy()) {
        let mut left = poly(&a);
        left += &poly(&b);
        let mut right = poly(&b);
        right += &poly(&a);
        prop_assert_eq!(left.channels(), right.channels());
    }

    #[test]
    fn addition_is_associative(
        a in coeffs_strategy(),
        b in coeffs_strategy(),
        c in coeffs_strategy(),
    ) {
        let mut left = poly(&a);
        left += &poly(&b);
        left += &poly(&c);
        let mut bc = poly(&b);
        bc += &poly(&c);
        let mut right = poly(&a);
        right += &bc;
        prop_assert_eq!(left.channels(), right.channels());
    }

    #[test]
    fn negation_is_additive_inverse(a in coeffs_strategy()) {
        let mut p = poly(&a);
        p += &(-poly(&a));
        prop_assert!(p.channels().iter().all(|ch| ch.iter().all(|&c| c == 0)));
    }

    #[test]
    fn multiplication_matches_schoolbook(a in coeffs_strategy(), b in coeffs_strategy()) {
        let mut p = poly(&a);
        p *= &poly(&b);
        prop_assert_eq!(centered(&p), negacyclic_mul(&a, &b));
    }

    #[test]
    fn multiplication_distributes_over_addition(
        a in coeffs_strategy(),
        b in coeffs_strategy(),
        c in coeffs_strategy(),
    ) {
        let mut bc = poly(&b);
        bc += &poly(&c);
        let mut left = poly(&a);
        left *= &bc;

        let mut ab = poly(&a);
        ab *= &poly(&b);
        let mut ac = poly(&a);
        ac *= &poly(&c);
        ab += &ac;
        prop_assert_eq!(left.channels(), ab.channels());
    }

    #[test]
    fn ntt_round_trip_is_identity(a in coeffs_strategy()) {
        let expected = poly(&a);
        let mut p = poly(&a);
        p.to_ntt_domain();
        prop_assert!(p.is_ntt_domain());
        p.to_coeff_domain();
        prop_assert_eq!(p.channels(), expected.channels());
    }

    #[test]
    fn scalar_multiplication_scales_coefficients(a in coeffs_strategy(), k in -50i64..50) {
        let mut p = poly(&a);
        p.mul_scalar_assign(k);
        let expected: Vec<i64> = a.iter().map(|&c| c * k).collect();
        prop_assert_eq!(centered(&p), expected);
    }
}

#[test]
fn x_to_the_n_is_minus_one() {
    let mut x = vec![0i64; DEGREE];
    x[1] = 1;
    let mut x_high = vec![0i64; DEGREE];
    x_high[DEGREE - 1] = 1;

    let mut p = poly(&x);
    p *= &poly(&x_high);
    let coeffs = centered(&p);
    assert_eq!(coeffs[0], -1);
    assert!(coeffs[1..].iter().all(|&c| c == 0));
}

#[test]
fn every_channel_agrees_on_small_values() {
    let a: Vec<i64> = (0..DEGREE as i64).map(|i| i - 8).collect();
    let p = poly(&a);
    for (channel, &q) in p.channels().iter().zip(basis().moduli()) {
        let values: Vec<i64> = channel.iter().map(|&c| center(c, q)).collect();
        assert_eq!(values, a);
    }
}

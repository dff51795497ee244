use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};

/// Samples `len` uniform integer coefficients in `[0, max_value)`.
///
/// # Panics
///
/// Panics if `max_value == 0`.
pub fn uniform_coefficients<R: Rng + ?Sized>(
    len: usize,
    max_value: u64,
    rng: &mut R,
) -> Vec<u64> {
    assert!(
        max_value > 0,
        "uniform_coefficients: invalid range [0, {max_value}), max_value must be positive"
    );
    (0..len).map(|_| rng.random_range(0..max_value)).collect()
}

/// Samples `len` rounded Gaussian integers with standard deviation `std_dev`.
///
/// # Panics
///
/// Panics if `std_dev` is not finite and positive.
pub fn gaussian_coefficients<R: Rng + ?Sized>(
    len: usize,
    std_dev: f64,
    rng: &mut R,
) -> Vec<i64> {
    assert!(
        std_dev.is_finite() && std_dev > 0.0,
        "gaussian_coefficients: std_dev must be finite and positive"
    );
    let normal = Normal::new(0.0, std_dev)
        .expect("gaussian_coefficients: failed to create Normal distribution");
    (0..len)
        .map(|_| normal.sample(rng).round() as i64)
        .collect()
}

/// Samples a ternary vector with coefficients in `{-1, 0, 1}`.
///
/// Exactly `hamming_weight` entries are non-zero.
///
/// # Panics
///
/// Panics if `hamming_weight > len`.
pub fn ternary_coefficients<R: Rng + ?Sized>(
    len: usize,
    hamming_weight: usize,
    rng: &mut R,
) -> Vec<i64> {
    assert!(
        hamming_weight <= len,
        "ternary_coefficients: hamming_weight must be <= len"
    );
    let mut out = vec![0i64; len];
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    for &idx in indices.iter().take(hamming_weight) {
        out[idx] = if rng.random_bool(0.5) { 1 } else { -1 };
    }
    out
}

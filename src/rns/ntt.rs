//! Negacyclic number-theoretic transform over `Z_q[X] / (X^N + 1)`.
//!
//! The transform twists the input by powers of a primitive `2N`-th root `psi`
//! and then runs an iterative radix-2 Cooley-Tukey NTT with `omega = psi^2`.
//! After the forward transform, slot `k` holds the evaluation of the input at
//! `psi^(2k + 1)`, so pointwise products correspond to negacyclic convolution.

use super::errors::{RnsError, RnsResult};
use crate::math::{add_mod, is_ntt_friendly_prime, mod_inverse, mod_pow, mul_mod, sub_mod};

/// Precomputed roots for one prime and one ring degree.
#[derive(Debug, Clone)]
pub struct NttTable {
    modulus: u64,
    degree: usize,
    /// `psi^i` for `i in 0..N`
    psi_powers: Vec<u64>,
    /// `psi^-i * N^-1` for `i in 0..N`, folding the inverse normalization
    psi_inv_powers: Vec<u64>,
    /// `omega^j` for `j in 0..N/2`
    roots: Vec<u64>,
    /// `omega^-j` for `j in 0..N/2`
    inv_roots: Vec<u64>,
}

impl NttTable {
    pub fn new(modulus: u64, degree: usize) -> RnsResult<Self> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(RnsError::InvalidDegree { degree });
        }
        if !is_ntt_friendly_prime(modulus, degree as u64) {
            return Err(RnsError::NonNttFriendlyModulus { modulus, degree });
        }

        let psi = find_primitive_root(modulus, degree);
        let psi_inv = mod_inverse(psi, modulus);
        let n_inv = mod_inverse(degree as u64, modulus);

        let mut psi_powers = Vec::with_capacity(degree);
        let mut psi_inv_powers = Vec::with_capacity(degree);
        let mut forward = 1u64;
        let mut backward = n_inv;
        for _ in 0..degree {
            psi_powers.push(forward);
            psi_inv_powers.push(backward);
            forward = mul_mod(forward, psi, modulus);
            backward = mul_mod(backward, psi_inv, modulus);
        }

        let omega = mul_mod(psi, psi, modulus);
        let omega_inv = mod_inverse(omega, modulus);
        let half = degree / 2;
        let mut roots = Vec::with_capacity(half);
        let mut inv_roots = Vec::with_capacity(half);
        let mut w = 1u64;
        let mut w_inv = 1u64;
        for _ in 0..half {
            roots.push(w);
            inv_roots.push(w_inv);
            w = mul_mod(w, omega, modulus);
            w_inv = mul_mod(w_inv, omega_inv, modulus);
        }

        Ok(Self {
            modulus,
            degree,
            psi_powers,
            psi_inv_powers,
            roots,
            inv_roots,
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Coefficient domain to evaluation domain, in place.
    pub fn forward(&self, values: &mut [u64]) {
        debug_assert_eq!(values.len(), self.degree);
        let q = self.modulus;
        for (v, &p) in values.iter_mut().zip(&self.psi_powers) {
            *v = mul_mod(*v, p, q);
        }
        cyclic_ntt(values, &self.roots, q);
    }

    /// Evaluation domain to coefficient domain, in place.
    pub fn inverse(&self, values: &mut [u64]) {
        debug_assert_eq!(values.len(), self.degree);
        let q = self.modulus;
        cyclic_ntt(values, &self.inv_roots, q);
        for (v, &p) in values.iter_mut().zip(&self.psi_inv_powers) {
            *v = mul_mod(*v, p, q);
        }
    }
}

fn cyclic_ntt(values: &mut [u64], roots: &[u64], modulus: u64) {
    let n = values.len();
    bit_reverse_permute(values);
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = n / len;
        for start in (0..n).step_by(len) {
            for offset in 0..half {
                let left = start + offset;
                let right = left + half;
                let t = mul_mod(values[right], roots[offset * step], modulus);
                let u = values[left];
                values[left] = add_mod(u, t, modulus);
                values[right] = sub_mod(u, t, modulus);
            }
        }
        len *= 2;
    }
}

fn bit_reverse_permute(values: &mut [u64]) {
    let bits = values.len().trailing_zeros();
    for i in 0..values.len() {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            values.swap(i, j);
        }
    }
}

/// Finds a primitive `2 * degree`-th root of unity modulo an NTT-friendly prime.
///
/// The order is a power of two, so a root `r` of order dividing `2N` is
/// primitive exactly when `r^N = -1`.
fn find_primitive_root(modulus: u64, degree: usize) -> u64 {
    let order = 2 * degree as u64;
    let exponent = (modulus - 1) / order;
    (2..modulus)
        .map(|candidate| mod_pow(candidate, exponent, modulus))
        .find(|&root| mod_pow(root, degree as u64, modulus) == modulus - 1)
        .expect("an NTT-friendly prime always has a primitive 2N-th root")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schoolbook_negacyclic(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
        let n = a.len();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                let prod = mul_mod(a[i], b[j], q);
                if i + j < n {
                    out[i + j] = add_mod(out[i + j], prod, q);
                } else {
                    out[i + j - n] = sub_mod(out[i + j - n], prod, q);
                }
            }
        }
        out
    }

    #[test]
    fn rejects_non_friendly_modulus() {
        assert!(matches!(
            NttTable::new(19, 8),
            Err(RnsError::NonNttFriendlyModulus { modulus: 19, degree: 8 })
        ));
    }

    #[test]
    fn rejects_non_power_of_two_degree() {
        assert!(matches!(
            NttTable::new(97, 12),
            Err(RnsError::InvalidDegree { degree: 12 })
        ));
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let table = NttTable::new(97, 8).unwrap();
        let original = vec![1u64, 96, 3, 4, 92, 6, 7, 89];
        let mut values = original.clone();
        table.forward(&mut values);
        assert_ne!(values, original);
        table.inverse(&mut values);
        assert_eq!(values, original);
    }

    #[test]
    fn pointwise_product_matches_schoolbook() {
        let q = 1_073_750_017u64;
        let table = NttTable::new(q, 16).unwrap();
        let a: Vec<u64> = (0..16).map(|i| (i * 7919 + 3) % q).collect();
        let b: Vec<u64> = (0..16).map(|i| (i * i * 104_729 + 11) % q).collect();
        let expected = schoolbook_negacyclic(&a, &b, q);

        let mut fa = a.clone();
        let mut fb = b.clone();
        table.forward(&mut fa);
        table.forward(&mut fb);
        let mut product: Vec<u64> = fa.iter().zip(&fb).map(|(&x, &y)| mul_mod(x, y, q)).collect();
        table.inverse(&mut product);

        assert_eq!(product, expected);
    }

    #[test]
    fn x_to_the_n_wraps_to_minus_one() {
        let q = 17u64;
        let table = NttTable::new(q, 8).unwrap();
        let mut a = vec![0u64; 8];
        a[7] = 1;
        let mut b = vec![0u64; 8];
        b[1] = 1;
        table.forward(&mut a);
        table.forward(&mut b);
        let mut product: Vec<u64> = a.iter().zip(&b).map(|(&x, &y)| mul_mod(x, y, q)).collect();
        table.inverse(&mut product);
        let mut expected = vec![0u64; 8];
        expected[0] = q - 1;
        assert_eq!(product, expected);
    }
}

use std::{
    ops::{AddAssign, MulAssign, Neg},
    sync::Arc,
};

use rand::Rng;

use super::{
    basis::RnsBasis,
    errors::{RnsError, RnsResult},
};
use crate::math::{
    add_mod, center, gaussian_coefficients, mod_inverse, mul_mod, neg_mod, reduce_i64, sub_mod,
    ternary_coefficients, uniform_coefficients,
};

/// A polynomial in `Z_{q_0} x ... x Z_{q_{L-1}}[X] / (X^N + 1)`.
///
/// Stores one residue vector per RNS channel. The `in_ntt_domain` flag
/// tracks whether the vectors hold coefficients or NTT evaluations.
///
/// # Invariants
/// - `channels.len() == basis.channel_count()`
/// - `channels[i].len() == basis.degree()`
/// - Every `channels[i][j] < basis.moduli()[i]`
#[derive(Clone, Debug)]
pub struct RnsPoly {
    channels: Vec<Vec<u64>>,
    basis: Arc<RnsBasis>,
    in_ntt_domain: bool,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl RnsPoly {
    /// Creates the zero polynomial in coefficient domain.
    pub fn zero(basis: Arc<RnsBasis>) -> Self {
        let channels = vec![vec![0u64; basis.degree()]; basis.channel_count()];
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Creates a polynomial from signed integer coefficients.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len()` differs from the ring degree.
    pub fn from_coeffs(coeffs: &[i64], basis: Arc<RnsBasis>) -> Self {
        assert_eq!(
            coeffs.len(),
            basis.degree(),
            "from_coeffs: coefficient count must match the ring degree"
        );
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| coeffs.iter().map(|&c| reduce_i64(c, q)).collect())
            .collect();
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Samples with coefficients uniform in `[0, q_i)` per channel.
    ///
    /// Uniform residues are uniform in either domain, so the caller picks the
    /// domain the sample is tagged with.
    pub fn sample_uniform<R: Rng + ?Sized>(
        basis: Arc<RnsBasis>,
        in_ntt_domain: bool,
        rng: &mut R,
    ) -> Self {
        let degree = basis.degree();
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| uniform_coefficients(degree, q, rng))
            .collect();
        Self {
            channels,
            basis,
            in_ntt_domain,
        }
    }

    /// Samples rounded Gaussian noise with the given standard deviation.
    pub fn sample_gaussian<R: Rng + ?Sized>(
        std_dev: f64,
        basis: Arc<RnsBasis>,
        rng: &mut R,
    ) -> Self {
        let noise = gaussian_coefficients(basis.degree(), std_dev, rng);
        Self::from_coeffs(&noise, basis)
    }

    /// Samples a ternary polynomial with exactly `hamming_weight` non-zero coefficients.
    pub fn sample_ternary<R: Rng + ?Sized>(
        hamming_weight: usize,
        basis: Arc<RnsBasis>,
        rng: &mut R,
    ) -> Self {
        let ternary = ternary_coefficients(basis.degree(), hamming_weight, rng);
        Self::from_coeffs(&ternary, basis)
    }
}

// ─── Accessors & domain conversion ───────────────────────────────────────────

impl RnsPoly {
    pub fn channels(&self) -> &[Vec<u64>] {
        &self.channels
    }

    pub fn basis(&self) -> &Arc<RnsBasis> {
        &self.basis
    }

    pub fn degree(&self) -> usize {
        self.basis.degree()
    }

    pub fn is_ntt_domain(&self) -> bool {
        self.in_ntt_domain
    }

    /// Converts to NTT domain in-place (no-op if already there).
    pub fn to_ntt_domain(&mut self) {
        if self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).forward(channel);
        }
        self.in_ntt_domain = true;
    }

    /// Converts to coefficient domain in-place (no-op if already there).
    pub fn to_coeff_domain(&mut self) {
        if !self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).inverse(channel);
        }
        self.in_ntt_domain = false;
    }

    /// Keeps the channels of `target`, which must be a prefix of this basis.
    pub fn drop_to(&self, target: Arc<RnsBasis>) -> RnsResult<Self> {
        if !self.basis.starts_with(&target) {
            return Err(RnsError::NotAPrefix {
                current: self.basis.channel_count(),
                target: target.channel_count(),
            });
        }
        let keep = target.channel_count();
        Ok(Self {
            channels: self.channels[..keep].to_vec(),
            basis: target,
            in_ntt_domain: self.in_ntt_domain,
        })
    }

    /// Copies the listed channels into a polynomial over `target`.
    ///
    /// `target.moduli()[k]` must equal `self.basis.moduli()[indices[k]]`.
    pub fn select_channels(&self, indices: &[usize], target: Arc<RnsBasis>) -> RnsResult<Self> {
        if indices.len() != target.channel_count() {
            return Err(RnsError::ChannelCountMismatch {
                expected: target.channel_count(),
                actual: indices.len(),
            });
        }
        debug_assert!(
            indices
                .iter()
                .zip(target.moduli())
                .all(|(&i, &q)| self.basis.moduli()[i] == q),
            "select_channels: target moduli must match the selected channels"
        );
        Ok(Self {
            channels: indices.iter().map(|&i| self.channels[i].clone()).collect(),
            basis: target,
            in_ntt_domain: self.in_ntt_domain,
        })
    }

    /// Centered residues of one channel, in coefficient domain.
    pub fn channel_centered(&self, channel: usize) -> Vec<i64> {
        let q = self.basis.moduli()[channel];
        let mut values = self.channels[channel].clone();
        if self.in_ntt_domain {
            self.basis.ntt_table(channel).inverse(&mut values);
        }
        values.into_iter().map(|v| center(v, q)).collect()
    }

    /// CRT-reconstructs every coefficient, centered in `(-Q/2, Q/2]`.
    #[cfg(test)]
    pub(crate) fn to_centered_coeffs(&self) -> Vec<i128> {
        let tmp;
        let channels: &[Vec<u64>] = if self.in_ntt_domain {
            let mut clone = self.clone();
            clone.to_coeff_domain();
            tmp = clone;
            &tmp.channels
        } else {
            &self.channels
        };

        let mut residues = vec![0u64; self.basis.channel_count()];
        (0..self.degree())
            .map(|i| {
                for (slot, channel) in residues.iter_mut().zip(channels) {
                    *slot = channel[i];
                }
                self.basis.reconstruct_centered_coeff(&residues)
            })
            .collect()
    }
}

// ─── Scalar and rounding operations ──────────────────────────────────────────

impl RnsPoly {
    /// Multiplies every coefficient by a signed integer. Works in both domains.
    pub fn mul_scalar_assign(&mut self, scalar: i64) {
        for (channel, &q) in self.channels.iter_mut().zip(self.basis.moduli()) {
            let s = reduce_i64(scalar, q);
            for c in channel.iter_mut() {
                *c = mul_mod(*c, s, q);
            }
        }
    }

    /// Multiplies one channel by a residue. Used to plant `P * s^2` into a
    /// single CRT component of a key-switching key.
    pub fn mul_channel_scalar_assign(&mut self, channel: usize, scalar: u64) {
        let q = self.basis.moduli()[channel];
        let s = scalar % q;
        for c in self.channels[channel].iter_mut() {
            *c = mul_mod(*c, s, q);
        }
    }

    /// Adds the constant polynomial `scalar`.
    ///
    /// In coefficient domain this touches the constant coefficient only. In
    /// NTT domain a constant evaluates to itself at every root.
    pub fn add_scalar_assign(&mut self, scalar: i64) {
        for (channel, &q) in self.channels.iter_mut().zip(self.basis.moduli()) {
            let s = reduce_i64(scalar, q);
            if self.in_ntt_domain {
                for c in channel.iter_mut() {
                    *c = add_mod(*c, s, q);
                }
            } else {
                channel[0] = add_mod(channel[0], s, q);
            }
        }
    }

    /// Divides by the last modulus with rounding and drops that channel.
    ///
    /// Computes `(x - [x]_{q_last}) / q_last` in every remaining channel, with
    /// `[x]_{q_last}` taken centered. `target` must be this basis without its
    /// last channel. The result is in coefficient domain.
    pub fn divide_round_by_last(&self, target: Arc<RnsBasis>) -> RnsResult<Self> {
        let count = self.basis.channel_count();
        if count < 2 {
            return Err(RnsError::InvalidModDrop);
        }
        if target.channel_count() != count - 1 || !self.basis.starts_with(&target) {
            return Err(RnsError::NotAPrefix {
                current: count,
                target: target.channel_count(),
            });
        }

        let last = self.channel_centered(count - 1);
        let q_last = self.basis.moduli()[count - 1];

        let mut source = self.clone();
        source.to_coeff_domain();

        let channels = source
            .channels
            .into_iter()
            .take(count - 1)
            .zip(target.moduli())
            .map(|(mut channel, &q)| {
                let q_last_inv = mod_inverse(q_last % q, q);
                for (c, &r) in channel.iter_mut().zip(&last) {
                    let diff = sub_mod(*c, reduce_i64(r, q), q);
                    *c = mul_mod(diff, q_last_inv, q);
                }
                channel
            })
            .collect();

        Ok(Self {
            channels,
            basis: target,
            in_ntt_domain: false,
        })
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

impl AddAssign<&RnsPoly> for RnsPoly {
    /// Coefficient-wise addition modulo each `q_i`. Both operands must share
    /// the basis and the domain.
    fn add_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(*self.basis, *rhs.basis, "add_assign: basis mismatch");
        debug_assert_eq!(
            self.in_ntt_domain, rhs.in_ntt_domain,
            "add_assign: domain mismatch"
        );
        for ((channel, other), &q) in self
            .channels
            .iter_mut()
            .zip(&rhs.channels)
            .zip(self.basis.moduli())
        {
            for (a, &b) in channel.iter_mut().zip(other) {
                *a = add_mod(*a, b, q);
            }
        }
    }
}

impl MulAssign<&RnsPoly> for RnsPoly {
    /// Polynomial multiplication in `Z_Q[X]/(X^N + 1)`.
    ///
    /// Pointwise when both operands are already in NTT domain. Otherwise the
    /// operands are transformed, multiplied, and `self` is returned to the
    /// domain it started in.
    fn mul_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(*self.basis, *rhs.basis, "mul_assign: basis mismatch");
        let restore_coeff = !self.in_ntt_domain;
        self.to_ntt_domain();

        let transformed;
        let rhs = if rhs.in_ntt_domain {
            rhs
        } else {
            let mut clone = rhs.clone();
            clone.to_ntt_domain();
            transformed = clone;
            &transformed
        };

        for ((channel, other), &q) in self
            .channels
            .iter_mut()
            .zip(&rhs.channels)
            .zip(self.basis.moduli())
        {
            for (a, &b) in channel.iter_mut().zip(other) {
                *a = mul_mod(*a, b, q);
            }
        }

        if restore_coeff {
            self.to_coeff_domain();
        }
    }
}

impl Neg for RnsPoly {
    type Output = Self;

    /// Coefficient-wise negation modulo each `q_i`. Works in both domains.
    fn neg(mut self) -> Self {
        for (channel, &q) in self.channels.iter_mut().zip(self.basis.moduli()) {
            for c in channel.iter_mut() {
                *c = neg_mod(*c, q);
            }
        }
        self
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

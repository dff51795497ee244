//! Key material for the RNS-CKKS backend.
//!
//! - Secret key: sparse ternary `s`, stored over the full key-switching basis
//!   `q_0 .. q_D, P` so every level can borrow a prefix of it.
//! - Public key: `(b, a)` with `b = -a * s + e` over the top level.
//! - Relinearization key: one component per chain prime `q_i`, satisfying
//!   `b_i + a_i * s = e_i + P * s^2 * [j == i]  (mod q_j)` and
//!   `b_i + a_i * s = e_i  (mod P)`.
//!
//! All key polynomials are kept in NTT domain.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use super::context::CkksContext;
use super::errors::CkksResult;
use crate::rns::{RnsBasis, RnsPoly, RnsResult};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Hamming weight {weight} exceeds ring dimension {degree}")]
    InvalidHammingWeight { weight: usize, degree: usize },
    #[error("Invalid error standard deviation: {0} (must be positive)")]
    InvalidErrorStd(f64),
    #[error("Relinearization key has no component for chain prime {0}")]
    MissingComponent(usize),
}

#[derive(Debug, Clone)]
pub struct SecretKey {
    pub poly: RnsPoly,
}

#[derive(Debug, Clone)]
pub struct PublicKey {
    pub b: RnsPoly,
    pub a: RnsPoly,
}

/// Hybrid key-switching key for `s^2`, one digit per chain prime.
#[derive(Debug, Clone)]
pub struct RelinearizationKey {
    components: Vec<(RnsPoly, RnsPoly)>,
}

fn validate(context: &CkksContext) -> Result<(), KeyError> {
    let keygen = &context.params().keygen;
    let degree = context.params().poly_modulus_degree;
    if keygen.hamming_weight > degree {
        return Err(KeyError::InvalidHammingWeight {
            weight: keygen.hamming_weight,
            degree,
        });
    }
    if !(keygen.error_std.is_finite() && keygen.error_std > 0.0) {
        return Err(KeyError::InvalidErrorStd(keygen.error_std));
    }
    Ok(())
}

fn sample_error<R: Rng + ?Sized>(std_dev: f64, basis: Arc<RnsBasis>, rng: &mut R) -> RnsPoly {
    let mut e = RnsPoly::sample_gaussian(std_dev, basis, rng);
    e.to_ntt_domain();
    e
}

impl SecretKey {
    pub fn generate<R: Rng + ?Sized>(context: &CkksContext, rng: &mut R) -> CkksResult<Self> {
        validate(context)?;
        let weight = context.params().keygen.hamming_weight;
        let mut poly = RnsPoly::sample_ternary(weight, context.full_key_basis().clone(), rng);
        poly.to_ntt_domain();
        Ok(Self { poly })
    }

    /// Secret restricted to the channels of `basis`, which must be a prefix
    /// of the full key basis.
    pub fn restricted_to(&self, basis: &Arc<RnsBasis>) -> RnsResult<RnsPoly> {
        self.poly.drop_to(basis.clone())
    }
}

impl PublicKey {
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey,
        context: &CkksContext,
        rng: &mut R,
    ) -> CkksResult<Self> {
        validate(context)?;
        let basis = context.level_basis(context.max_level())?.clone();
        let s = secret_key.restricted_to(&basis)?;

        let a = RnsPoly::sample_uniform(basis.clone(), true, rng);
        let e = sample_error(context.params().keygen.error_std, basis, rng);

        // b = -(a * s) + e
        let mut a_times_s = a.clone();
        a_times_s *= &s;
        let mut b = -a_times_s;
        b += &e;

        Ok(Self { b, a })
    }
}

impl RelinearizationKey {
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey,
        context: &CkksContext,
        rng: &mut R,
    ) -> CkksResult<Self> {
        validate(context)?;
        let basis = context.full_key_basis().clone();
        let special = context.params().special_modulus;
        let error_std = context.params().keygen.error_std;

        let mut s_squared = secret_key.poly.clone();
        s_squared *= &secret_key.poly;

        let chain = context.max_level() + 1;
        let mut components = Vec::with_capacity(chain);
        for i in 0..chain {
            let a = RnsPoly::sample_uniform(basis.clone(), true, rng);
            let e = sample_error(error_std, basis.clone(), rng);

            let mut a_times_s = a.clone();
            a_times_s *= &secret_key.poly;
            let mut b = -a_times_s;
            b += &e;

            // P * s^2 lives in channel i only
            let mut gadget = s_squared.clone();
            for channel in 0..basis.channel_count() {
                let factor = if channel == i { special } else { 0 };
                gadget.mul_channel_scalar_assign(channel, factor);
            }
            b += &gadget;

            components.push((b, a));
        }

        Ok(Self { components })
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component `i` restricted to the key basis of `level`.
    pub fn component_at_level(
        &self,
        index: usize,
        level: usize,
        context: &CkksContext,
    ) -> CkksResult<(RnsPoly, RnsPoly)> {
        let (b, a) = self
            .components
            .get(index)
            .ok_or(KeyError::MissingComponent(index))?;
        let target = context.key_basis(level)?.clone();
        let special_channel = context.max_level() + 1;
        let indices: Vec<usize> = (0..=level).chain(std::iter::once(special_channel)).collect();
        Ok((
            b.select_channels(&indices, target.clone())?,
            a.select_channels(&indices, target)?,
        ))
    }
}

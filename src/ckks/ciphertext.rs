use super::context::CkksContext;
use super::errors::{CkksError, CkksResult};
use super::keys::RelinearizationKey;
use crate::rns::RnsPoly;

// 2^62, the widest integer constant a scalar multiply accepts.
const SCALAR_LIMIT: f64 = 4_611_686_018_427_387_904.0;

/// An RLWE ciphertext `(c0, c1[, c2])` decrypting to `c0 + c1*s [+ c2*s^2]`.
///
/// Components are kept in NTT domain over the basis of `level`. `scale` is
/// the factor the encrypted values are multiplied by.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    pub c0: RnsPoly,
    pub c1: RnsPoly,
    pub c2: Option<RnsPoly>,
    pub level: usize,
    pub scale: f64,
}

fn scales_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * 1e-9
}

fn checked_scalar(value: f64, scale: f64) -> CkksResult<i64> {
    let scaled = (value * scale).round();
    if !scaled.is_finite() || scaled.abs() >= SCALAR_LIMIT {
        return Err(CkksError::ConstantOutOfRange { value, scale });
    }
    Ok(scaled as i64)
}

// ─── Homomorphic operations ───────────────────────────────────────────────────

impl Ciphertext {
    pub fn is_linear(&self) -> bool {
        self.c2.is_none()
    }

    pub fn add(&self, other: &Ciphertext) -> CkksResult<Ciphertext> {
        if self.level != other.level {
            return Err(CkksError::LevelMismatch {
                expected: self.level,
                actual: other.level,
            });
        }
        if !scales_match(self.scale, other.scale) {
            return Err(CkksError::ScaleMismatch {
                expected: self.scale,
                actual: other.scale,
            });
        }

        let mut c0 = self.c0.clone();
        c0 += &other.c0;
        let mut c1 = self.c1.clone();
        c1 += &other.c1;
        let c2 = match (&self.c2, &other.c2) {
            (Some(a), Some(b)) => {
                let mut sum = a.clone();
                sum += b;
                Some(sum)
            }
            (Some(a), None) | (None, Some(a)) => Some(a.clone()),
            (None, None) => None,
        };

        Ok(Ciphertext {
            c0,
            c1,
            c2,
            level: self.level,
            scale: self.scale,
        })
    }

    /// Tensor product. The result has three components until relinearized.
    pub fn mul(&self, other: &Ciphertext) -> CkksResult<Ciphertext> {
        if self.level != other.level {
            return Err(CkksError::LevelMismatch {
                expected: self.level,
                actual: other.level,
            });
        }
        if !self.is_linear() || !other.is_linear() {
            return Err(CkksError::NotRelinearized {
                operation: "multiplication",
            });
        }

        // (c0 + c1*s) * (c0' + c1'*s) = d0 + d1*s + d2*s^2
        let mut d0 = self.c0.clone();
        d0 *= &other.c0;

        let mut d1 = self.c0.clone();
        d1 *= &other.c1;
        let mut cross = self.c1.clone();
        cross *= &other.c0;
        d1 += &cross;

        let mut d2 = self.c1.clone();
        d2 *= &other.c1;

        Ok(Ciphertext {
            c0: d0,
            c1: d1,
            c2: Some(d2),
            level: self.level,
            scale: self.scale * other.scale,
        })
    }

    /// Folds `c2` back into `(c0, c1)` with hybrid key switching.
    ///
    /// `c2` is split into its residues modulo each chain prime. Each digit is
    /// lifted to the key basis (level primes plus the special prime), multiplied
    /// by its key component, and the accumulated sum is divided by the special
    /// prime with rounding.
    pub fn relinearize(
        &self,
        context: &CkksContext,
        relin_key: &RelinearizationKey,
    ) -> CkksResult<Ciphertext> {
        let Some(c2) = &self.c2 else {
            return Ok(self.clone());
        };
        let level = self.level;
        let key_basis = context.key_basis(level)?.clone();

        let mut acc_b = RnsPoly::zero(key_basis.clone());
        acc_b.to_ntt_domain();
        let mut acc_a = acc_b.clone();

        for i in 0..=level {
            let mut digit = RnsPoly::from_coeffs(&c2.channel_centered(i), key_basis.clone());
            digit.to_ntt_domain();
            let (b_i, a_i) = relin_key.component_at_level(i, level, context)?;

            let mut term = digit.clone();
            term *= &b_i;
            acc_b += &term;

            digit *= &a_i;
            acc_a += &digit;
        }

        let level_basis = context.level_basis(level)?.clone();
        let mut delta_b = acc_b.divide_round_by_last(level_basis.clone())?;
        let mut delta_a = acc_a.divide_round_by_last(level_basis)?;
        delta_b.to_ntt_domain();
        delta_a.to_ntt_domain();

        let mut c0 = self.c0.clone();
        c0 += &delta_b;
        let mut c1 = self.c1.clone();
        c1 += &delta_a;

        Ok(Ciphertext {
            c0,
            c1,
            c2: None,
            level,
            scale: self.scale,
        })
    }

    /// Divides by the last prime of the current level and drops one level.
    pub fn rescale(&self, context: &CkksContext) -> CkksResult<Ciphertext> {
        if !self.is_linear() {
            return Err(CkksError::NotRelinearized {
                operation: "rescaling",
            });
        }
        if self.level == 0 {
            return Err(CkksError::RescaleAtBottom);
        }
        let prime = context.params().coeff_modulus[self.level];
        let target = context.level_basis(self.level - 1)?.clone();

        let mut c0 = self.c0.divide_round_by_last(target.clone())?;
        let mut c1 = self.c1.divide_round_by_last(target)?;
        c0.to_ntt_domain();
        c1.to_ntt_domain();

        Ok(Ciphertext {
            c0,
            c1,
            c2: None,
            level: self.level - 1,
            scale: self.scale / prime as f64,
        })
    }

    /// Drops primes without dividing, keeping the scale.
    pub fn mod_switch_to(&self, context: &CkksContext, level: usize) -> CkksResult<Ciphertext> {
        if level > self.level {
            return Err(CkksError::LevelMismatch {
                expected: self.level,
                actual: level,
            });
        }
        if level == self.level {
            return Ok(self.clone());
        }
        let target = context.level_basis(level)?.clone();
        Ok(Ciphertext {
            c0: self.c0.drop_to(target.clone())?,
            c1: self.c1.drop_to(target.clone())?,
            c2: self.c2.as_ref().map(|c| c.drop_to(target)).transpose()?,
            level,
            scale: self.scale,
        })
    }

    /// Multiplies by the integer `round(value * multiplier)`; the scale grows
    /// by `multiplier`.
    pub fn mul_const(&self, value: f64, multiplier: f64) -> CkksResult<Ciphertext> {
        let scalar = checked_scalar(value, multiplier)?;
        let mut out = self.clone();
        out.c0.mul_scalar_assign(scalar);
        out.c1.mul_scalar_assign(scalar);
        if let Some(c2) = out.c2.as_mut() {
            c2.mul_scalar_assign(scalar);
        }
        out.scale = self.scale * multiplier;
        Ok(out)
    }

    /// Adds `value` to every slot at the current scale.
    pub fn add_const(&self, value: f64) -> CkksResult<Ciphertext> {
        let scalar = checked_scalar(value, self.scale)?;
        let mut out = self.clone();
        out.c0.add_scalar_assign(scalar);
        Ok(out)
    }
}

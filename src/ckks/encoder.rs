//! Canonical-embedding slot encoder.
//!
//! A real polynomial `m(X)` in `R[X]/(X^N + 1)` is identified with its values
//! at the primitive `2N`-th roots `zeta^t` for odd `t`. Slot `j` is the value at
//! `t = 5^j mod 2N`; the value at `-t` is its conjugate, so the `N/2` slots
//! determine the polynomial. Both directions reduce to one length-`2N` FFT:
//!
//! - decode: `z_j = sum_k m_k * zeta^(k * 5^j)`, an unnormalized inverse DFT
//!   sampled at the rotation-group indices.
//! - encode: `m_k = (1/N) * sum_{t odd} v_t * zeta^(-k t)`, a forward DFT of
//!   the slot vector scattered onto the odd indices.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{count} values do not tile {slots} slots")]
    SlotMismatch { count: usize, slots: usize },

    #[error("Coefficient {value:.3e} overflows the integer range")]
    CoefficientOverflow { value: f64 },

    #[error("Invalid scale: {scale}")]
    InvalidScale { scale: f64 },
}

pub type EncodingResult<T> = Result<T, EncodingError>;

// 2^62, the largest magnitude a coefficient may carry before reduction.
const COEFF_LIMIT: f64 = 4_611_686_018_427_387_904.0;

pub struct SlotEncoder {
    degree: usize,
    /// `5^j mod 2N` for `j in 0..N/2`
    rotation_group: Vec<usize>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for SlotEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotEncoder")
            .field("degree", &self.degree)
            .finish_non_exhaustive()
    }
}

impl SlotEncoder {
    pub fn new(degree: usize) -> EncodingResult<Self> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(EncodingError::InvalidInput {
                message: format!("degree {degree} must be a power of two >= 2"),
            });
        }
        let m = 2 * degree;
        let mut rotation_group = Vec::with_capacity(degree / 2);
        let mut t = 1usize;
        for _ in 0..degree / 2 {
            rotation_group.push(t);
            t = (t * 5) % m;
        }

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(m);
        let inverse = planner.plan_fft_inverse(m);

        Ok(Self {
            degree,
            rotation_group,
            forward,
            inverse,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn slot_count(&self) -> usize {
        self.degree / 2
    }

    /// Encodes real values at `scale` into integer coefficients.
    ///
    /// A vector shorter than the slot count is repeated cyclically, so its
    /// length must divide the slot count.
    pub fn encode(&self, values: &[f64], scale: f64) -> EncodingResult<Vec<i64>> {
        let slots = self.slot_count();
        if values.is_empty() || values.len() > slots || slots % values.len() != 0 {
            return Err(EncodingError::SlotMismatch {
                count: values.len(),
                slots,
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EncodingError::InvalidScale { scale });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EncodingError::InvalidInput {
                message: format!("non-finite value {bad}"),
            });
        }

        let m = 2 * self.degree;
        let mut buffer = vec![Complex64::new(0.0, 0.0); m];
        for (j, &t) in self.rotation_group.iter().enumerate() {
            let v = values[j % values.len()] * scale;
            buffer[t] = Complex64::new(v, 0.0);
            buffer[m - t] = Complex64::new(v, 0.0);
        }
        self.forward.process(&mut buffer);

        let n = self.degree as f64;
        buffer[..self.degree]
            .iter()
            .map(|c| {
                let coeff = (c.re / n).round();
                if coeff.abs() >= COEFF_LIMIT {
                    Err(EncodingError::CoefficientOverflow { value: coeff })
                } else {
                    Ok(coeff as i64)
                }
            })
            .collect()
    }

    /// Decodes the first `count` slots of a polynomial carried at `scale`.
    pub fn decode(&self, coeffs: &[i64], scale: f64, count: usize) -> EncodingResult<Vec<f64>> {
        if coeffs.len() != self.degree {
            return Err(EncodingError::InvalidInput {
                message: format!(
                    "expected {} coefficients, got {}",
                    self.degree,
                    coeffs.len()
                ),
            });
        }
        if count > self.slot_count() {
            return Err(EncodingError::SlotMismatch {
                count,
                slots: self.slot_count(),
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EncodingError::InvalidScale { scale });
        }

        let mut buffer = vec![Complex64::new(0.0, 0.0); 2 * self.degree];
        for (slot, &c) in buffer.iter_mut().zip(coeffs) {
            *slot = Complex64::new(c as f64, 0.0);
        }
        self.inverse.process(&mut buffer);

        Ok(self.rotation_group[..count]
            .iter()
            .map(|&t| buffer[t].re / scale)
            .collect())
    }
}

use super::errors::{CkksError, CkksResult};
use crate::math::is_ntt_friendly_prime;

/// Noise and secret distribution used at key generation and encryption.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyGenConfig {
    /// Standard deviation of the rounded Gaussian error.
    pub error_std: f64,
    /// Non-zero coefficients in the ternary secret and in the encryption mask.
    pub hamming_weight: usize,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            error_std: 3.2,
            hamming_weight: 64,
        }
    }
}

/// Encryption parameters produced by the compiler.
///
/// `coeff_modulus[0]` is the base prime that holds decrypted outputs;
/// `coeff_modulus[1..]` are consumed one per rescale, last first. The special
/// prime only ever appears inside key switching.
#[derive(Debug, Clone, PartialEq)]
pub struct CkksParams {
    pub poly_modulus_degree: usize,
    pub coeff_modulus: Vec<u64>,
    pub special_modulus: u64,
    pub keygen: KeyGenConfig,
}

impl CkksParams {
    /// Index of the top level, which is where fresh ciphertexts live.
    pub fn max_level(&self) -> usize {
        self.coeff_modulus.len().saturating_sub(1)
    }

    /// Number of complex slots per ciphertext.
    pub fn slot_count(&self) -> usize {
        self.poly_modulus_degree / 2
    }

    /// Total modulus bits, special prime included.
    pub fn total_modulus_bits(&self) -> f64 {
        self.coeff_modulus
            .iter()
            .chain(std::iter::once(&self.special_modulus))
            .map(|&q| (q as f64).log2())
            .sum()
    }

    pub fn validate(&self) -> CkksResult<()> {
        let n = self.poly_modulus_degree;
        if n < 2 || !n.is_power_of_two() {
            return Err(CkksError::InvalidParameter {
                message: format!("poly_modulus_degree {n} is not a power of two >= 2"),
            });
        }
        if self.coeff_modulus.is_empty() {
            return Err(CkksError::InvalidParameter {
                message: "coefficient modulus chain is empty".into(),
            });
        }
        let all = self
            .coeff_modulus
            .iter()
            .chain(std::iter::once(&self.special_modulus));
        for &q in all {
            if q >= 1 << 62 || !is_ntt_friendly_prime(q, n as u64) {
                return Err(CkksError::InvalidParameter {
                    message: format!("modulus {q} is not an NTT-friendly prime below 2^62"),
                });
            }
        }
        if !(self.keygen.error_std.is_finite() && self.keygen.error_std > 0.0) {
            return Err(CkksError::InvalidParameter {
                message: format!("error_std {} must be positive", self.keygen.error_std),
            });
        }
        if self.keygen.hamming_weight == 0 || self.keygen.hamming_weight > n {
            return Err(CkksError::InvalidParameter {
                message: format!(
                    "hamming_weight {} must be in 1..={n}",
                    self.keygen.hamming_weight
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> CkksParams {
        CkksParams {
            poly_modulus_degree: 8,
            coeff_modulus: vec![17, 97],
            special_modulus: 113,
            keygen: KeyGenConfig {
                error_std: 3.2,
                hamming_weight: 4,
            },
        }
    }

    #[test]
    fn accepts_consistent_params() {
        let params = small_params();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_level(), 1);
        assert_eq!(params.slot_count(), 4);
    }

    #[test]
    fn rejects_modulus_without_ntt_root() {
        let mut params = small_params();
        params.coeff_modulus[0] = 19;
        assert!(matches!(
            params.validate(),
            Err(CkksError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rejects_oversized_hamming_weight() {
        let mut params = small_params();
        params.keygen.hamming_weight = 9;
        assert!(params.validate().is_err());
    }
}

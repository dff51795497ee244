use std::sync::Arc;

use super::errors::{RnsError, RnsResult};
use super::ntt::NttTable;
#[cfg(test)]
use crate::math::{center, mod_inverse, mul_mod};

/// RNS basis: a set of distinct NTT-friendly primes sharing one ring degree.
///
/// Tables are reference-counted so that the per-level bases of a modulus
/// chain share the transforms of their common primes.
///
/// Invariant: `tables[i].modulus() == moduli[i]` and every table was built for
/// `degree`.
#[derive(Debug, Clone)]
pub struct RnsBasis {
    degree: usize,
    moduli: Vec<u64>,
    tables: Vec<Arc<NttTable>>,
}

impl PartialEq for RnsBasis {
    fn eq(&self, other: &Self) -> bool {
        self.degree == other.degree && self.moduli == other.moduli
    }
}

impl Eq for RnsBasis {}

impl RnsBasis {
    pub fn new(degree: usize, moduli: &[u64]) -> RnsResult<Self> {
        let tables = moduli
            .iter()
            .map(|&q| NttTable::new(q, degree).map(Arc::new))
            .collect::<RnsResult<Vec<_>>>()?;
        Self::from_tables(degree, tables)
    }

    pub fn from_tables(degree: usize, tables: Vec<Arc<NttTable>>) -> RnsResult<Self> {
        if tables.is_empty() {
            return Err(RnsError::EmptyBasis);
        }
        let mut moduli = Vec::with_capacity(tables.len());
        for table in &tables {
            if table.degree() != degree {
                return Err(RnsError::DegreeMismatch {
                    expected: degree,
                    actual: table.degree(),
                });
            }
            if moduli.contains(&table.modulus()) {
                return Err(RnsError::DuplicateModulus {
                    modulus: table.modulus(),
                });
            }
            moduli.push(table.modulus());
        }
        Ok(Self {
            degree,
            moduli,
            tables,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn ntt_table(&self, channel: usize) -> &NttTable {
        &self.tables[channel]
    }

    pub fn tables(&self) -> &[Arc<NttTable>] {
        &self.tables
    }

    pub fn channel_count(&self) -> usize {
        self.moduli.len()
    }

    /// Basis made of the first `len` channels.
    #[cfg(test)]
    pub(crate) fn prefix(&self, len: usize) -> RnsResult<Self> {
        if len == 0 || len > self.channel_count() {
            return Err(RnsError::NotAPrefix {
                current: self.channel_count(),
                target: len,
            });
        }
        Self::from_tables(self.degree, self.tables[..len].to_vec())
    }

    /// Whether `other` consists of this basis' leading channels.
    pub fn starts_with(&self, other: &RnsBasis) -> bool {
        self.degree == other.degree && self.moduli.starts_with(&other.moduli)
    }

    /// `log2` of the modulus product.
    #[cfg(test)]
    pub(crate) fn log_modulus(&self) -> f64 {
        self.moduli.iter().map(|&q| (q as f64).log2()).sum()
    }

    /// CRT-reconstructs a single coefficient and centers it in `(-Q/2, Q/2]`.
    ///
    /// Uses `x = sum_i [r_i * (Q/q_i)^-1]_{q_i} * (Q/q_i) mod Q`, where every
    /// summand is below `Q`.
    ///
    /// # Panics
    ///
    /// Panics if `Q` is `2^124` or wider.
    #[cfg(test)]
    pub(crate) fn reconstruct_centered_coeff(&self, residues: &[u64]) -> i128 {
        debug_assert_eq!(residues.len(), self.moduli.len());
        if self.moduli.len() == 1 {
            return center(residues[0], self.moduli[0]) as i128;
        }
        assert!(
            self.log_modulus() < 124.0,
            "reconstruct_centered_coeff: modulus product too wide for i128"
        );

        let q: u128 = self.moduli.iter().map(|&m| m as u128).product();
        let mut acc = 0u128;
        for (&r, &m) in residues.iter().zip(&self.moduli) {
            let qi = q / m as u128;
            let qi_inv = mod_inverse((qi % m as u128) as u64, m);
            let digit = mul_mod(r, qi_inv, m) as u128;
            acc += digit * qi;
            if acc >= q {
                acc -= q;
            }
        }

        if acc > q / 2 {
            acc as i128 - q as i128
        } else {
            acc as i128
        }
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::ciphertext::Ciphertext;
use super::encoder::SlotEncoder;
use super::errors::{CkksError, CkksResult};
use super::keys::{PublicKey, RelinearizationKey, SecretKey};
use super::params::CkksParams;
use crate::Valuation;
use crate::compiler::{Circuit, Instruction, Signature};
use crate::rns::{NttTable, RnsBasis, RnsPoly};

/// Named ciphertexts, keyed like a [`Valuation`].
pub type CiphertextMap = BTreeMap<String, Ciphertext>;

/// Precomputation shared by both halves of a key pair.
///
/// `level_bases[l]` holds `q_0 .. q_l`; `key_bases[l]` appends the special
/// prime. All bases share one NTT table per prime.
#[derive(Debug)]
pub struct CkksContext {
    params: CkksParams,
    level_bases: Vec<Arc<RnsBasis>>,
    key_bases: Vec<Arc<RnsBasis>>,
    encoder: SlotEncoder,
}

impl CkksContext {
    pub fn new(params: &CkksParams) -> CkksResult<Self> {
        params.validate()?;
        let degree = params.poly_modulus_degree;

        let chain_tables = params
            .coeff_modulus
            .iter()
            .map(|&q| NttTable::new(q, degree).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let special_table = Arc::new(NttTable::new(params.special_modulus, degree)?);

        let mut level_bases = Vec::with_capacity(chain_tables.len());
        let mut key_bases = Vec::with_capacity(chain_tables.len());
        for level in 0..chain_tables.len() {
            let tables = chain_tables[..=level].to_vec();
            level_bases.push(Arc::new(RnsBasis::from_tables(degree, tables.clone())?));

            let mut with_special = tables;
            with_special.push(special_table.clone());
            key_bases.push(Arc::new(RnsBasis::from_tables(degree, with_special)?));
        }

        Ok(Self {
            params: params.clone(),
            level_bases,
            key_bases,
            encoder: SlotEncoder::new(degree)?,
        })
    }

    pub fn params(&self) -> &CkksParams {
        &self.params
    }

    pub fn max_level(&self) -> usize {
        self.params.max_level()
    }

    pub fn encoder(&self) -> &SlotEncoder {
        &self.encoder
    }

    pub fn level_basis(&self, level: usize) -> CkksResult<&Arc<RnsBasis>> {
        self.level_bases
            .get(level)
            .ok_or(CkksError::LevelOutOfRange {
                level,
                chain: self.level_bases.len(),
            })
    }

    pub fn key_basis(&self, level: usize) -> CkksResult<&Arc<RnsBasis>> {
        self.key_bases.get(level).ok_or(CkksError::LevelOutOfRange {
            level,
            chain: self.key_bases.len(),
        })
    }

    /// Key basis of the top level: every chain prime plus the special prime.
    pub fn full_key_basis(&self) -> &Arc<RnsBasis> {
        &self.key_bases[self.key_bases.len() - 1]
    }
}

/// Everything needed to encrypt and evaluate, but not to decrypt.
///
/// Owns a ChaCha20 stream, seeded at key generation, for encryption randomness.
#[derive(Debug)]
pub struct PublicContext {
    context: Arc<CkksContext>,
    public_key: PublicKey,
    relin_key: RelinearizationKey,
    rng: ChaCha20Rng,
}

#[derive(Debug)]
pub struct SecretContext {
    context: Arc<CkksContext>,
    secret_key: SecretKey,
}

/// Generates a fresh key pair for `params`.
pub fn generate_keys<R: Rng + ?Sized>(
    params: &CkksParams,
    rng: &mut R,
) -> CkksResult<(PublicContext, SecretContext)> {
    let context = Arc::new(CkksContext::new(params)?);

    let secret_key = SecretKey::generate(&context, rng)?;
    let public_key = PublicKey::generate(&secret_key, &context, rng)?;
    let relin_key = RelinearizationKey::generate(&secret_key, &context, rng)?;

    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);

    Ok((
        PublicContext {
            context: context.clone(),
            public_key,
            relin_key,
            rng: ChaCha20Rng::from_seed(seed),
        },
        SecretContext {
            context,
            secret_key,
        },
    ))
}

// ─── Public side ──────────────────────────────────────────────────────────────

impl PublicContext {
    pub fn context(&self) -> &CkksContext {
        &self.context
    }

    /// Encodes and encrypts every input named by `signature`.
    pub fn encrypt(
        &mut self,
        inputs: &Valuation,
        signature: &Signature,
    ) -> CkksResult<CiphertextMap> {
        let mut encrypted = CiphertextMap::new();
        for (name, encoding) in &signature.inputs {
            let values = inputs.get(name).ok_or_else(|| CkksError::MissingInput {
                name: name.clone(),
            })?;
            if values.len() != signature.vec_size {
                return Err(CkksError::InputLength {
                    name: name.clone(),
                    expected: signature.vec_size,
                    actual: values.len(),
                });
            }
            let ciphertext = self
                .encrypt_values(values, encoding.scale)?
                .mod_switch_to(&self.context, encoding.level)?;
            encrypted.insert(name.clone(), ciphertext);
        }
        Ok(encrypted)
    }

    /// Encrypts one vector at the top level.
    pub fn encrypt_values(&mut self, values: &[f64], scale: f64) -> CkksResult<Ciphertext> {
        let level = self.context.max_level();
        let basis = self.context.level_basis(level)?.clone();
        let keygen = &self.context.params().keygen;

        let coeffs = self.context.encoder().encode(values, scale)?;
        let mut m = RnsPoly::from_coeffs(&coeffs, basis.clone());
        m.to_ntt_domain();

        let mut u = RnsPoly::sample_ternary(keygen.hamming_weight, basis.clone(), &mut self.rng);
        u.to_ntt_domain();
        let mut e0 = RnsPoly::sample_gaussian(keygen.error_std, basis.clone(), &mut self.rng);
        e0.to_ntt_domain();
        let mut e1 = RnsPoly::sample_gaussian(keygen.error_std, basis, &mut self.rng);
        e1.to_ntt_domain();

        // c0 = b * u + e0 + m
        let mut c0 = self.public_key.b.clone();
        c0 *= &u;
        c0 += &e0;
        c0 += &m;

        // c1 = a * u + e1
        let mut c1 = self.public_key.a.clone();
        c1 *= &u;
        c1 += &e1;

        Ok(Ciphertext {
            c0,
            c1,
            c2: None,
            level,
            scale,
        })
    }

    /// Runs `circuit` over encrypted inputs and returns its named outputs.
    pub fn execute(&self, circuit: &Circuit, inputs: &CiphertextMap) -> CkksResult<CiphertextMap> {
        let mut values: Vec<Option<Ciphertext>> = Vec::with_capacity(circuit.steps().len());

        for (index, step) in circuit.steps().iter().enumerate() {
            let operand = |id: usize| {
                values
                    .get(id)
                    .and_then(Option::as_ref)
                    .ok_or(CkksError::DanglingOperand {
                        step: index,
                        operand: id,
                    })
            };

            let result = match &step.instruction {
                Instruction::Input { name } => inputs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CkksError::MissingInput { name: name.clone() })?,
                Instruction::Add { lhs, rhs } => operand(*lhs)?.add(operand(*rhs)?)?,
                Instruction::Mul { lhs, rhs } => operand(*lhs)?.mul(operand(*rhs)?)?,
                Instruction::Relinearize { operand: id } => {
                    operand(*id)?.relinearize(&self.context, &self.relin_key)?
                }
                Instruction::Rescale { operand: id } => operand(*id)?.rescale(&self.context)?,
                Instruction::ModSwitch { operand: id } => {
                    operand(*id)?.mod_switch_to(&self.context, step.level)?
                }
                Instruction::MulConst {
                    operand: id,
                    value,
                    multiplier,
                } => operand(*id)?.mul_const(*value, *multiplier)?,
                Instruction::AddConst { operand: id, value } => operand(*id)?.add_const(*value)?,
            };

            if result.level != step.level {
                return Err(CkksError::LevelMismatch {
                    expected: step.level,
                    actual: result.level,
                });
            }
            values.push(Some(result));
        }

        circuit
            .outputs()
            .iter()
            .map(|(name, &id)| {
                values
                    .get(id)
                    .and_then(Option::as_ref)
                    .cloned()
                    .map(|ct| (name.clone(), ct))
                    .ok_or_else(|| CkksError::MissingOutput { name: name.clone() })
            })
            .collect()
    }
}

// ─── Secret side ──────────────────────────────────────────────────────────────

impl SecretContext {
    pub fn context(&self) -> &CkksContext {
        &self.context
    }

    /// Decrypts and decodes every output named by `signature`.
    pub fn decrypt(
        &self,
        mut outputs: CiphertextMap,
        signature: &Signature,
    ) -> CkksResult<Valuation> {
        let mut decrypted = Valuation::new();
        for name in signature.outputs.keys() {
            let ciphertext = outputs
                .remove(name)
                .ok_or_else(|| CkksError::MissingOutput { name: name.clone() })?;
            let values = self.decrypt_values(&ciphertext, signature.vec_size)?;
            decrypted.insert(name.clone(), values);
        }
        Ok(decrypted)
    }

    /// Decrypts at level 0 and decodes the first `count` slots.
    pub fn decrypt_values(&self, ciphertext: &Ciphertext, count: usize) -> CkksResult<Vec<f64>> {
        if !ciphertext.is_linear() {
            return Err(CkksError::NotRelinearized {
                operation: "decryption",
            });
        }
        let bottom = ciphertext.mod_switch_to(&self.context, 0)?;
        let s = self
            .secret_key
            .restricted_to(self.context.level_basis(0)?)?;

        // m = c0 + c1 * s
        let mut m = bottom.c1;
        m *= &s;
        m += &bottom.c0;

        let coeffs = m.channel_centered(0);
        Ok(self
            .context
            .encoder()
            .decode(&coeffs, bottom.scale, count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::params::KeyGenConfig;
    use crate::compiler::IoEncoding;
    use crate::math::{largest_prime_below_bits, primes_near_power_of_two};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    const SCALE_BITS: u32 = 25;

    fn params(degree: usize, depth: usize) -> CkksParams {
        let n = degree as u64;
        let q0 = largest_prime_below_bits(45, n, &[]).unwrap();
        let mut chain = vec![q0];
        chain.extend(primes_near_power_of_two(SCALE_BITS, depth, n, &[q0]).unwrap());
        let special = largest_prime_below_bits(60, n, &chain).unwrap();
        CkksParams {
            poly_modulus_degree: degree,
            coeff_modulus: chain,
            special_modulus: special,
            keygen: KeyGenConfig {
                error_std: 3.2,
                hamming_weight: 16,
            },
        }
    }

    fn keys(depth: usize, seed: u64) -> (PublicContext, SecretContext) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        generate_keys(&params(64, depth), &mut rng).unwrap()
    }

    fn sample_values() -> Vec<f64> {
        (0..32).map(|i| -2.0 + 4.0 * i as f64 / 32.0).collect()
    }

    fn scale() -> f64 {
        (1u64 << SCALE_BITS) as f64
    }

    #[test]
    fn bases_share_leading_primes() {
        let context = CkksContext::new(&params(64, 2)).unwrap();
        assert_eq!(context.max_level(), 2);
        assert_eq!(context.level_basis(1).unwrap().channel_count(), 2);
        assert_eq!(context.key_basis(1).unwrap().channel_count(), 3);
        assert!(context.full_key_basis().starts_with(context.level_basis(2).unwrap()));
        assert!(matches!(
            context.level_basis(3),
            Err(CkksError::LevelOutOfRange { level: 3, chain: 3 })
        ));
    }

    #[test]
    fn encrypt_then_decrypt_recovers_values() {
        let (mut public, secret) = keys(1, 10);
        let values = sample_values();
        let ct = public.encrypt_values(&values, scale()).unwrap();
        let decrypted = secret.decrypt_values(&ct, values.len()).unwrap();
        for (a, b) in values.iter().zip(&decrypted) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }
    }

    #[test]
    fn multiply_relinearize_rescale_squares_values() {
        let (mut public, secret) = keys(1, 11);
        let values = sample_values();
        let ct = public.encrypt_values(&values, scale()).unwrap();

        let context = public.context.clone();
        let squared = ct
            .mul(&ct)
            .unwrap()
            .relinearize(&context, &public.relin_key)
            .unwrap()
            .rescale(&context)
            .unwrap();
        assert_eq!(squared.level, 0);

        let decrypted = secret.decrypt_values(&squared, values.len()).unwrap();
        for (x, y) in values.iter().zip(&decrypted) {
            assert_abs_diff_eq!(x * x, *y, epsilon = 1e-2);
        }
    }

    #[test]
    fn constant_operations_act_slotwise() {
        let (mut public, secret) = keys(1, 12);
        let values = sample_values();
        let ct = public.encrypt_values(&values, scale()).unwrap();
        let context = public.context.clone();

        let prime = context.params().coeff_modulus[1] as f64;
        let scaled = ct
            .mul_const(0.5, prime)
            .unwrap()
            .rescale(&context)
            .unwrap()
            .add_const(1.25)
            .unwrap();
        assert_abs_diff_eq!(scaled.scale, scale(), epsilon = 1e-6);

        let decrypted = secret.decrypt_values(&scaled, values.len()).unwrap();
        for (x, y) in values.iter().zip(&decrypted) {
            assert_abs_diff_eq!(0.5 * x + 1.25, *y, epsilon = 1e-3);
        }
    }

    #[test]
    fn adding_mismatched_levels_fails() {
        let (mut public, _) = keys(1, 13);
        let ct = public.encrypt_values(&sample_values(), scale()).unwrap();
        let lower = ct.mod_switch_to(&public.context, 0).unwrap();
        assert!(matches!(
            ct.add(&lower),
            Err(CkksError::LevelMismatch { .. })
        ));
    }

    #[test]
    fn rescale_at_level_zero_fails() {
        let (mut public, _) = keys(1, 14);
        let ct = public.encrypt_values(&sample_values(), scale()).unwrap();
        let bottom = ct.mod_switch_to(&public.context, 0).unwrap();
        assert!(matches!(
            bottom.rescale(&public.context),
            Err(CkksError::RescaleAtBottom)
        ));
    }

    #[test]
    fn encrypt_reports_missing_inputs() {
        let (mut public, _) = keys(1, 15);
        let mut inputs = BTreeMap::new();
        inputs.insert(
            "x".to_string(),
            IoEncoding {
                level: 1,
                scale: scale(),
            },
        );
        let signature = Signature {
            vec_size: 32,
            inputs,
            outputs: BTreeMap::new(),
        };
        assert!(matches!(
            public.encrypt(&Valuation::new(), &signature),
            Err(CkksError::MissingInput { .. })
        ));
    }
}

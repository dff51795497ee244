use std::collections::BTreeMap;

use super::circuit::{Circuit, IoEncoding, Signature};
use super::errors::{CompileError, CompileResult};
use super::lowering::{Lowering, analyze, chain_depth};
use super::security::SecurityLevel;
use crate::ckks::{CkksParams, KeyGenConfig};
use crate::math::{largest_prime_below_bits, primes_near_power_of_two};
use crate::program::Program;

/// Bits of the special prime used by key switching.
pub const SPECIAL_PRIME_BITS: u32 = 60;

/// Everything the backend needs to run a compiled program.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub circuit: Circuit,
    pub params: CkksParams,
    pub signature: Signature,
}

/// Compiles [`Program`]s for the RNS-CKKS backend.
#[derive(Debug, Clone, Default)]
pub struct CkksCompiler {
    security: SecurityLevel,
    keygen: KeyGenConfig,
}

impl CkksCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn security(mut self, security: SecurityLevel) -> Self {
        self.security = security;
        self
    }

    pub fn keygen(mut self, keygen: KeyGenConfig) -> Self {
        self.keygen = keygen;
        self
    }

    pub fn compile(&self, program: &Program) -> CompileResult<CompiledProgram> {
        let scale_bits = program
            .input_scale_bits()
            .ok_or(CompileError::MissingInputScale)?;
        let range_bits = program
            .output_range_bits()
            .ok_or(CompileError::MissingOutputRange)?;
        self.validate(program, scale_bits, range_bits)?;

        let kinds = analyze(program);
        let depth = chain_depth(program, &kinds)?;
        let base_bits = range_bits + scale_bits;
        let nominal_bits = base_bits + depth as u32 * scale_bits + SPECIAL_PRIME_BITS;

        let vec_size = program.vec_size();
        let candidates = self.security.candidate_degrees(vec_size, nominal_bits);
        if candidates.is_empty() {
            return Err(CompileError::ParametersTooLarge {
                bits: nominal_bits,
                vec_size,
            });
        }

        let mut last_error = None;
        for degree in candidates {
            match self.select_params(degree, base_bits, scale_bits, depth) {
                Ok(params) => {
                    let fits = self
                        .security
                        .max_modulus_bits(degree)
                        .is_some_and(|max| params.total_modulus_bits() <= f64::from(max));
                    if !fits {
                        continue;
                    }
                    return self.finish(program, &kinds, params, scale_bits);
                }
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or(CompileError::ParametersTooLarge {
            bits: nominal_bits,
            vec_size,
        }))
    }

    fn validate(&self, program: &Program, scale_bits: u32, range_bits: u32) -> CompileResult<()> {
        if program.input_names().next().is_none() {
            return Err(CompileError::NoInputs(program.name().to_string()));
        }
        if program.outputs().is_empty() {
            return Err(CompileError::NoOutputs(program.name().to_string()));
        }
        let vec_size = program.vec_size();
        if vec_size == 0 || !vec_size.is_power_of_two() {
            return Err(CompileError::InvalidVecSize(vec_size));
        }
        if !(20..=59).contains(&scale_bits) {
            return Err(CompileError::InvalidScale(scale_bits));
        }
        if range_bits + scale_bits > 60 {
            return Err(CompileError::OutputModulusTooWide(range_bits + scale_bits));
        }
        Ok(())
    }

    /// Chain `q_0, q_1 .. q_D` plus the special prime for one degree.
    fn select_params(
        &self,
        degree: usize,
        base_bits: u32,
        scale_bits: u32,
        depth: usize,
    ) -> CompileResult<CkksParams> {
        let n = degree as u64;
        let base = largest_prime_below_bits(base_bits, n, &[]).ok_or(
            CompileError::NoSuitablePrimes {
                bits: base_bits,
                degree,
            },
        )?;
        let mut chain = vec![base];
        let rescale = primes_near_power_of_two(scale_bits, depth, n, &chain).ok_or(
            CompileError::NoSuitablePrimes {
                bits: scale_bits,
                degree,
            },
        )?;
        // The top of the chain is rescaled away first.
        chain.extend(rescale);
        let special = largest_prime_below_bits(SPECIAL_PRIME_BITS, n, &chain).ok_or(
            CompileError::NoSuitablePrimes {
                bits: SPECIAL_PRIME_BITS,
                degree,
            },
        )?;

        Ok(CkksParams {
            poly_modulus_degree: degree,
            coeff_modulus: chain,
            special_modulus: special,
            keygen: KeyGenConfig {
                hamming_weight: self.keygen.hamming_weight.min(degree),
                ..self.keygen.clone()
            },
        })
    }

    fn finish(
        &self,
        program: &Program,
        kinds: &[super::lowering::Kind],
        params: CkksParams,
        scale_bits: u32,
    ) -> CompileResult<CompiledProgram> {
        let base_scale = 2f64.powi(scale_bits as i32);
        let circuit = Lowering::new(program, kinds, &params.coeff_modulus, base_scale).run()?;

        let top = params.max_level();
        let inputs: BTreeMap<String, IoEncoding> = program
            .input_names()
            .map(|name| {
                (
                    name.to_string(),
                    IoEncoding {
                        level: top,
                        scale: base_scale,
                    },
                )
            })
            .collect();
        let outputs = program
            .outputs()
            .iter()
            .map(|(name, _)| {
                (
                    name.clone(),
                    IoEncoding {
                        level: 0,
                        scale: base_scale,
                    },
                )
            })
            .collect();

        Ok(CompiledProgram {
            circuit,
            params,
            signature: Signature {
                vec_size: program.vec_size(),
                inputs,
                outputs,
            },
        })
    }
}

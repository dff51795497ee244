//! Seam between the measurement harness and the FHE toolchain.
//!
//! The harness only talks to an [`FheBackend`]; it never touches ciphertext
//! arithmetic directly. [`CkksBackend`] wires the in-crate compiler and
//! RNS-CKKS implementation behind it.

use rand::Rng;

use crate::Valuation;
use crate::ckks::{CiphertextMap, PublicContext, SecretContext, generate_keys};
use crate::compiler::{CkksCompiler, CompiledProgram, SecurityLevel};
use crate::error::Result;
use crate::eval::evaluate;
use crate::program::Program;

pub trait FheBackend {
    /// Compiled circuit plus whatever parameters key generation needs.
    type Compiled;
    type PublicContext;
    type SecretContext;
    type Encrypted;

    fn compile(&self, program: &Program) -> Result<Self::Compiled>;

    fn poly_modulus_degree(&self, compiled: &Self::Compiled) -> usize;

    fn circuit_to_dot(&self, compiled: &Self::Compiled) -> String;

    fn generate_keys<R: Rng + ?Sized>(
        &self,
        compiled: &Self::Compiled,
        rng: &mut R,
    ) -> Result<(Self::PublicContext, Self::SecretContext)>;

    fn encrypt(
        &self,
        public: &mut Self::PublicContext,
        compiled: &Self::Compiled,
        inputs: &Valuation,
    ) -> Result<Self::Encrypted>;

    fn execute(
        &self,
        public: &Self::PublicContext,
        compiled: &Self::Compiled,
        inputs: &Self::Encrypted,
    ) -> Result<Self::Encrypted>;

    fn decrypt(
        &self,
        secret: &Self::SecretContext,
        compiled: &Self::Compiled,
        outputs: Self::Encrypted,
    ) -> Result<Valuation>;

    /// Runs the compiled circuit on plaintext values.
    fn evaluate(&self, compiled: &Self::Compiled, inputs: &Valuation) -> Result<Valuation>;
}

#[derive(Debug, Clone, Default)]
pub struct CkksBackend {
    compiler: CkksCompiler,
}

impl CkksBackend {
    pub fn new(security: SecurityLevel) -> Self {
        Self {
            compiler: CkksCompiler::new().security(security),
        }
    }

    pub fn with_compiler(compiler: CkksCompiler) -> Self {
        Self { compiler }
    }
}

impl FheBackend for CkksBackend {
    type Compiled = CompiledProgram;
    type PublicContext = PublicContext;
    type SecretContext = SecretContext;
    type Encrypted = CiphertextMap;

    fn compile(&self, program: &Program) -> Result<CompiledProgram> {
        Ok(self.compiler.compile(program)?)
    }

    fn poly_modulus_degree(&self, compiled: &CompiledProgram) -> usize {
        compiled.params.poly_modulus_degree
    }

    fn circuit_to_dot(&self, compiled: &CompiledProgram) -> String {
        compiled.circuit.to_dot()
    }

    fn generate_keys<R: Rng + ?Sized>(
        &self,
        compiled: &CompiledProgram,
        rng: &mut R,
    ) -> Result<(PublicContext, SecretContext)> {
        Ok(generate_keys(&compiled.params, rng)?)
    }

    fn encrypt(
        &self,
        public: &mut PublicContext,
        compiled: &CompiledProgram,
        inputs: &Valuation,
    ) -> Result<CiphertextMap> {
        Ok(public.encrypt(inputs, &compiled.signature)?)
    }

    fn execute(
        &self,
        public: &PublicContext,
        compiled: &CompiledProgram,
        inputs: &CiphertextMap,
    ) -> Result<CiphertextMap> {
        Ok(public.execute(&compiled.circuit, inputs)?)
    }

    fn decrypt(
        &self,
        secret: &SecretContext,
        compiled: &CompiledProgram,
        outputs: CiphertextMap,
    ) -> Result<Valuation> {
        Ok(secret.decrypt(outputs, &compiled.signature)?)
    }

    fn evaluate(&self, compiled: &CompiledProgram, inputs: &Valuation) -> Result<Valuation> {
        Ok(evaluate(&compiled.circuit, inputs)?)
    }
}

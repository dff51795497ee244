//! EVA-style compiler from [`Program`](crate::program::Program) graphs to
//! CKKS circuits.
//!
//! The compiler picks the modulus chain and ring degree, assigns every value
//! a level and scale, and returns the lowered [`Circuit`] together with the
//! [`CkksParams`](crate::ckks::CkksParams) and the input/output [`Signature`].

pub mod ckks;
pub mod circuit;
pub mod errors;
mod lowering;
pub mod security;

pub use ckks::{CkksCompiler, CompiledProgram, SPECIAL_PRIME_BITS};
pub use circuit::{Circuit, Instruction, IoEncoding, Signature, Step, ValueId};
pub use errors::{CompileError, CompileResult};
pub use security::SecurityLevel;

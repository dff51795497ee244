use thiserror::Error;

use crate::ckks::CkksError;
use crate::compiler::CompileError;
use crate::eval::EvalError;
use crate::metric::MetricError;
use crate::program::ProgramError;
use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("program construction failed: {0}")]
    Program(#[from] ProgramError),

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("CKKS backend failed: {0}")]
    Ckks(#[from] CkksError),

    #[error("cleartext evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("scoring failed: {0}")]
    Metric(#[from] MetricError),

    #[error("report failed: {0}")]
    Report(#[from] ReportError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "modulus degree of '{name}' changed between trials: expected {expected}, got {actual}"
    )]
    InconsistentModulusDegree {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

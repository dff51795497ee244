use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("program '{0}' has no inputs")]
    NoInputs(String),

    #[error("program '{0}' has no outputs")]
    NoOutputs(String),

    #[error("output '{0}' does not depend on any input")]
    OutputWithoutInput(String),

    #[error("vec_size {0} must be a positive power of two")]
    InvalidVecSize(usize),

    #[error("input scale is not set")]
    MissingInputScale,

    #[error("output range is not set")]
    MissingOutputRange,

    #[error("input scale of {0} bits is outside 20..=59")]
    InvalidScale(u32),

    #[error("output range plus input scale is {0} bits, more than the 60 a single prime holds")]
    OutputModulusTooWide(u32),

    #[error("no supported modulus degree fits {bits} modulus bits for vec_size {vec_size}")]
    ParametersTooLarge { bits: u32, vec_size: usize },

    #[error("no NTT-friendly primes of {bits} bits for degree {degree}")]
    NoSuitablePrimes { bits: u32, degree: usize },

    #[error("node {node} needs level {needed} but only reaches level {available}")]
    LevelBudget {
        node: usize,
        needed: usize,
        available: usize,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

use thiserror::Error;

use super::encoder::EncodingError;
use super::keys::KeyError;
use crate::rns::RnsError;

#[derive(Error, Debug)]
pub enum CkksError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("RNS operation failed: {source}")]
    Rns {
        #[from]
        source: RnsError,
    },

    #[error("Encoding failed: {source}")]
    Encoding {
        #[from]
        source: EncodingError,
    },

    #[error("Key generation failed: {source}")]
    Key {
        #[from]
        source: KeyError,
    },

    #[error("Level mismatch: expected {expected}, got {actual}")]
    LevelMismatch { expected: usize, actual: usize },

    #[error("Scale mismatch: expected {expected:.2}, got {actual:.2}")]
    ScaleMismatch { expected: f64, actual: f64 },

    #[error("Level {level} is outside the modulus chain of length {chain}")]
    LevelOutOfRange { level: usize, chain: usize },

    #[error("Cannot rescale a ciphertext at level 0")]
    RescaleAtBottom,

    #[error("Ciphertext must be relinearized before {operation}")]
    NotRelinearized { operation: &'static str },

    #[error("Constant {value} at scale {scale:.3e} does not fit a 62-bit multiplier")]
    ConstantOutOfRange { value: f64, scale: f64 },

    #[error("Missing input '{name}'")]
    MissingInput { name: String },

    #[error("Missing output '{name}'")]
    MissingOutput { name: String },

    #[error("Input '{name}' has {actual} values, expected {expected}")]
    InputLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Circuit step {step} refers to value {operand} that is not yet computed")]
    DanglingOperand { step: usize, operand: usize },
}

pub type CkksResult<T> = Result<T, CkksError>;

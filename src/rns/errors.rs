use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RnsError {
    #[error("ring degree must be a power of two and at least 2, got {degree}")]
    InvalidDegree { degree: usize },
    #[error("RNS basis must contain at least one modulus")]
    EmptyBasis,
    #[error("modulus {modulus} is not NTT-friendly for degree {degree}")]
    NonNttFriendlyModulus { modulus: u64, degree: usize },
    #[error("modulus {modulus} appears more than once in the basis")]
    DuplicateModulus { modulus: u64 },
    #[error("NTT tables were built for degree {actual}, basis expects {expected}")]
    DegreeMismatch { expected: usize, actual: usize },
    #[error("basis with {target} channels is not a prefix of the {current}-channel basis")]
    NotAPrefix { current: usize, target: usize },
    #[error("cannot drop the last channel of a single-channel polynomial")]
    InvalidModDrop,
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

pub type RnsResult<T> = Result<T, RnsError>;

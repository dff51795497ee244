//! Residue Number System layer.
//!
//! Polynomials in `Z_Q[X] / (X^N + 1)` are stored as one residue vector per
//! prime of `Q = q_0 * ... * q_{L-1}`, so every ring operation runs on
//! word-sized integers.

pub mod basis;
pub mod errors;
pub mod ntt;
pub mod poly;

pub use basis::RnsBasis;
pub use errors::{RnsError, RnsResult};
pub use ntt::NttTable;
pub use poly::RnsPoly;

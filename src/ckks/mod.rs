//! RNS-CKKS backend.
//!
//! Provides the pieces an EVA-style circuit needs at runtime: parameter
//! handling, slot encoding, key generation, and the homomorphic operations
//! `add`, `mul`, `relinearize`, `rescale`, `mod_switch_to`, `mul_const` and
//! `add_const`.

pub mod ciphertext;
pub mod context;
pub mod encoder;
pub mod errors;
pub mod keys;
pub mod params;

pub use ciphertext::Ciphertext;
pub use context::{CiphertextMap, CkksContext, PublicContext, SecretContext, generate_keys};
pub use encoder::{EncodingError, EncodingResult, SlotEncoder};
pub use errors::{CkksError, CkksResult};
pub use keys::{KeyError, PublicKey, RelinearizationKey, SecretKey};
pub use params::{CkksParams, KeyGenConfig};

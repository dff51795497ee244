//! Measurement harness: repeated trials per polynomial, pure aggregation,
//! and family reports.

mod config;
mod domain;
mod family;
mod results;
mod runner;

pub use config::BenchConfig;
pub use domain::Domain;
pub use family::{DEGREES, PolynomialFamily};
pub use results::{AggregateResult, FamilyResult, PhaseTimings, TrialResult, aggregate};
pub use runner::Harness;

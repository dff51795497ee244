pub mod backend;
pub mod ckks;
pub mod compiler;
pub mod error;
pub mod eval;
pub mod harness;
pub mod math;
pub mod metric;
pub mod program;
pub mod report;
pub mod rns;

pub use backend::{CkksBackend, FheBackend};
pub use compiler::{CkksCompiler, CompiledProgram, SecurityLevel};
pub use error::{Error, Result};
pub use harness::{BenchConfig, Domain, FamilyResult, Harness, PolynomialFamily};
pub use program::{Polynomial, Program};
pub use report::{FsReportSink, MemoryReportSink, ReportSink};

/// Named vectors of real values, used for both inputs and outputs.
pub type Valuation = std::collections::BTreeMap<String, Vec<f64>>;

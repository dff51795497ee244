//! Where benchmark results end up.
//!
//! The harness hands finished artifacts to a [`ReportSink`]. [`FsReportSink`]
//! lays them out on disk as DOT files, SVG line charts drawn with `plotters`
//! and single-column text files; [`MemoryReportSink`] keeps them in memory.

mod chart;
mod fs;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::harness::FamilyResult;

pub use chart::{LineChart, Series};
pub use fs::{FsReportSink, write_column};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("nothing to plot for '{0}'")]
    EmptyReport(String),
    #[error("plotting failed: {0}")]
    Plot(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

pub trait ReportSink {
    /// Stores the DOT rendering of one polynomial's circuit.
    fn write_circuit(&mut self, name: &str, dot: &str) -> ReportResult<()>;

    /// Stores the runtime plot and the per-degree columns of one family.
    fn write_family(&mut self, family: &FamilyResult) -> ReportResult<()>;

    /// Stores one runtime plot comparing every family.
    fn write_comparison(&mut self, families: &[FamilyResult]) -> ReportResult<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn write_circuit(&mut self, name: &str, dot: &str) -> ReportResult<()> {
        (**self).write_circuit(name, dot)
    }

    fn write_family(&mut self, family: &FamilyResult) -> ReportResult<()> {
        (**self).write_family(family)
    }

    fn write_comparison(&mut self, families: &[FamilyResult]) -> ReportResult<()> {
        (**self).write_comparison(families)
    }
}

/// Keeps every report in memory. Used by tests and benches.
#[derive(Debug, Default, Clone)]
pub struct MemoryReportSink {
    pub circuits: BTreeMap<String, String>,
    pub families: Vec<FamilyResult>,
    pub comparisons: Vec<Vec<FamilyResult>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemoryReportSink {
    fn write_circuit(&mut self, name: &str, dot: &str) -> ReportResult<()> {
        self.circuits.insert(name.to_string(), dot.to_string());
        Ok(())
    }

    fn write_family(&mut self, family: &FamilyResult) -> ReportResult<()> {
        self.families.push(family.clone());
        Ok(())
    }

    fn write_comparison(&mut self, families: &[FamilyResult]) -> ReportResult<()> {
        self.comparisons.push(families.to_vec());
        Ok(())
    }
}

/// Runtime-vs-degree chart with one series per family.
pub(crate) fn runtime_chart(title: String, families: &[FamilyResult]) -> LineChart {
    let series = families
        .iter()
        .map(|family| Series {
            label: family.label.clone(),
            points: family
                .degrees()
                .into_iter()
                .map(|d| d as f64)
                .zip(family.runtimes())
                .collect(),
        })
        .collect();
    LineChart {
        title,
        x_label: "Degree".into(),
        y_label: "Runtime (s)".into(),
        series,
    }
}

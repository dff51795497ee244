use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{ReportError, ReportResult, ReportSink, runtime_chart};
use crate::harness::FamilyResult;

/// Writes reports under two directories, created on first use.
#[derive(Debug, Clone)]
pub struct FsReportSink {
    dot_dir: PathBuf,
    results_dir: PathBuf,
}

impl Default for FsReportSink {
    fn default() -> Self {
        Self::new("dot", "results")
    }
}

impl FsReportSink {
    pub fn new(dot_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            dot_dir: dot_dir.into(),
            results_dir: results_dir.into(),
        }
    }

    pub fn dot_dir(&self) -> &Path {
        &self.dot_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    fn results_path(&self, file: &str) -> ReportResult<PathBuf> {
        create_dir(&self.results_dir)?;
        Ok(self.results_dir.join(file))
    }
}

impl ReportSink for FsReportSink {
    fn write_circuit(&mut self, name: &str, dot: &str) -> ReportResult<()> {
        create_dir(&self.dot_dir)?;
        let path = self.dot_dir.join(format!("{name}.dot"));
        fs::write(&path, dot).map_err(|source| io_error(&path, source))
    }

    fn write_family(&mut self, family: &FamilyResult) -> ReportResult<()> {
        if family.results.is_empty() {
            return Err(ReportError::EmptyReport(family.label.clone()));
        }
        let prefix = &family.prefix;

        let chart = runtime_chart(
            format!("FHE Evaluation of {} Approximations", family.label),
            std::slice::from_ref(family),
        );
        let path = self.results_path(&format!("{prefix}_runtimes.svg"))?;
        fs::write(&path, chart.to_svg()?).map_err(|source| io_error(&path, source))?;

        write_column(
            &self.results_path(&format!("{prefix}_runtimes.txt"))?,
            &family.runtimes(),
        )?;
        write_column(
            &self.results_path(&format!("{prefix}_errors.txt"))?,
            &family.errors(),
        )?;
        write_column(
            &self.results_path(&format!("{prefix}_poly_modulus_degrees.txt"))?,
            &family.poly_modulus_degrees(),
        )
    }

    fn write_comparison(&mut self, families: &[FamilyResult]) -> ReportResult<()> {
        if families.iter().all(|f| f.results.is_empty()) {
            return Err(ReportError::EmptyReport("comparison".into()));
        }
        let chart = runtime_chart("FHE Evaluation of Approximations".into(), families);
        let path = self.results_path("runtimes.svg")?;
        fs::write(&path, chart.to_svg()?).map_err(|source| io_error(&path, source))
    }
}

/// Writes one value per line.
pub fn write_column<T: Display>(path: &Path, values: &[T]) -> ReportResult<()> {
    let file = fs::File::create(path).map_err(|source| io_error(path, source))?;
    let mut out = BufWriter::new(file);
    for value in values {
        writeln!(out, "{value}").map_err(|source| io_error(path, source))?;
    }
    out.flush().map_err(|source| io_error(path, source))
}

fn create_dir(dir: &Path) -> ReportResult<()> {
    fs::create_dir_all(dir).map_err(|source| io_error(dir, source))
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

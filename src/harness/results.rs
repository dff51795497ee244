use std::time::Duration;

use crate::error::{Error, Result};

/// Wall-clock time spent in each phase of one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    pub compile: Duration,
    pub keygen: Duration,
    pub encrypt: Duration,
    pub execute: Duration,
    pub decrypt: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.compile + self.keygen + self.encrypt + self.execute + self.decrypt
    }
}

/// Outcome of a single compile-to-decrypt run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    /// Compile through decrypt, in seconds.
    pub runtime_secs: f64,
    pub mse: f64,
    pub poly_modulus_degree: usize,
    pub phases: PhaseTimings,
}

impl TrialResult {
    pub fn new(mse: f64, poly_modulus_degree: usize, phases: PhaseTimings) -> Self {
        Self {
            runtime_secs: phases.total().as_secs_f64(),
            mse,
            poly_modulus_degree,
            phases,
        }
    }
}

/// Per-polynomial averages over all trials.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub name: String,
    pub degree: usize,
    pub average_runtime: f64,
    pub average_error: f64,
    pub poly_modulus_degree: usize,
    pub trials: usize,
}

/// Aggregates of one family, in ascending degree order.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyResult {
    pub label: String,
    pub prefix: String,
    pub results: Vec<AggregateResult>,
}

impl FamilyResult {
    pub fn degrees(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.degree).collect()
    }

    pub fn runtimes(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.average_runtime).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.average_error).collect()
    }

    pub fn poly_modulus_degrees(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.poly_modulus_degree).collect()
    }
}

/// Averages runtime and error over `trials`.
///
/// Every trial must report the same modulus degree as the first one.
pub fn aggregate(name: &str, degree: usize, trials: &[TrialResult]) -> Result<AggregateResult> {
    let first = trials.first().ok_or_else(|| {
        Error::InvalidConfig(format!("no trials recorded for polynomial '{name}'"))
    })?;
    let expected = first.poly_modulus_degree;
    if let Some(bad) = trials.iter().find(|t| t.poly_modulus_degree != expected) {
        return Err(Error::InconsistentModulusDegree {
            name: name.to_string(),
            expected,
            actual: bad.poly_modulus_degree,
        });
    }

    let count = trials.len() as f64;
    let runtime: f64 = trials.iter().map(|t| t.runtime_secs).sum();
    let error: f64 = trials.iter().map(|t| t.mse).sum();
    Ok(AggregateResult {
        name: name.to_string(),
        degree,
        average_runtime: runtime / count,
        average_error: error / count,
        poly_modulus_degree: expected,
        trials: trials.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trial(runtime_secs: f64, mse: f64, n: usize) -> TrialResult {
        TrialResult {
            runtime_secs,
            mse,
            poly_modulus_degree: n,
            phases: PhaseTimings::default(),
        }
    }

    #[test]
    fn averages_are_arithmetic_means() {
        let trials: Vec<_> = (1..=10)
            .map(|i| trial(i as f64 * 0.1, i as f64 * 1e-6, 16384))
            .collect();
        let agg = aggregate("cheby_poly2", 2, &trials).unwrap();
        assert_relative_eq!(agg.average_runtime, 5.5 / 10.0, max_relative = 1e-12);
        assert_relative_eq!(agg.average_error, 55e-6 / 10.0, max_relative = 1e-12);
        assert_eq!(agg.poly_modulus_degree, 16384);
        assert_eq!(agg.trials, 10);
    }

    #[test]
    fn empty_trials_are_invalid() {
        assert!(matches!(
            aggregate("p", 2, &[]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn changing_modulus_degree_is_an_error() {
        let trials = [trial(1.0, 0.0, 8192), trial(1.0, 0.0, 16384)];
        match aggregate("p", 2, &trials) {
            Err(Error::InconsistentModulusDegree {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 8192);
                assert_eq!(actual, 16384);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn runtime_is_sum_of_phases() {
        let phases = PhaseTimings {
            compile: Duration::from_millis(10),
            keygen: Duration::from_millis(20),
            encrypt: Duration::from_millis(30),
            execute: Duration::from_millis(40),
            decrypt: Duration::from_millis(50),
        };
        let t = TrialResult::new(0.5, 1024, phases);
        assert_relative_eq!(t.runtime_secs, 0.15, epsilon = 1e-12);
    }
}

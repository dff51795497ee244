//! Default configuration end to end: 8192 samples under 128-bit security.
//! The degree-10 runs take several seconds each even in release builds and are
//! ignored by default; run them with `cargo test --release -- --ignored`.

use approx::assert_relative_eq;
use ckks_poly_bench::compiler::SecurityLevel;
use ckks_poly_bench::harness::{TrialResult, aggregate};
use ckks_poly_bench::{
    BenchConfig, CkksBackend, Domain, Harness, MemoryReportSink, Polynomial, PolynomialFamily,
    Valuation,
};

const FULL_N: usize = 16384;

fn harness(config: BenchConfig) -> Harness<CkksBackend, MemoryReportSink> {
    assert_eq!(config.security, SecurityLevel::Tc128);
    Harness::new(
        CkksBackend::new(config.security),
        MemoryReportSink::new(),
        config,
    )
    .unwrap()
}

fn inputs() -> Valuation {
    Valuation::from([("x".to_string(), Domain::default().samples())])
}

fn check_trial(trial: &TrialResult, max_mse: f64) {
    assert!(trial.runtime_secs.is_finite() && trial.runtime_secs >= 0.0);
    assert!(trial.mse.is_finite() && trial.mse >= 0.0);
    assert!(trial.mse < max_mse, "mse {} above {max_mse}", trial.mse);
    assert_eq!(trial.poly_modulus_degree, FULL_N);
}

#[test]
fn ten_default_trials_of_the_quadratic() {
    let config = BenchConfig::default().seed(7);
    assert_eq!(config.trials, 10);
    let mut harness = harness(config);
    let quadratic = PolynomialFamily::chebyshev().polynomials[0].clone();
    assert_eq!(quadratic.name(), "cheby_poly2");

    let inputs = inputs();
    let trials: Vec<_> = (0..10)
        .map(|_| harness.run_trial(&quadratic, &inputs).unwrap())
        .collect();
    for trial in &trials {
        check_trial(trial, 1e-6);
    }

    let summary = aggregate(quadratic.name(), 2, &trials).unwrap();
    assert_eq!(summary.trials, 10);
    assert_eq!(summary.poly_modulus_degree, FULL_N);
    let runtime_sum: f64 = trials.iter().map(|t| t.runtime_secs).sum();
    let error_sum: f64 = trials.iter().map(|t| t.mse).sum();
    assert_relative_eq!(summary.average_runtime, runtime_sum / 10.0, max_relative = 1e-12);
    assert_relative_eq!(summary.average_error, error_sum / 10.0, max_relative = 1e-12);
}

fn degree_ten(family: PolynomialFamily) -> Polynomial {
    let polynomial = family.polynomials[4].clone();
    assert_eq!(polynomial.degree(), 10);
    polynomial
}

#[test]
#[ignore = "slow: full-size degree-10 circuit"]
fn chebyshev_degree_ten_at_full_size() {
    let mut harness = harness(BenchConfig::default().trials(1).seed(8));
    let summary = harness
        .evaluate_polynomial(&degree_ten(PolynomialFamily::chebyshev()), 1)
        .unwrap();
    assert_eq!(summary.name, "cheby_poly10");
    assert_eq!(summary.poly_modulus_degree, FULL_N);
    assert!(summary.average_error < 1e-4, "mse {}", summary.average_error);
    assert!(harness.sink().circuits.contains_key("cheby_poly10"));
}

#[test]
#[ignore = "slow: full-size degree-10 circuit"]
fn minimax_degree_ten_at_full_size() {
    let mut harness = harness(BenchConfig::default().trials(1).seed(9));
    let polynomial = degree_ten(PolynomialFamily::minimax());
    let trial = harness.run_trial(&polynomial, &inputs()).unwrap();
    assert_eq!(polynomial.name(), "mm_poly10");
    check_trial(&trial, 1e-4);
}

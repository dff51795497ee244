use std::time::Instant;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::config::BenchConfig;
use super::family::PolynomialFamily;
use super::results::{AggregateResult, FamilyResult, PhaseTimings, TrialResult, aggregate};
use crate::Valuation;
use crate::backend::FheBackend;
use crate::error::{Error, Result};
use crate::metric::valuation_mse;
use crate::program::Polynomial;
use crate::report::ReportSink;

/// Drives compile, keygen, encrypt, execute, decrypt and scoring for every
/// polynomial it is given, and hands the results to a [`ReportSink`].
pub struct Harness<B: FheBackend, S: ReportSink> {
    backend: B,
    sink: S,
    config: BenchConfig,
    rng: ChaCha20Rng,
}

impl<B: FheBackend, S: ReportSink> Harness<B, S> {
    pub fn new(backend: B, sink: S, config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => {
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                ChaCha20Rng::from_seed(seed)
            }
        };
        Ok(Self {
            backend,
            sink,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn inputs(&self) -> Valuation {
        Valuation::from([(Polynomial::INPUT.to_string(), self.config.domain.samples())])
    }

    /// One compile-to-decrypt run of `polynomial` over `inputs`.
    pub fn run_trial(
        &mut self,
        polynomial: &Polynomial,
        inputs: &Valuation,
    ) -> Result<TrialResult> {
        self.trial(polynomial, inputs, false).map(|(result, _)| result)
    }

    /// Also renders the compiled circuit when `render_circuit` is set.
    fn trial(
        &mut self,
        polynomial: &Polynomial,
        inputs: &Valuation,
        render_circuit: bool,
    ) -> Result<(TrialResult, Option<String>)> {
        let mut program = polynomial.to_program(self.config.domain.size)?;
        program.set_input_scales(self.config.input_scale_bits);
        program.set_output_ranges(self.config.output_range_bits);

        let start = Instant::now();
        let compiled = self.backend.compile(&program)?;
        let compile = start.elapsed();
        let poly_modulus_degree = self.backend.poly_modulus_degree(&compiled);

        let start = Instant::now();
        let (mut public, secret) = self.backend.generate_keys(&compiled, &mut self.rng)?;
        let keygen = start.elapsed();

        let start = Instant::now();
        let encrypted = self.backend.encrypt(&mut public, &compiled, inputs)?;
        let encrypt = start.elapsed();

        let start = Instant::now();
        let outputs = self.backend.execute(&public, &compiled, &encrypted)?;
        let execute = start.elapsed();

        let start = Instant::now();
        let decrypted = self.backend.decrypt(&secret, &compiled, outputs)?;
        let decrypt = start.elapsed();

        let reference = self.backend.evaluate(&compiled, inputs)?;
        let mse = valuation_mse(&decrypted, &reference)?;

        let phases = PhaseTimings {
            compile,
            keygen,
            encrypt,
            execute,
            decrypt,
        };
        let dot = render_circuit.then(|| self.backend.circuit_to_dot(&compiled));
        Ok((TrialResult::new(mse, poly_modulus_degree, phases), dot))
    }

    /// Runs `trials` trials of one polynomial and prints its averages.
    pub fn evaluate_polynomial(
        &mut self,
        polynomial: &Polynomial,
        trials: usize,
    ) -> Result<AggregateResult> {
        if trials == 0 {
            return Err(Error::InvalidConfig(
                "trials_per_polynomial must be at least 1".into(),
            ));
        }
        let name = polynomial.name();
        let inputs = self.inputs();
        println!("Evaluating {name}");

        let mut results = Vec::with_capacity(trials);
        for index in 0..trials {
            let (result, dot) = self.trial(polynomial, &inputs, index == 0)?;
            if let Some(dot) = dot {
                self.sink.write_circuit(name, &dot)?;
            }
            if self.config.verbose {
                let p = &result.phases;
                println!(
                    "  trial {}: {:.4}s (compile {:.4}s, keygen {:.4}s, encrypt {:.4}s, execute {:.4}s, decrypt {:.4}s), MSE {:e}",
                    index + 1,
                    result.runtime_secs,
                    p.compile.as_secs_f64(),
                    p.keygen.as_secs_f64(),
                    p.encrypt.as_secs_f64(),
                    p.execute.as_secs_f64(),
                    p.decrypt.as_secs_f64(),
                    result.mse
                );
            }
            results.push(result);
        }

        let summary = aggregate(name, polynomial.degree(), &results)?;
        println!("Polynomial modulus degree: {}", summary.poly_modulus_degree);
        println!("Average runtime: {}", summary.average_runtime);
        println!("Average MSE: {}", summary.average_error);
        Ok(summary)
    }

    /// Evaluates every polynomial of `family`, then writes the family report.
    pub fn evaluate_polynomial_family(
        &mut self,
        family: &PolynomialFamily,
        trials: usize,
    ) -> Result<FamilyResult> {
        if family.polynomials.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "polynomial family '{}' is empty",
                family.label
            )));
        }
        if trials == 0 {
            return Err(Error::InvalidConfig(
                "trials_per_polynomial must be at least 1".into(),
            ));
        }

        println!("{} approximations", family.label);
        let mut results = Vec::with_capacity(family.polynomials.len());
        for polynomial in &family.polynomials {
            results.push(self.evaluate_polynomial(polynomial, trials)?);
        }
        let report = FamilyResult {
            label: family.label.clone(),
            prefix: family.prefix.clone(),
            results,
        };
        self.sink.write_family(&report)?;
        Ok(report)
    }

    /// Runs each family with the configured trial count, then writes the
    /// comparison plot.
    pub fn run_suite(&mut self, families: &[PolynomialFamily]) -> Result<Vec<FamilyResult>> {
        if families.is_empty() {
            return Err(Error::InvalidConfig("no polynomial families given".into()));
        }
        let trials = self.config.trials;
        let mut reports = Vec::with_capacity(families.len());
        for family in families {
            reports.push(self.evaluate_polynomial_family(family, trials)?);
        }
        self.sink.write_comparison(&reports)?;
        Ok(reports)
    }
}

use super::domain::Domain;
use crate::compiler::SecurityLevel;
use crate::error::{Error, Result};

/// Benchmark run settings. Build with the chained setters, then `validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub trials: usize,
    pub domain: Domain,
    pub input_scale_bits: u32,
    pub output_range_bits: u32,
    pub security: SecurityLevel,
    /// Fixed seed for reproducible key and noise sampling; OS entropy if `None`.
    pub seed: Option<u64>,
    /// Print one line per trial.
    pub verbose: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            domain: Domain::default(),
            input_scale_bits: 30,
            output_range_bits: 20,
            security: SecurityLevel::Tc128,
            seed: None,
            verbose: false,
        }
    }
}

impl BenchConfig {
    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn input_scale_bits(mut self, bits: u32) -> Self {
        self.input_scale_bits = bits;
        self
    }

    pub fn output_range_bits(mut self, bits: u32) -> Self {
        self.output_range_bits = bits;
        self
    }

    pub fn security(mut self, security: SecurityLevel) -> Self {
        self.security = security;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidConfig(
                "trials_per_polynomial must be at least 1".into(),
            ));
        }
        let size = self.domain.size;
        if size == 0 || !size.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "domain size {size} must be a positive power of two"
            )));
        }
        if !(self.domain.start.is_finite() && self.domain.end.is_finite())
            || self.domain.start >= self.domain.end
        {
            return Err(Error::InvalidConfig(format!(
                "domain [{}, {}) is empty or not finite",
                self.domain.start, self.domain.end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_reference_benchmark() {
        let config = BenchConfig::default();
        assert_eq!(config.trials, 10);
        assert_eq!(config.domain, Domain::new(-5.0, 5.0, 8192));
        assert_eq!(config.input_scale_bits, 30);
        assert_eq!(config.output_range_bits, 20);
        assert_eq!(config.security, SecurityLevel::Tc128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let config = BenchConfig::default().trials(3).seed(7).verbose(true);
        assert_eq!(config.trials, 3);
        assert_eq!(config.seed, Some(7));
        assert!(config.verbose);
    }

    #[test]
    fn rejects_zero_trials_and_bad_domains() {
        assert!(matches!(
            BenchConfig::default().trials(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(
            BenchConfig::default()
                .domain(Domain::new(-5.0, 5.0, 100))
                .validate()
                .is_err()
        );
        assert!(
            BenchConfig::default()
                .domain(Domain::new(1.0, -1.0, 8))
                .validate()
                .is_err()
        );
    }
}

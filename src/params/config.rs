//! Algorithm configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HgsError;

/// Hyperparameters of the hybrid genetic search and its ruin-and-recreate
/// neighbourhood.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
///
/// # Examples
///
/// ```
/// use hgs_rr::params::AlgorithmConfig;
///
/// let config = AlgorithmConfig::from_toml_str(r#"
///     seed = 7
///     nb_iter = 500
///     time_limit = 2.5
///     blink_probability = 0.0
/// "#).unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.nb_iter, 500);
/// assert_eq!(config.blink_probability, 0.0);
/// assert_eq!(config.mu, 25);
///
/// let config = AlgorithmConfig::default()
///     .with_seed(1)
///     .with_gamma(0.5)
///     .with_temperatures(50.0, 0.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AlgorithmConfig {
    /// Seed of the shared random stream.
    pub seed: u64,
    /// Cap on consecutive iterations without improvement.
    pub nb_iter: usize,
    /// Wall-clock budget in seconds, 0 = unlimited.
    pub time_limit: f64,
    /// Iterations between two penalty recalibrations.
    pub nb_iter_penalty_management: usize,
    /// Iterations between two progress snapshots.
    pub nb_iter_traces: usize,
    /// Emit run start/finish and progress snapshots.
    pub verbose: bool,

    /// Size of the granular neighbour lists used by local search.
    pub nb_granular: usize,
    /// Minimum subpopulation size.
    pub mu: usize,
    /// Generation size: survivor selection runs at `mu + lambda`.
    pub lambda: usize,
    /// Elite individuals shielded by biased fitness.
    pub nb_elite: usize,
    /// Closest individuals used for the diversity contribution.
    pub nb_close: usize,
    /// Target fraction of feasible local-search outcomes.
    pub target_feasible: f64,
    /// Penalty multiplier when too few outcomes are feasible.
    pub penalty_increase: f64,
    /// Penalty multiplier when too many outcomes are feasible.
    pub penalty_decrease: f64,

    /// Starting temperature of the annealing schedule.
    pub initial_temperature: f64,
    /// Temperature reached after `gamma * nb_clients` cooling steps.
    pub final_temperature: f64,
    /// Ruin-and-recreate iterations per customer.
    pub gamma: f64,
    /// Fraction of customers removed by one ruin.
    pub avg_customers_to_remove: f64,
    /// Maximum length of a removed string.
    pub max_string_length: usize,
    /// Probability of skipping past an insertion candidate.
    pub blink_probability: f64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            nb_iter: 20_000,
            time_limit: 0.0,
            nb_iter_penalty_management: 100,
            nb_iter_traces: 500,
            verbose: false,
            nb_granular: 20,
            mu: 25,
            lambda: 40,
            nb_elite: 4,
            nb_close: 5,
            target_feasible: 0.2,
            penalty_increase: 1.2,
            penalty_decrease: 0.85,
            initial_temperature: 100.0,
            final_temperature: 1.0,
            gamma: 1.0,
            avg_customers_to_remove: 0.1,
            max_string_length: 10,
            blink_probability: 0.01,
        }
    }
}

impl AlgorithmConfig {
    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HgsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, HgsError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_nb_iter(mut self, nb_iter: usize) -> Self {
        self.nb_iter = nb_iter;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_population(mut self, mu: usize, lambda: usize) -> Self {
        self.mu = mu;
        self.lambda = lambda;
        self
    }

    pub fn with_temperatures(mut self, initial: f64, final_temperature: f64) -> Self {
        self.initial_temperature = initial;
        self.final_temperature = final_temperature;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_avg_customers_to_remove(mut self, fraction: f64) -> Self {
        self.avg_customers_to_remove = fraction;
        self
    }

    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    pub fn with_blink_probability(mut self, p: f64) -> Self {
        self.blink_probability = p;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), HgsError> {
        let invalid = |msg: String| -> Result<(), HgsError> { Err(HgsError::InvalidConfig(msg)) };

        if !(self.time_limit >= 0.0) {
            return invalid(format!("time_limit must be >= 0, got {}", self.time_limit));
        }
        if self.nb_iter_penalty_management == 0 || self.nb_iter_traces == 0 {
            return invalid("iteration cadences must be positive".into());
        }
        if self.mu == 0 || self.lambda == 0 || self.nb_close == 0 {
            return invalid("mu, lambda and nb_close must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.target_feasible) {
            return invalid(format!(
                "target_feasible must be in [0, 1], got {}",
                self.target_feasible
            ));
        }
        if !(self.penalty_increase > 1.0) {
            return invalid(format!(
                "penalty_increase must be > 1, got {}",
                self.penalty_increase
            ));
        }
        if !(self.penalty_decrease > 0.0 && self.penalty_decrease < 1.0) {
            return invalid(format!(
                "penalty_decrease must be in (0, 1), got {}",
                self.penalty_decrease
            ));
        }
        if !(self.initial_temperature > 0.0 && self.final_temperature > 0.0) {
            return invalid("temperatures must be positive".into());
        }
        if self.final_temperature >= self.initial_temperature {
            return invalid("final_temperature must be less than initial_temperature".into());
        }
        if !(self.gamma > 0.0) {
            return invalid(format!("gamma must be positive, got {}", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.avg_customers_to_remove) {
            return invalid(format!(
                "avg_customers_to_remove must be in [0, 1], got {}",
                self.avg_customers_to_remove
            ));
        }
        if self.max_string_length == 0 {
            return invalid("max_string_length must be at least 1".into());
        }
        if !(self.blink_probability >= 0.0 && self.blink_probability < 1.0) {
            return invalid(format!(
                "blink_probability must be in [0, 1), got {}",
                self.blink_probability
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AlgorithmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mu, 25);
        assert_eq!(config.lambda, 40);
        assert_eq!(config.time_limit, 0.0);
    }

    #[test]
    fn test_partial_toml() {
        let config = AlgorithmConfig::from_toml_str(
            r#"
            seed = 3
            verbose = true
            max_string_length = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 3);
        assert!(config.verbose);
        assert_eq!(config.max_string_length, 4);
        assert_eq!(config.nb_granular, 20);
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = AlgorithmConfig::from_toml_str("seed = = 3").unwrap_err();
        assert!(matches!(err, HgsError::Toml(_)));
    }

    #[test]
    fn test_toml_invalid_values() {
        let err = AlgorithmConfig::from_toml_str("blink_probability = 1.0").unwrap_err();
        assert!(matches!(err, HgsError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AlgorithmConfig::from_toml_file("/nonexistent/hgs.toml").unwrap_err();
        assert!(matches!(err, HgsError::Io(_)));
    }

    #[test]
    fn test_validate_temperatures() {
        let config = AlgorithmConfig::default().with_temperatures(1.0, 10.0);
        assert!(config.validate().is_err());
        let config = AlgorithmConfig::default().with_temperatures(-1.0, 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_removal() {
        assert!(AlgorithmConfig::default()
            .with_avg_customers_to_remove(1.5)
            .validate()
            .is_err());
        assert!(AlgorithmConfig::default()
            .with_max_string_length(0)
            .validate()
            .is_err());
        assert!(AlgorithmConfig::default().with_gamma(0.0).validate().is_err());
    }

    #[test]
    fn test_roundtrip_serialize() {
        let config = AlgorithmConfig::default().with_seed(11).with_nb_iter(42);
        let text = toml::to_string(&config).unwrap();
        let back = AlgorithmConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }
}

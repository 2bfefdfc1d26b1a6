//! Run context shared by every search component.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::HgsError;
use crate::models::Instance;

use super::AlgorithmConfig;

/// Instance data, hyperparameters, penalty weights and the shared random
/// stream of one run.
///
/// Every stochastic decision draws from [`Params::rng`], so the sequence
/// of calls fully determines a run for a given seed. Only the penalty
/// weights change during the search (recalibrated by the population).
///
/// # Examples
///
/// ```
/// use hgs_rr::models::{Customer, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10.0),
///     Customer::new(2, 2.0, 0.0, 10.0),
/// ];
/// let instance = Instance::from_customers(customers, 30.0).with_vehicles(2);
/// let params = Params::new(instance, AlgorithmConfig::default().with_seed(42)).unwrap();
/// assert_eq!(params.nb_clients(), 2);
/// assert_eq!(params.penalty_duration, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Params {
    /// Instance data.
    pub instance: Instance,
    /// Hyperparameters.
    pub config: AlgorithmConfig,
    /// The shared random stream.
    pub rng: ChaCha8Rng,
    /// Weight of one unit of capacity excess.
    pub penalty_capacity: f64,
    /// Weight of one unit of duration excess.
    pub penalty_duration: f64,
    /// Granular neighbour list of each location.
    pub correlated: Vec<Vec<usize>>,
    /// Wall-clock start of the run.
    pub start_time: Instant,
}

impl Params {
    /// Validates instance and configuration and seeds the random stream.
    pub fn new(instance: Instance, config: AlgorithmConfig) -> Result<Self, HgsError> {
        instance.validate()?;
        config.validate()?;

        let max_demand = instance.max_demand();
        let penalty_capacity = if max_demand > 0.0 {
            (instance.distances().max_distance() / max_demand).clamp(0.1, 1000.0)
        } else {
            1000.0
        };
        let correlated = instance.distances().correlated_neighbors(config.nb_granular);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            instance,
            config,
            rng,
            penalty_capacity,
            penalty_duration: 1.0,
            correlated,
            start_time: Instant::now(),
        })
    }

    /// Number of customers (excluding depot).
    pub fn nb_clients(&self) -> usize {
        self.instance.num_clients()
    }

    /// Number of vehicles.
    pub fn nb_vehicles(&self) -> usize {
        self.instance.num_vehicles()
    }

    /// Time elapsed since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// `true` when a time budget is configured and has been used up.
    pub fn time_exceeded(&self) -> bool {
        self.config.time_limit > 0.0 && self.elapsed().as_secs_f64() >= self.config.time_limit
    }

    /// Number of ruin-and-recreate iterations granted to one offspring.
    pub fn rr_iterations(&self) -> usize {
        (self.config.gamma * self.nb_clients() as f64).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::Customer;
    use rand::Rng;

    #[test]
    fn test_initial_penalties() {
        // max distance 4 (depot to customer 4), max demand 10
        let params = fixtures::line_params(4, 100.0, 2);
        assert!((params.penalty_capacity - 0.4).abs() < 1e-12);
        assert_eq!(params.penalty_duration, 1.0);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = fixtures::line_params(4, 100.0, 2);
        let mut b = fixtures::line_params(4, 100.0, 2);
        let xs: Vec<u32> = (0..8).map(|_| a.rng.random()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let customers = vec![Customer::depot(0.0, 0.0), Customer::new(1, 1.0, 0.0, 1.0)];
        let bad_instance = Instance::from_customers(customers.clone(), -1.0);
        assert!(Params::new(bad_instance, AlgorithmConfig::default()).is_err());

        let instance = Instance::from_customers(customers, 10.0);
        let bad_config = AlgorithmConfig::default().with_blink_probability(2.0);
        assert!(Params::new(instance, bad_config).is_err());
    }

    #[test]
    fn test_rr_iterations_floor() {
        let mut params = fixtures::line_params(5, 100.0, 2);
        params.config.gamma = 0.5;
        assert_eq!(params.rr_iterations(), 2);
    }

    #[test]
    fn test_time_budget() {
        let mut params = fixtures::line_params(3, 100.0, 1);
        assert!(!params.time_exceeded());
        params.config.time_limit = 1e-9;
        std::thread::sleep(Duration::from_millis(1));
        assert!(params.time_exceeded());
    }
}

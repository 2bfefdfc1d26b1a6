//! Simulated-annealing ruin-and-recreate loop.

use rand::Rng;
use tracing::trace;

use crate::models::{Individual, EPSILON};
use crate::params::Params;

use super::destroy::adjacent_string_removal;
use super::repair::greedy_insertion_with_blinks;

/// Statistics of one [`RuinAndRecreate::apply`] call.
#[derive(Debug, Clone, Default)]
pub struct RuinAndRecreateReport {
    /// Iterations executed, skipped ones included.
    pub iterations: usize,

    /// Candidates accepted by the Metropolis rule (improvements included).
    pub accepted: usize,

    /// Accepted candidates that improved the best solution.
    pub improvements: usize,

    /// Accepted candidates worse than the current solution by more than
    /// [`EPSILON`].
    pub uphill: usize,

    /// Iterations whose ruin removed nothing.
    pub skipped: usize,

    /// Temperature after the last cooling step.
    pub final_temperature: f64,

    /// Best penalized cost after each iteration.
    pub best_cost_trace: Vec<f64>,
}

/// Ruin-and-recreate improvement under simulated annealing.
///
/// The temperature starts at `initial_temperature` and is multiplied by a
/// constant cooling factor after each productive iteration, reaching
/// `final_temperature` after `gamma * nb_clients` steps.
///
/// # Examples
///
/// ```
/// use hgs_rr::alns::RuinAndRecreate;
/// use hgs_rr::ga::Split;
/// use hgs_rr::models::{Customer, Individual, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers: Vec<Customer> = std::iter::once(Customer::depot(0.0, 0.0))
///     .chain((1..=12).map(|i| Customer::new(i, (i % 4) as f64, (i / 4) as f64, 5.0)))
///     .collect();
/// let instance = Instance::from_customers(customers, 20.0).with_vehicles(4);
/// let config = AlgorithmConfig::default().with_seed(1).with_avg_customers_to_remove(0.25);
/// let mut params = Params::new(instance, config).unwrap();
///
/// let mut indiv = Individual::random(12, 4, &mut params.rng);
/// Split::new().general_split(&mut indiv, 3, &params);
/// indiv.evaluate_complete_cost(&params);
/// let before = indiv.eval.penalized_cost;
///
/// let rr = RuinAndRecreate::new(&params);
/// let report = rr.apply(&mut indiv, params.rr_iterations(), &mut params);
/// assert_eq!(report.iterations, 12);
/// assert!(indiv.eval.penalized_cost <= before);
/// ```
#[derive(Debug, Clone)]
pub struct RuinAndRecreate {
    cooling_factor: f64,
}

impl RuinAndRecreate {
    /// Precomputes the geometric cooling factor
    /// `(T_final / T_0)^(1 / (gamma * nb_clients))`.
    pub fn new(params: &Params) -> Self {
        let config = &params.config;
        let steps = config.gamma * params.nb_clients() as f64;
        let cooling_factor =
            (config.final_temperature / config.initial_temperature).powf(1.0 / steps);
        Self { cooling_factor }
    }

    pub fn cooling_factor(&self) -> f64 {
        self.cooling_factor
    }

    /// Runs `num_iterations` ruin/recreate steps and replaces `solution` with
    /// the best individual encountered.
    ///
    /// `solution` must be evaluated on entry. An iteration whose ruin
    /// removes nothing is counted but neither recreates nor cools.
    pub fn apply(
        &self,
        solution: &mut Individual,
        num_iterations: usize,
        params: &mut Params,
    ) -> RuinAndRecreateReport {
        let mut best = solution.clone();
        let mut current = solution.clone();
        let mut temperature = params.config.initial_temperature;
        let mut report = RuinAndRecreateReport {
            best_cost_trace: Vec::with_capacity(num_iterations),
            ..RuinAndRecreateReport::default()
        };

        for _ in 0..num_iterations {
            report.iterations += 1;

            let removed = adjacent_string_removal(params);
            if removed.is_empty() {
                report.skipped += 1;
                report.best_cost_trace.push(best.eval.penalized_cost);
                continue;
            }

            let mut candidate = current.clone();
            greedy_insertion_with_blinks(&mut candidate, &removed, params);

            let delta = current.eval.penalized_cost - candidate.eval.penalized_cost;
            if delta > 0.0 || params.rng.random::<f64>().ln() < delta / temperature {
                report.accepted += 1;
                if delta < -EPSILON {
                    report.uphill += 1;
                }
                if candidate.eval.penalized_cost < best.eval.penalized_cost {
                    report.improvements += 1;
                    best = candidate.clone();
                }
                current = candidate;
            }

            temperature *= self.cooling_factor;
            report.best_cost_trace.push(best.eval.penalized_cost);
        }

        report.final_temperature = temperature;
        trace!(
            iterations = report.iterations,
            accepted = report.accepted,
            improvements = report.improvements,
            uphill = report.uphill,
            skipped = report.skipped,
            best_cost = best.eval.penalized_cost,
            "ruin and recreate finished"
        );

        *solution = best;
        report
    }
}

//! Hybrid genetic search driver.

use rand::Rng;
use tracing::info;

use crate::alns::RuinAndRecreate;
use crate::error::HgsError;
use crate::local_search::LocalSearch;
use crate::models::Individual;
use crate::params::Params;

use super::{crossover_ox, Population, Split};

/// Hybrid genetic search with a ruin-and-recreate education step.
///
/// Each generation draws two parents by binary tournament, builds one
/// offspring by order crossover, improves it by local search and
/// simulated-annealing ruin-and-recreate, then offers it to the
/// population. Infeasible offspring get, with probability 1/2, a second
/// local search with penalties multiplied by 10.
///
/// The run stops after `nb_iter` consecutive generations without a new
/// best solution, or when the time budget is spent. With a time budget,
/// reaching `nb_iter` non-improving generations restarts the population
/// instead of stopping.
///
/// # Examples
///
/// ```
/// use hgs_rr::ga::Genetic;
/// use hgs_rr::models::{Customer, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers: Vec<Customer> = std::iter::once(Customer::depot(0.0, 0.0))
///     .chain((1..=10).map(|i| Customer::new(i, (i % 5) as f64, (i / 5) as f64, 10.0)))
///     .collect();
/// let instance = Instance::from_customers(customers, 50.0).with_vehicles(4);
/// let config = AlgorithmConfig::default()
///     .with_seed(42)
///     .with_nb_iter(30)
///     .with_population(4, 6);
/// let params = Params::new(instance, config).unwrap();
///
/// let mut genetic = Genetic::new(params).unwrap();
/// genetic.run();
/// assert!(genetic.iterations() >= 30);
/// assert_eq!(genetic.stats().restarts, 0);
/// ```
#[derive(Debug)]
pub struct Genetic {
    params: Params,
    split: Split,
    local_search: LocalSearch,
    population: Population,
    offspring: Individual,
    rnr: RuinAndRecreate,
    stats: GeneticStats,
}

/// Counters of the last [`Genetic::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneticStats {
    /// Generations executed.
    pub iterations: usize,
    /// Population restarts triggered by stagnation under a time budget.
    pub restarts: usize,
    /// Infeasible offspring sent through the x10 penalty local search.
    pub repair_attempts: usize,
    /// Repaired offspring that came out feasible and were inserted again.
    pub repaired: usize,
}

impl Genetic {
    /// Builds the search components.
    ///
    /// Fails when the instance has fewer than 2 customers, which order
    /// crossover cannot handle.
    pub fn new(params: Params) -> Result<Self, HgsError> {
        let n = params.nb_clients();
        if n < 2 {
            return Err(HgsError::TooFewCustomers { found: n });
        }
        Ok(Self {
            split: Split::new(),
            local_search: LocalSearch::new(&params),
            population: Population::new(),
            offspring: Individual::new(n, params.nb_vehicles()),
            rnr: RuinAndRecreate::new(&params),
            stats: GeneticStats::default(),
            params,
        })
    }

    /// Runs the search and returns the best feasible solution found.
    pub fn run(&mut self) -> Option<&Individual> {
        let Self {
            params,
            split,
            local_search,
            population,
            offspring,
            rnr,
            stats,
        } = self;
        *stats = GeneticStats::default();

        population.generate_population(params, split, local_search);
        if params.config.verbose {
            info!(
                nb_clients = params.nb_clients(),
                nb_vehicles = params.nb_vehicles(),
                "starting genetic algorithm"
            );
        }

        let mut nb_iter = 0;
        let mut nb_iter_non_prod = 1;
        while nb_iter_non_prod <= params.config.nb_iter && !params.time_exceeded() {
            population.update_biased_fitnesses(params);
            let Some(parent1) = population.binary_tournament(&mut params.rng) else {
                break;
            };
            let Some(parent2) = population.binary_tournament(&mut params.rng) else {
                break;
            };
            crossover_ox(offspring, parent1, parent2, params, split);

            let (pc, pd) = (params.penalty_capacity, params.penalty_duration);
            local_search.run(offspring, pc, pd, params);
            rnr.apply(offspring, params.rr_iterations(), params);

            let mut is_new_best = population.add_individual(offspring, true, params);
            if !offspring.eval.is_feasible && params.rng.random_range(0..2) == 0 {
                stats.repair_attempts += 1;
                if let Some(new_best) = repair(offspring, local_search, population, params) {
                    stats.repaired += 1;
                    is_new_best |= new_best;
                }
            }

            if is_new_best {
                nb_iter_non_prod = 1;
            } else {
                nb_iter_non_prod += 1;
            }

            if nb_iter % params.config.nb_iter_penalty_management == 0 {
                population.manage_penalties(params);
            }
            if nb_iter % params.config.nb_iter_traces == 0 {
                population.print_state(nb_iter, nb_iter_non_prod, params);
            }
            if params.config.time_limit > 0.0 && nb_iter_non_prod == params.config.nb_iter {
                population.restart(params, split, local_search);
                stats.restarts += 1;
                nb_iter_non_prod = 1;
            }
            nb_iter += 1;
        }

        stats.iterations = nb_iter;
        if params.config.verbose {
            info!(
                iterations = nb_iter,
                elapsed = params.elapsed().as_secs_f64(),
                best_cost = population.best_found().map(|b| b.eval.penalized_cost),
                "genetic algorithm finished"
            );
        }
        population.best_found()
    }

    /// Generations executed by the last [`run`](Self::run).
    pub fn iterations(&self) -> usize {
        self.stats.iterations
    }

    pub fn stats(&self) -> GeneticStats {
        self.stats
    }

    pub fn best_found(&self) -> Option<&Individual> {
        self.population.best_found()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Second local search on an infeasible offspring with penalties x10.
///
/// The offspring is offered to the population, without recording its
/// feasibility, only if it comes out feasible. Returns whether it became
/// the best solution since restart, or `None` when it stayed infeasible.
fn repair(
    offspring: &mut Individual,
    local_search: &mut LocalSearch,
    population: &mut Population,
    params: &mut Params,
) -> Option<bool> {
    let (pc, pd) = (params.penalty_capacity, params.penalty_duration);
    local_search.run(offspring, pc * 10.0, pd * 10.0, params);
    if !offspring.eval.is_feasible {
        return None;
    }
    Some(population.add_individual(offspring, false, params))
}

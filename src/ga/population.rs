//! Feasible and infeasible subpopulations with diversity management.
//!
//! Individuals are ranked by a biased fitness mixing their cost rank with
//! their diversity rank (mean broken-pairs distance to their closest
//! neighbours). When a subpopulation outgrows `mu + lambda`, the worst
//! individuals by biased fitness are removed (clones first) until `mu`
//! remain.
//!
//! # Reference
//!
//! Vidal, T., Crainic, T.G., Gendreau, M., Lahrichi, N. & Rei, W. (2012).
//! "A Hybrid Genetic Algorithm for Multidepot and Periodic Vehicle Routing
//! Problems", *Operations Research* 60(3), 611-624.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info};

use crate::local_search::LocalSearch;
use crate::models::{Individual, EPSILON};
use crate::params::Params;

use super::Split;

/// Number of recent local-search outcomes used for penalty management.
const FEASIBILITY_WINDOW: usize = 100;
const PENALTY_MIN: f64 = 0.1;
const PENALTY_MAX: f64 = 100_000.0;
/// Tolerance band around the target feasible fraction.
const FEASIBILITY_BAND: f64 = 0.05;

#[derive(Debug, Clone)]
struct Member {
    individual: Individual,
    id: u64,
    /// Broken-pairs distance to every other member, ascending.
    proximity: Vec<(f64, u64)>,
}

/// Individuals sorted by increasing penalized cost.
#[derive(Debug, Clone, Default)]
struct SubPopulation {
    members: Vec<Member>,
}

impl SubPopulation {
    fn len(&self) -> usize {
        self.members.len()
    }

    fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn clear(&mut self) {
        self.members.clear();
    }

    fn insert(&mut self, individual: Individual, id: u64) {
        let mut proximity = Vec::with_capacity(self.members.len());
        for other in &mut self.members {
            let d = individual.broken_pairs_distance(&other.individual);
            insert_sorted(&mut other.proximity, (d, id));
            insert_sorted(&mut proximity, (d, other.id));
        }

        let cost = individual.eval.penalized_cost;
        let place = self
            .members
            .partition_point(|m| m.individual.eval.penalized_cost <= cost);
        self.members.insert(
            place,
            Member {
                individual,
                id,
                proximity,
            },
        );
    }

    /// Mean distance from member `idx` to its `nb_closest` closest members.
    fn avg_distance_closest(&self, idx: usize, nb_closest: usize) -> f64 {
        let proximity = &self.members[idx].proximity;
        let count = nb_closest.min(proximity.len());
        if count == 0 {
            return 0.0;
        }
        proximity[..count].iter().map(|&(d, _)| d).sum::<f64>() / count as f64
    }

    fn update_biased_fitnesses(&mut self, nb_close: usize, nb_elite: usize) {
        let size = self.members.len();
        if size == 0 {
            return;
        }
        if size == 1 {
            self.members[0].individual.biased_fitness = 0.0;
            return;
        }

        // Most diverse first, ties broken by cost rank
        let mut ranking: Vec<(f64, usize)> = (0..size)
            .map(|i| (-self.avg_distance_closest(i, nb_close), i))
            .collect();
        ranking.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let denom = (size - 1) as f64;
        for (div_rank, &(_, idx)) in ranking.iter().enumerate() {
            let div_rank = div_rank as f64 / denom;
            let fit_rank = idx as f64 / denom;
            self.members[idx].individual.biased_fitness = if size <= nb_elite {
                fit_rank
            } else {
                fit_rank + (1.0 - nb_elite as f64 / size as f64) * div_rank
            };
        }
    }

    /// Removes the worst member by biased fitness, clones first. The
    /// cheapest member is never removed.
    fn remove_worst_biased_fitness(&mut self, nb_close: usize, nb_elite: usize) {
        self.update_biased_fitnesses(nb_close, nb_elite);
        if self.members.len() <= 1 {
            return;
        }

        let mut worst = 1;
        let mut worst_is_clone = self.avg_distance_closest(1, 1) < EPSILON;
        let mut worst_fitness = self.members[1].individual.biased_fitness;
        for i in 2..self.members.len() {
            let is_clone = self.avg_distance_closest(i, 1) < EPSILON;
            let fitness = self.members[i].individual.biased_fitness;
            if (is_clone && !worst_is_clone)
                || (is_clone == worst_is_clone && fitness > worst_fitness)
            {
                worst = i;
                worst_is_clone = is_clone;
                worst_fitness = fitness;
            }
        }

        let removed = self.members.remove(worst);
        for member in &mut self.members {
            member.proximity.retain(|&(_, id)| id != removed.id);
        }
    }

    /// Re-prices every member with new penalty weights and re-sorts.
    fn recost(&mut self, penalty_capacity: f64, penalty_duration: f64) {
        for member in &mut self.members {
            let eval = &mut member.individual.eval;
            eval.penalized_cost = eval.distance
                + penalty_capacity * eval.capacity_excess
                + penalty_duration * eval.duration_excess;
        }
        self.members.sort_by(|a, b| {
            a.individual
                .eval
                .penalized_cost
                .total_cmp(&b.individual.eval.penalized_cost)
        });
    }

    /// Mean cost of the `mu` best members.
    fn average_cost(&self, mu: usize) -> f64 {
        let count = mu.min(self.members.len());
        if count == 0 {
            return -1.0;
        }
        self.members[..count]
            .iter()
            .map(|m| m.individual.eval.penalized_cost)
            .sum::<f64>()
            / count as f64
    }

    /// Mean closest-neighbour distance over the `mu` best members.
    fn diversity(&self, mu: usize, nb_close: usize) -> f64 {
        let count = mu.min(self.members.len());
        if count == 0 {
            return -1.0;
        }
        (0..count)
            .map(|i| self.avg_distance_closest(i, nb_close))
            .sum::<f64>()
            / count as f64
    }

    fn best_cost(&self) -> Option<f64> {
        self.members.first().map(|m| m.individual.eval.penalized_cost)
    }
}

fn insert_sorted(list: &mut Vec<(f64, u64)>, entry: (f64, u64)) {
    let place = list.partition_point(|&(d, _)| d <= entry.0);
    list.insert(place, entry);
}

/// The genetic archive.
///
/// # Examples
///
/// ```
/// use hgs_rr::ga::{Population, Split};
/// use hgs_rr::local_search::LocalSearch;
/// use hgs_rr::models::{Customer, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers: Vec<Customer> = std::iter::once(Customer::depot(0.0, 0.0))
///     .chain((1..=8).map(|i| Customer::new(i, i as f64, (i % 3) as f64, 10.0)))
///     .collect();
/// let instance = Instance::from_customers(customers, 40.0).with_vehicles(3);
/// let config = AlgorithmConfig::default().with_seed(5).with_population(4, 4);
/// let mut params = Params::new(instance, config).unwrap();
///
/// let split = Split::new();
/// let mut local_search = LocalSearch::new(&params);
/// let mut population = Population::new();
/// population.generate_population(&mut params, &split, &mut local_search);
///
/// assert!(population.len() >= 1);
/// assert!(population.num_feasible() <= 8);
/// ```
#[derive(Debug, Clone)]
pub struct Population {
    feasible: SubPopulation,
    infeasible: SubPopulation,
    next_id: u64,
    feasibility_load: VecDeque<bool>,
    feasibility_duration: VecDeque<bool>,
    best_restart: Option<Individual>,
    best_overall: Option<Individual>,
    search_progress: Vec<(f64, f64)>,
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    pub fn new() -> Self {
        Self {
            feasible: SubPopulation::default(),
            infeasible: SubPopulation::default(),
            next_id: 0,
            feasibility_load: VecDeque::from(vec![true; FEASIBILITY_WINDOW]),
            feasibility_duration: VecDeque::from(vec![true; FEASIBILITY_WINDOW]),
            best_restart: None,
            best_overall: None,
            search_progress: Vec::new(),
        }
    }

    /// Seeds the archive with up to `4 * mu` random individuals.
    ///
    /// Each one is split over the whole fleet and improved by local search.
    /// Infeasible ones get, with probability 1/2, a second local search with
    /// penalties multiplied by 10 and are inserted again if that repairs
    /// them. Generation stops early once the time budget is spent, but at
    /// least one individual is always produced.
    pub fn generate_population(
        &mut self,
        params: &mut Params,
        split: &Split,
        local_search: &mut LocalSearch,
    ) {
        let n = params.nb_clients();
        let v = params.nb_vehicles();

        for i in 0..4 * params.config.mu {
            if i > 0 && params.time_exceeded() {
                break;
            }
            let mut indiv = Individual::random(n, v, &mut params.rng);
            split.general_split(&mut indiv, v, params);
            let (pc, pd) = (params.penalty_capacity, params.penalty_duration);
            local_search.run(&mut indiv, pc, pd, params);
            self.add_individual(&indiv, true, params);

            if !indiv.eval.is_feasible && params.rng.random_range(0..2) == 0 {
                local_search.run(&mut indiv, pc * 10.0, pd * 10.0, params);
                if indiv.eval.is_feasible {
                    self.add_individual(&indiv, false, params);
                }
            }
        }
    }

    /// Inserts a copy of `indiv` into the matching subpopulation.
    ///
    /// With `update_feasible`, the individual's capacity and duration
    /// feasibility is recorded for penalty management. Returns `true` if it
    /// is a new best feasible solution since the last restart.
    pub fn add_individual(
        &mut self,
        indiv: &Individual,
        update_feasible: bool,
        params: &Params,
    ) -> bool {
        if !indiv.is_complete(params.nb_clients()) {
            debug!(
                routed = indiv.chrom_t.len(),
                expected = params.nb_clients(),
                "refusing individual with unrouted customers"
            );
            return false;
        }

        if update_feasible {
            push_window(
                &mut self.feasibility_load,
                indiv.eval.capacity_excess < EPSILON,
            );
            push_window(
                &mut self.feasibility_duration,
                indiv.eval.duration_excess < EPSILON,
            );
        }

        let config = &params.config;
        let id = self.next_id;
        self.next_id += 1;

        let subpop = if indiv.eval.is_feasible {
            &mut self.feasible
        } else {
            &mut self.infeasible
        };
        subpop.insert(indiv.clone(), id);
        if subpop.len() > config.mu + config.lambda {
            while subpop.len() > config.mu {
                subpop.remove_worst_biased_fitness(config.nb_close, config.nb_elite);
            }
        }

        if !indiv.eval.is_feasible {
            return false;
        }
        let cost = indiv.eval.penalized_cost;
        if self
            .best_restart
            .as_ref()
            .is_some_and(|best| cost >= best.eval.penalized_cost - EPSILON)
        {
            return false;
        }
        self.best_restart = Some(indiv.clone());

        let beats_overall = self
            .best_overall
            .as_ref()
            .is_none_or(|best| cost < best.eval.penalized_cost - EPSILON);
        if beats_overall {
            self.best_overall = Some(indiv.clone());
            self.search_progress
                .push((params.elapsed().as_secs_f64(), cost));
        }
        true
    }

    /// Refreshes the biased fitness of every member.
    pub fn update_biased_fitnesses(&mut self, params: &Params) {
        let config = &params.config;
        self.feasible
            .update_biased_fitnesses(config.nb_close, config.nb_elite);
        self.infeasible
            .update_biased_fitnesses(config.nb_close, config.nb_elite);
    }

    /// Binary tournament over both subpopulations: two uniform draws, the
    /// lower biased fitness wins.
    ///
    /// Biased fitnesses must be up to date (see
    /// [`update_biased_fitnesses`](Self::update_biased_fitnesses)).
    /// Returns `None` on an empty archive.
    pub fn binary_tournament<R: Rng>(&self, rng: &mut R) -> Option<&Individual> {
        let total = self.len();
        if total == 0 {
            return None;
        }
        let first = self.get(rng.random_range(0..total))?;
        let second = self.get(rng.random_range(0..total))?;
        if first.biased_fitness < second.biased_fitness {
            Some(first)
        } else {
            Some(second)
        }
    }

    /// Adjusts the penalty weights toward the target feasible fraction and
    /// re-prices the infeasible subpopulation.
    pub fn manage_penalties(&mut self, params: &mut Params) {
        let config = &params.config;
        params.penalty_capacity = adjust_penalty(
            params.penalty_capacity,
            fraction_true(&self.feasibility_load),
            config.target_feasible,
            config.penalty_increase,
            config.penalty_decrease,
        );
        params.penalty_duration = adjust_penalty(
            params.penalty_duration,
            fraction_true(&self.feasibility_duration),
            config.target_feasible,
            config.penalty_increase,
            config.penalty_decrease,
        );
        debug!(
            penalty_capacity = params.penalty_capacity,
            penalty_duration = params.penalty_duration,
            "penalties recalibrated"
        );
        self.infeasible
            .recost(params.penalty_capacity, params.penalty_duration);
    }

    /// Empties both subpopulations and regenerates from scratch.
    ///
    /// The best solution since restart is forgotten; the overall best is kept.
    pub fn restart(&mut self, params: &mut Params, split: &Split, local_search: &mut LocalSearch) {
        info!("population restart");
        self.clear();
        self.generate_population(params, split, local_search);
    }

    fn clear(&mut self) {
        self.feasible.clear();
        self.infeasible.clear();
        self.best_restart = None;
    }

    /// Emits a progress snapshot when the run is verbose.
    pub fn print_state(&self, nb_iter: usize, nb_iter_no_improvement: usize, params: &Params) {
        if !params.config.verbose {
            return;
        }
        let config = &params.config;
        info!(
            iteration = nb_iter,
            no_improvement = nb_iter_no_improvement,
            elapsed = params.elapsed().as_secs_f64(),
            feasible = self.feasible.len(),
            best_feasible = self.feasible.best_cost().unwrap_or(-1.0),
            avg_feasible = self.feasible.average_cost(config.mu),
            infeasible = self.infeasible.len(),
            best_infeasible = self.infeasible.best_cost().unwrap_or(-1.0),
            avg_infeasible = self.infeasible.average_cost(config.mu),
            diversity_feasible = self.feasible.diversity(config.mu, config.nb_close),
            diversity_infeasible = self.infeasible.diversity(config.mu, config.nb_close),
            feasible_load = fraction_true(&self.feasibility_load),
            feasible_duration = fraction_true(&self.feasibility_duration),
            penalty_capacity = params.penalty_capacity,
            penalty_duration = params.penalty_duration,
            "search state"
        );
    }

    /// Best feasible individual found over the whole run.
    pub fn best_found(&self) -> Option<&Individual> {
        self.best_overall.as_ref()
    }

    /// Best feasible individual found since the last restart.
    pub fn best_since_restart(&self) -> Option<&Individual> {
        self.best_restart.as_ref()
    }

    /// `(elapsed seconds, cost)` each time the overall best improved.
    pub fn search_progress(&self) -> &[(f64, f64)] {
        &self.search_progress
    }

    /// Total number of individuals.
    pub fn len(&self) -> usize {
        self.feasible.len() + self.infeasible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feasible.is_empty() && self.infeasible.is_empty()
    }

    pub fn num_feasible(&self) -> usize {
        self.feasible.len()
    }

    pub fn num_infeasible(&self) -> usize {
        self.infeasible.len()
    }

    /// Individual at `index`, feasible members first.
    fn get(&self, index: usize) -> Option<&Individual> {
        let nb_feasible = self.feasible.len();
        let member = if index < nb_feasible {
            self.feasible.members.get(index)
        } else {
            self.infeasible.members.get(index - nb_feasible)
        };
        member.map(|m| &m.individual)
    }
}

fn push_window(window: &mut VecDeque<bool>, value: bool) {
    window.push_back(value);
    if window.len() > FEASIBILITY_WINDOW {
        window.pop_front();
    }
}

fn fraction_true(window: &VecDeque<bool>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|&&b| b).count() as f64 / window.len() as f64
}

fn adjust_penalty(penalty: f64, fraction: f64, target: f64, increase: f64, decrease: f64) -> f64 {
    if fraction < target - FEASIBILITY_BAND && penalty < PENALTY_MAX {
        (penalty * increase).min(PENALTY_MAX)
    } else if fraction > target + FEASIBILITY_BAND && penalty > PENALTY_MIN {
        (penalty * decrease).max(PENALTY_MIN)
    } else {
        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::params::AlgorithmConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn evaluated(routes: Vec<Vec<usize>>, params: &Params) -> Individual {
        let mut indiv = Individual::new(params.nb_clients(), params.nb_vehicles());
        indiv.chrom_r = routes;
        indiv.chrom_r.resize(params.nb_vehicles(), Vec::new());
        indiv.rebuild_tour();
        indiv.evaluate_complete_cost(params);
        indiv
    }

    fn small_config() -> AlgorithmConfig {
        AlgorithmConfig::default().with_seed(1).with_population(2, 2)
    }

    #[test]
    fn test_add_routes_by_feasibility() {
        let params = fixtures::line_params_with(4, 20.0, 3, small_config());
        let mut pop = Population::new();

        let feasible = evaluated(vec![vec![1, 2], vec![3, 4]], &params);
        let infeasible = evaluated(vec![vec![1, 2, 3, 4]], &params);
        assert!(pop.add_individual(&feasible, true, &params));
        assert!(!pop.add_individual(&infeasible, true, &params));

        assert_eq!(pop.num_feasible(), 1);
        assert_eq!(pop.num_infeasible(), 1);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.feasibility_load.len(), FEASIBILITY_WINDOW);
        assert_eq!(pop.feasibility_load.back(), Some(&false));
    }

    #[test]
    fn test_new_best_requires_strict_improvement() {
        let params = fixtures::line_params_with(4, 20.0, 3, small_config());
        let mut pop = Population::new();

        let worse = evaluated(vec![vec![1, 3], vec![2, 4]], &params);
        let better = evaluated(vec![vec![1, 2], vec![3, 4]], &params);
        assert!(pop.add_individual(&worse, true, &params));
        assert!(pop.add_individual(&better, true, &params));
        assert!(!pop.add_individual(&better, true, &params));
        assert!(!pop.add_individual(&worse, true, &params));

        let best = pop.best_found().unwrap();
        assert_eq!(best.eval.penalized_cost, better.eval.penalized_cost);
        assert_eq!(pop.search_progress().len(), 2);
    }

    #[test]
    fn test_refuses_incomplete_individual() {
        let params = fixtures::line_params_with(4, 20.0, 3, small_config());
        let mut pop = Population::new();
        let partial = evaluated(vec![vec![1, 2], vec![3]], &params);
        assert!(!pop.add_individual(&partial, true, &params));
        assert!(pop.is_empty());
        assert!(pop.feasibility_load.iter().all(|&b| b));
    }

    #[test]
    fn test_survivor_selection_removes_clones_first() {
        let params = fixtures::line_params_with(6, 100.0, 3, small_config());
        let mut pop = Population::new();

        let a = evaluated(vec![vec![1, 2, 3, 4, 5, 6]], &params);
        let b = evaluated(vec![vec![1, 2, 3], vec![4, 5, 6]], &params);
        let c = evaluated(vec![vec![1, 3, 5], vec![2, 4, 6]], &params);
        for indiv in [&a, &a, &a, &b, &c] {
            pop.add_individual(indiv, true, &params);
        }
        // mu + lambda = 4 exceeded, trimmed back to mu = 2
        assert_eq!(pop.num_feasible(), 2);
        // The cheapest survives and the clones went first
        let members = &pop.feasible.members;
        assert_eq!(members[0].individual.chrom_r, a.chrom_r);
        assert!(pop.feasible.avg_distance_closest(0, 1) > EPSILON);
        assert!(members.iter().all(|m| m.proximity.len() == 1));
    }

    #[test]
    fn test_biased_fitness_single_and_ranked() {
        let params = fixtures::line_params_with(6, 100.0, 3, small_config());
        let mut pop = Population::new();
        let a = evaluated(vec![vec![1, 2, 3, 4, 5, 6]], &params);
        pop.add_individual(&a, true, &params);
        pop.update_biased_fitnesses(&params);
        assert_eq!(pop.feasible.members[0].individual.biased_fitness, 0.0);

        let b = evaluated(vec![vec![1, 2, 3], vec![4, 5, 6]], &params);
        pop.add_individual(&b, true, &params);
        pop.update_biased_fitnesses(&params);
        // Two members: equal diversity, so fitness follows cost rank
        let members = &pop.feasible.members;
        assert!(members[0].individual.biased_fitness < members[1].individual.biased_fitness);
    }

    #[test]
    fn test_binary_tournament() {
        let params = fixtures::line_params_with(4, 20.0, 3, small_config());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pop = Population::new();
        assert!(pop.binary_tournament(&mut rng).is_none());

        let indiv = evaluated(vec![vec![1, 2], vec![3, 4]], &params);
        pop.add_individual(&indiv, true, &params);
        pop.update_biased_fitnesses(&params);
        let chosen = pop.binary_tournament(&mut rng).unwrap();
        assert_eq!(chosen.chrom_t, indiv.chrom_t);
    }

    #[test]
    fn test_manage_penalties_direction() {
        let mut params = fixtures::line_params_with(4, 20.0, 3, small_config());
        let mut pop = Population::new();
        let start = params.penalty_capacity;

        // Window full of feasible outcomes: penalty relaxes
        pop.manage_penalties(&mut params);
        assert!((params.penalty_capacity - start * 0.85).abs() < 1e-12);

        // Mostly infeasible outcomes: penalty rises
        let infeasible = evaluated(vec![vec![1, 2, 3, 4]], &params);
        for _ in 0..100 {
            pop.add_individual(&infeasible, true, &params);
        }
        let before = params.penalty_capacity;
        pop.manage_penalties(&mut params);
        assert!((params.penalty_capacity - before * 1.2).abs() < 1e-12);

        // Infeasible members re-priced with the new weight
        let member = &pop.infeasible.members[0].individual;
        let expected = member.eval.distance + params.penalty_capacity * member.eval.capacity_excess;
        assert!((member.eval.penalized_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_penalty_bounds() {
        assert_eq!(adjust_penalty(0.1, 1.0, 0.2, 1.2, 0.85), 0.1);
        assert_eq!(adjust_penalty(0.11, 1.0, 0.2, 1.2, 0.85), 0.1);
        assert_eq!(adjust_penalty(99_000.0, 0.0, 0.2, 1.2, 0.85), 100_000.0);
        assert_eq!(adjust_penalty(5.0, 0.22, 0.2, 1.2, 0.85), 5.0);
    }

    #[test]
    fn test_generate_and_restart() {
        let config = AlgorithmConfig::default().with_seed(9).with_population(3, 3);
        let mut params = fixtures::cluster_params(10, 50.0, 5, config);
        let split = Split::new();
        let mut ls = LocalSearch::new(&params);
        let mut pop = Population::new();

        pop.generate_population(&mut params, &split, &mut ls);
        assert!(!pop.is_empty());
        assert!(pop.num_feasible() <= 6);
        let best = pop.best_found().cloned().unwrap();
        assert!(best.eval.is_feasible);
        let since_restart = pop.best_since_restart().unwrap();
        assert_eq!(since_restart.eval.penalized_cost, best.eval.penalized_cost);

        pop.clear();
        assert!(pop.is_empty());
        assert!(pop.best_since_restart().is_none());
        assert_eq!(pop.best_found().unwrap().chrom_t, best.chrom_t);

        pop.restart(&mut params, &split, &mut ls);
        assert!(!pop.is_empty());
        assert!(pop.best_found().unwrap().eval.penalized_cost <= best.eval.penalized_cost);
        if let Some(fresh) = pop.best_since_restart() {
            assert!(fresh.eval.penalized_cost >= pop.best_found().unwrap().eval.penalized_cost);
        }
    }
}

//! Individual: a solution in flat-tour and route-set form.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::evaluation;
use crate::params::Params;

/// Tolerance used for feasibility checks and cost comparisons.
pub const EPSILON: f64 = 1e-5;

/// Cost and feasibility of an individual.
///
/// Always recomputed from scratch by
/// [`evaluate_complete_cost`](crate::evaluation::evaluate_complete_cost).
#[derive(Debug, Clone, PartialEq)]
pub struct EvalIndiv {
    /// Distance plus weighted capacity and duration excess.
    pub penalized_cost: f64,
    /// Number of non-empty routes.
    pub nb_routes: usize,
    /// Total travelled distance.
    pub distance: f64,
    /// Sum over routes of load above vehicle capacity.
    pub capacity_excess: f64,
    /// Sum over routes of duration above the duration limit.
    pub duration_excess: f64,
    /// `true` when both excesses are (numerically) zero.
    pub is_feasible: bool,
}

impl Default for EvalIndiv {
    fn default() -> Self {
        Self {
            penalized_cost: 1.0e30,
            nb_routes: 0,
            distance: 0.0,
            capacity_excess: 0.0,
            duration_excess: 0.0,
            is_feasible: false,
        }
    }
}

/// A CVRP solution with a dual representation.
///
/// `chrom_t` is the flat tour (all routed customers, no depot) and
/// `chrom_r` holds one customer sequence per vehicle. Concatenating
/// `chrom_r` reproduces `chrom_t`.
///
/// # Examples
///
/// ```
/// use hgs_rr::models::Individual;
///
/// let mut indiv = Individual::new(4, 2);
/// assert_eq!(indiv.chrom_t, vec![1, 2, 3, 4]);
/// indiv.chrom_r = vec![vec![2, 1], vec![4, 3]];
/// indiv.rebuild_tour();
/// assert_eq!(indiv.chrom_t, vec![2, 1, 4, 3]);
/// assert!(indiv.is_complete(4));
/// ```
#[derive(Debug, Clone)]
pub struct Individual {
    /// Cost and feasibility, stale until the next evaluation.
    pub eval: EvalIndiv,
    /// Flat tour.
    pub chrom_t: Vec<usize>,
    /// Route set, one entry per vehicle (possibly empty).
    pub chrom_r: Vec<Vec<usize>>,
    /// Successor of each location in its route (0 = depot).
    pub successors: Vec<usize>,
    /// Predecessor of each location in its route (0 = depot).
    pub predecessors: Vec<usize>,
    /// Rank-based fitness maintained by the population.
    pub biased_fitness: f64,
}

impl Individual {
    /// Creates an individual with the identity tour and empty routes.
    pub fn new(nb_clients: usize, nb_vehicles: usize) -> Self {
        Self {
            eval: EvalIndiv::default(),
            chrom_t: (1..=nb_clients).collect(),
            chrom_r: vec![Vec::new(); nb_vehicles],
            successors: vec![0; nb_clients + 1],
            predecessors: vec![0; nb_clients + 1],
            biased_fitness: 0.0,
        }
    }

    /// Creates an individual whose flat tour is a uniformly random permutation.
    pub fn random<R: Rng>(nb_clients: usize, nb_vehicles: usize, rng: &mut R) -> Self {
        let mut indiv = Self::new(nb_clients, nb_vehicles);
        indiv.chrom_t.shuffle(rng);
        indiv
    }

    /// Recomputes `eval`, successors and predecessors from the routes.
    pub fn evaluate_complete_cost(&mut self, params: &Params) {
        evaluation::evaluate_complete_cost(self, params);
    }

    /// Rebuilds the flat tour by concatenating the routes in order.
    pub fn rebuild_tour(&mut self) {
        self.chrom_t.clear();
        for route in &self.chrom_r {
            self.chrom_t.extend_from_slice(route);
        }
    }

    /// Number of customers currently held by the routes.
    pub fn num_routed(&self) -> usize {
        self.chrom_r.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the flat tour is a permutation of `1..=nb_clients`.
    pub fn is_complete(&self, nb_clients: usize) -> bool {
        if self.chrom_t.len() != nb_clients {
            return false;
        }
        let mut seen = vec![false; nb_clients + 1];
        for &c in &self.chrom_t {
            if c == 0 || c > nb_clients || seen[c] {
                return false;
            }
            seen[c] = true;
        }
        true
    }

    /// Broken-pairs distance: fraction of customers whose neighbourhood differs.
    ///
    /// Requires both individuals to be evaluated on the same instance.
    pub fn broken_pairs_distance(&self, other: &Individual) -> f64 {
        let n = self.successors.len().saturating_sub(1);
        if n == 0 {
            return 0.0;
        }
        let mut differences = 0usize;
        for j in 1..=n {
            if self.successors[j] != other.successors[j]
                && self.successors[j] != other.predecessors[j]
            {
                differences += 1;
            }
            if self.predecessors[j] == 0
                && other.predecessors[j] != 0
                && other.successors[j] != 0
            {
                differences += 1;
            }
        }
        differences as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_identity() {
        let indiv = Individual::new(3, 2);
        assert_eq!(indiv.chrom_t, vec![1, 2, 3]);
        assert_eq!(indiv.chrom_r.len(), 2);
        assert!(indiv.chrom_r.iter().all(|r| r.is_empty()));
        assert!(!indiv.eval.is_feasible);
    }

    #[test]
    fn test_random_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let indiv = Individual::random(20, 3, &mut rng);
        assert!(indiv.is_complete(20));
    }

    #[test]
    fn test_is_complete_detects_drop_and_duplicates() {
        let mut indiv = Individual::new(3, 1);
        indiv.chrom_t = vec![1, 3];
        assert!(!indiv.is_complete(3));
        indiv.chrom_t = vec![1, 3, 3];
        assert!(!indiv.is_complete(3));
        indiv.chrom_t = vec![0, 1, 2];
        assert!(!indiv.is_complete(3));
    }

    #[test]
    fn test_broken_pairs_identical_and_reversed() {
        let params = fixtures::line_params(4, 100.0, 2);
        let mut a = Individual::new(4, 2);
        a.chrom_r = vec![vec![1, 2, 3, 4], vec![]];
        a.evaluate_complete_cost(&params);

        let mut b = a.clone();
        assert_eq!(a.broken_pairs_distance(&b), 0.0);

        // Reversal keeps the same undirected edges
        b.chrom_r = vec![vec![4, 3, 2, 1], vec![]];
        b.evaluate_complete_cost(&params);
        assert_eq!(a.broken_pairs_distance(&b), 0.0);
    }

    #[test]
    fn test_broken_pairs_split_route() {
        let params = fixtures::line_params(4, 100.0, 2);
        let mut a = Individual::new(4, 2);
        a.chrom_r = vec![vec![1, 2, 3, 4], vec![]];
        a.evaluate_complete_cost(&params);

        let mut b = Individual::new(4, 2);
        b.chrom_r = vec![vec![1, 2], vec![3, 4]];
        b.evaluate_complete_cost(&params);

        // Only the 2 -> 3 link is broken
        assert!((a.broken_pairs_distance(&b) - 0.25).abs() < 1e-12);
    }
}

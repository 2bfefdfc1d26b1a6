//! Split algorithm for decoding a flat tour into routes.
//!
//! # Algorithm
//!
//! Given a flat tour (permutation of customers), finds the partition into
//! consecutive sub-routes minimizing the total penalized cost. Capacity and
//! duration violations are priced with the current penalty weights rather
//! than forbidden, so the decoder always succeeds.
//!
//! Models the problem as a shortest-path problem on an auxiliary graph where
//! node i represents the boundary after customer i, and edge (i, j) represents
//! serving customers i+1..=j in one route.
//!
//! When the unconstrained shortest path uses more routes than the fleet
//! allows, a layered variant (layer k = paths with exactly k routes) finds
//! the best partition within the route budget.
//!
//! # Complexity
//!
//! O(n²) for the unlimited split, pruned by the load bound. O(K·n²) for the
//! limited-fleet split with K routes.
//!
//! # Reference
//!
//! Prins, C. (2004). "A simple and effective evolutionary algorithm for the
//! vehicle routing problem", *Computers & Operations Research* 31(12), 1985-2002.
//!
//! Vidal, T. (2022). "Hybrid genetic search for the CVRP: Open-source
//! implementation and SWAP* neighborhood", *Computers & Operations Research* 140.

use crate::models::{Individual, Instance};
use crate::params::Params;

/// Routes with loads above this multiple of the capacity are not considered
/// by the unlimited split.
const MAX_LOAD_RATIO: f64 = 1.5;

/// Result of a split.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Non-empty routes as sequences of customer IDs.
    pub routes: Vec<Vec<usize>>,
    /// Total penalized cost of all routes.
    pub total_cost: f64,
}

/// Flat-tour decoder.
///
/// # Examples
///
/// ```
/// use hgs_rr::ga::Split;
/// use hgs_rr::models::{Customer, Individual, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10.0),
///     Customer::new(2, 2.0, 0.0, 10.0),
///     Customer::new(3, 3.0, 0.0, 10.0),
/// ];
/// let instance = Instance::from_customers(customers, 30.0).with_vehicles(2);
/// let params = Params::new(instance, AlgorithmConfig::default()).unwrap();
///
/// let mut indiv = Individual::new(3, 2);
/// Split::new().general_split(&mut indiv, 1, &params);
/// assert_eq!(indiv.chrom_r, vec![vec![1, 2, 3], vec![]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Split;

impl Split {
    pub fn new() -> Self {
        Self
    }

    /// Decodes `indiv.chrom_t` into `indiv.chrom_r`, aiming at `target_routes`.
    ///
    /// The route budget is `max(target_routes, ceil(total_demand / capacity))`
    /// clamped to `[1, nb_vehicles]`. The route set is padded with empty
    /// routes up to the vehicle count. The evaluation is left stale.
    pub fn general_split(&self, indiv: &mut Individual, target_routes: usize, params: &Params) {
        let instance = &params.instance;
        let nb_vehicles = instance.num_vehicles();
        let min_routes = (instance.total_demand() / instance.capacity()).ceil() as usize;
        let budget = target_routes.max(min_routes).clamp(1, nb_vehicles.max(1));

        let pc = params.penalty_capacity;
        let pd = params.penalty_duration;

        let mut result = split_unlimited(&indiv.chrom_t, instance, pc, pd);
        if result.routes.len() > budget {
            result = split_limited(&indiv.chrom_t, budget, instance, pc, pd);
        }

        let mut routes = result.routes;
        routes.resize(nb_vehicles.max(routes.len()), Vec::new());
        indiv.chrom_r = routes;
    }
}

/// Incremental cost of a route grown one customer at a time.
struct RouteBuilder<'a> {
    instance: &'a Instance,
    last: usize,
    load: f64,
    service: f64,
    distance: f64,
}

impl<'a> RouteBuilder<'a> {
    fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            last: 0,
            load: 0.0,
            service: 0.0,
            distance: 0.0,
        }
    }

    fn push(&mut self, customer: usize) {
        self.distance += self.instance.distance(self.last, customer);
        self.load += self.instance.demand(customer);
        self.service += self.instance.service_duration(customer);
        self.last = customer;
    }

    /// Penalized cost of the route closed back to the depot.
    fn closed_cost(&self, pc: f64, pd: f64) -> f64 {
        let distance = self.distance + self.instance.distance(self.last, 0);
        let cap_excess = (self.load - self.instance.capacity()).max(0.0);
        let dur_excess = match self.instance.duration_limit() {
            Some(limit) => (distance + self.service - limit).max(0.0),
            None => 0.0,
        };
        distance + pc * cap_excess + pd * dur_excess
    }
}

/// Shortest-path split with an unlimited fleet.
pub fn split_unlimited(tour: &[usize], instance: &Instance, pc: f64, pd: f64) -> SplitResult {
    let n = tour.len();
    if n == 0 {
        return SplitResult {
            routes: vec![],
            total_cost: 0.0,
        };
    }

    let max_load = MAX_LOAD_RATIO * instance.capacity();

    // cost[i] = minimum penalized cost to serve tour[0..i]
    let mut cost = vec![f64::INFINITY; n + 1];
    let mut pred = vec![0usize; n + 1];
    cost[0] = 0.0;

    for i in 0..n {
        if cost[i] == f64::INFINITY {
            continue;
        }
        let mut route = RouteBuilder::new(instance);
        for j in i..n {
            route.push(tour[j]);
            if j > i && route.load > max_load {
                break;
            }
            let new_cost = cost[i] + route.closed_cost(pc, pd);
            if new_cost < cost[j + 1] {
                cost[j + 1] = new_cost;
                pred[j + 1] = i;
            }
        }
    }

    let mut routes = Vec::new();
    let mut j = n;
    while j > 0 {
        let i = pred[j];
        routes.push(tour[i..j].to_vec());
        j = i;
    }
    routes.reverse();

    SplitResult {
        routes,
        total_cost: cost[n],
    }
}

/// Layered split using at most `max_routes` routes.
pub fn split_limited(
    tour: &[usize],
    max_routes: usize,
    instance: &Instance,
    pc: f64,
    pd: f64,
) -> SplitResult {
    let n = tour.len();
    if n == 0 || max_routes == 0 {
        return SplitResult {
            routes: vec![],
            total_cost: 0.0,
        };
    }

    // cost[k][j] = minimum cost to serve tour[0..j] with exactly k routes
    let mut cost = vec![vec![f64::INFINITY; n + 1]; max_routes + 1];
    let mut pred = vec![vec![0usize; n + 1]; max_routes + 1];
    cost[0][0] = 0.0;

    for k in 0..max_routes {
        for i in k..n {
            if cost[k][i] == f64::INFINITY {
                continue;
            }
            let mut route = RouteBuilder::new(instance);
            for j in i..n {
                route.push(tour[j]);
                let new_cost = cost[k][i] + route.closed_cost(pc, pd);
                if new_cost < cost[k + 1][j + 1] {
                    cost[k + 1][j + 1] = new_cost;
                    pred[k + 1][j + 1] = i;
                }
            }
        }
    }

    let mut best_k = 1;
    for k in 2..=max_routes {
        if cost[k][n] < cost[best_k][n] {
            best_k = k;
        }
    }

    let mut routes = Vec::with_capacity(best_k);
    let mut j = n;
    for k in (1..=best_k).rev() {
        let i = pred[k][j];
        routes.push(tour[i..j].to_vec());
        j = i;
    }
    routes.reverse();

    SplitResult {
        routes,
        total_cost: cost[best_k][n],
    }
}

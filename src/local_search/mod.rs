//! Granular local search under a penalized objective.
//!
//! Each customer `u` is paired with the customers `v` of its granular
//! neighbourhood and the following moves are tried, first improvement:
//!
//! - `relocate`: `u` after `v`, `u` to the front of `v`'s route, `u` into an empty route
//! - `exchange`: swap `u` and `v` across routes
//! - `two_opt`: intra-route 2-opt, inter-route 2-opt* (tail exchange)
//!
//! Capacity and duration violations are priced with the weights given to
//! [`LocalSearch::run`], so the search moves freely through infeasible
//! space.

mod exchange;
mod relocate;
mod two_opt;

use rand::seq::SliceRandom;

use crate::models::{Individual, Instance, EPSILON};
use crate::params::Params;

/// Reusable local search workspace.
///
/// # Examples
///
/// ```
/// use hgs_rr::local_search::LocalSearch;
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
/// let mut params = Params::new(instance, AlgorithmConfig::default()).unwrap();
///
/// let mut indiv = Individual::new(3, 2);
/// indiv.chrom_r = vec![vec![3, 1], vec![2]];
/// let (pc, pd) = (params.penalty_capacity, params.penalty_duration);
/// LocalSearch::new(&params).run(&mut indiv, pc, pd, &mut params);
/// assert!((indiv.eval.distance - 6.0).abs() < 1e-10);
/// assert_eq!(indiv.eval.nb_routes, 1);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearch {
    routes: Vec<Vec<usize>>,
    /// `(route, position)` of each routed customer.
    location: Vec<Option<(usize, usize)>>,
    loads: Vec<f64>,
    services: Vec<f64>,
    distances: Vec<f64>,
    penalty_capacity: f64,
    penalty_duration: f64,
    order: Vec<usize>,
}

impl LocalSearch {
    pub fn new(params: &Params) -> Self {
        let n = params.nb_clients();
        let v = params.nb_vehicles();
        Self {
            routes: vec![Vec::new(); v],
            location: vec![None; n + 1],
            loads: vec![0.0; v],
            services: vec![0.0; v],
            distances: vec![0.0; v],
            penalty_capacity: 0.0,
            penalty_duration: 0.0,
            order: (1..=n).collect(),
        }
    }

    /// Improves `indiv` in place until no move lowers the penalized cost.
    ///
    /// Moves are priced with `penalty_capacity` and `penalty_duration`; the
    /// final evaluation uses the persistent weights held by `params`.
    pub fn run(
        &mut self,
        indiv: &mut Individual,
        penalty_capacity: f64,
        penalty_duration: f64,
        params: &mut Params,
    ) {
        self.penalty_capacity = penalty_capacity;
        self.penalty_duration = penalty_duration;
        self.load_individual(indiv, &params.instance);
        self.order.shuffle(&mut params.rng);

        let instance = &params.instance;
        let mut improved = true;
        while improved {
            improved = false;
            for i in 0..self.order.len() {
                let u = self.order[i];
                if self.location[u].is_none() {
                    continue;
                }
                if self.improve_customer(u, &params.correlated[u], instance) {
                    improved = true;
                }
            }
        }

        indiv.chrom_r = self.routes.clone();
        indiv.rebuild_tour();
        indiv.evaluate_complete_cost(params);
    }

    /// Tries every move for `u`; applies the first improving one.
    fn improve_customer(&mut self, u: usize, neighbors: &[usize], instance: &Instance) -> bool {
        for &v in neighbors {
            if v == u || self.location[v].is_none() {
                continue;
            }
            if self.relocate_after(u, v, instance)
                || self.relocate_to_front(u, v, instance)
                || self.swap(u, v, instance)
                || self.two_opt(u, v, instance)
                || self.two_opt_star(u, v, instance)
            {
                return true;
            }
        }
        self.relocate_to_empty(u, instance)
    }

    fn load_individual(&mut self, indiv: &Individual, instance: &Instance) {
        let n = instance.num_clients();
        let nb_routes = instance.num_vehicles().max(indiv.chrom_r.len());

        self.routes.clear();
        self.routes.extend(indiv.chrom_r.iter().cloned());
        self.routes.resize(nb_routes, Vec::new());
        self.loads.resize(nb_routes, 0.0);
        self.services.resize(nb_routes, 0.0);
        self.distances.resize(nb_routes, 0.0);
        self.location.clear();
        self.location.resize(n + 1, None);
        if self.order.len() != n {
            self.order = (1..=n).collect();
        }

        for r in 0..nb_routes {
            self.refresh_route(r, instance);
        }
    }

    /// Recomputes positions and metrics of route `r` from its sequence.
    fn refresh_route(&mut self, r: usize, instance: &Instance) {
        let route = &self.routes[r];
        let mut prev = 0;
        let mut distance = 0.0;
        let mut load = 0.0;
        let mut service = 0.0;
        for (pos, &c) in route.iter().enumerate() {
            self.location[c] = Some((r, pos));
            distance += instance.distance(prev, c);
            load += instance.demand(c);
            service += instance.service_duration(c);
            prev = c;
        }
        if !route.is_empty() {
            distance += instance.distance(prev, 0);
        }
        self.distances[r] = distance;
        self.loads[r] = load;
        self.services[r] = service;
    }

    /// Penalized cost of a route with the given metrics.
    fn route_cost(&self, distance: f64, load: f64, service: f64, instance: &Instance) -> f64 {
        let cap_excess = (load - instance.capacity()).max(0.0);
        let dur_excess = match instance.duration_limit() {
            Some(limit) => (distance + service - limit).max(0.0),
            None => 0.0,
        };
        distance + self.penalty_capacity * cap_excess + self.penalty_duration * dur_excess
    }

    /// Penalized cost of route `r` as it stands.
    fn current_cost(&self, r: usize, instance: &Instance) -> f64 {
        self.route_cost(self.distances[r], self.loads[r], self.services[r], instance)
    }

    /// Route and position of a routed customer.
    fn loc(&self, c: usize) -> (usize, usize) {
        self.location[c].unwrap_or((0, 0))
    }

    /// Predecessor of `c` in its route, 0 for the depot.
    fn pred(&self, c: usize) -> usize {
        let (r, pos) = self.loc(c);
        if pos == 0 {
            0
        } else {
            self.routes[r][pos - 1]
        }
    }

    /// Successor of `c` in its route, 0 for the depot.
    fn succ(&self, c: usize) -> usize {
        let (r, pos) = self.loc(c);
        self.routes[r].get(pos + 1).copied().unwrap_or(0)
    }
}

/// Whether a cost change is worth applying.
fn improves(delta: f64) -> bool {
    delta < -EPSILON
}


#[cfg(test)]
impl LocalSearch {
    /// Workspace loaded with explicit routes and move weights.
    fn for_routes(params: &Params, routes: Vec<Vec<usize>>, pc: f64, pd: f64) -> Self {
        let mut ls = Self::new(params);
        let mut indiv = Individual::new(params.nb_clients(), params.nb_vehicles());
        indiv.chrom_r = routes;
        ls.penalty_capacity = pc;
        ls.penalty_duration = pd;
        ls.load_individual(&indiv, &params.instance);
        ls
    }

    /// Sum of route penalized costs.
    fn total_cost(&self, instance: &Instance) -> f64 {
        (0..self.routes.len())
            .map(|r| self.current_cost(r, instance))
            .sum()
    }
}

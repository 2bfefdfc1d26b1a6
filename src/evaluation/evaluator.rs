//! Complete cost recomputation for individuals and routes.

use crate::models::{EvalIndiv, Individual, Instance, EPSILON};
use crate::params::Params;

/// Distance, load and service time of a single route.
///
/// # Examples
///
/// ```
/// use hgs_rr::models::{Customer, Instance};
/// use hgs_rr::evaluation::RouteMetrics;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0).with_service_duration(5.0),
///     Customer::new(2, 6.0, 8.0, 20.0).with_service_duration(5.0),
/// ];
/// let instance = Instance::from_customers(customers, 100.0);
///
/// let m = RouteMetrics::compute(&[1, 2], &instance);
/// assert!((m.distance - 20.0).abs() < 1e-10);
/// assert_eq!(m.load, 30.0);
/// assert_eq!(m.service, 10.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteMetrics {
    /// Depot-to-depot travel distance.
    pub distance: f64,
    /// Sum of customer demands.
    pub load: f64,
    /// Sum of customer service durations.
    pub service: f64,
}

impl RouteMetrics {
    /// Measures a route given as a customer sequence (depot excluded).
    pub fn compute(route: &[usize], instance: &Instance) -> Self {
        let mut metrics = Self::default();
        let mut prev = 0;
        for &c in route {
            metrics.distance += instance.distance(prev, c);
            metrics.load += instance.demand(c);
            metrics.service += instance.service_duration(c);
            prev = c;
        }
        if !route.is_empty() {
            metrics.distance += instance.distance(prev, 0);
        }
        metrics
    }

    /// Load above vehicle capacity.
    pub fn capacity_excess(&self, instance: &Instance) -> f64 {
        (self.load - instance.capacity()).max(0.0)
    }

    /// Duration (travel plus service) above the duration limit.
    pub fn duration_excess(&self, instance: &Instance) -> f64 {
        match instance.duration_limit() {
            Some(limit) => (self.distance + self.service - limit).max(0.0),
            None => 0.0,
        }
    }

    /// Distance plus weighted constraint excess.
    pub fn penalized_cost(
        &self,
        instance: &Instance,
        penalty_capacity: f64,
        penalty_duration: f64,
    ) -> f64 {
        self.distance
            + penalty_capacity * self.capacity_excess(instance)
            + penalty_duration * self.duration_excess(instance)
    }
}

/// Recomputes an individual's evaluation from its route set.
///
/// Also rebuilds the successor and predecessor arrays used by the
/// broken-pairs distance. Penalty weights are read from `params`.
pub fn evaluate_complete_cost(individual: &mut Individual, params: &Params) {
    let instance = &params.instance;
    let n = instance.num_clients();
    let mut eval = EvalIndiv {
        penalized_cost: 0.0,
        ..EvalIndiv::default()
    };

    individual.successors.clear();
    individual.successors.resize(n + 1, 0);
    individual.predecessors.clear();
    individual.predecessors.resize(n + 1, 0);

    for route in individual.chrom_r.iter().filter(|r| !r.is_empty()) {
        let metrics = RouteMetrics::compute(route, instance);
        eval.nb_routes += 1;
        eval.distance += metrics.distance;
        eval.capacity_excess += metrics.capacity_excess(instance);
        eval.duration_excess += metrics.duration_excess(instance);

        let mut prev = 0;
        for &c in route {
            individual.predecessors[c] = prev;
            if prev != 0 {
                individual.successors[prev] = c;
            }
            prev = c;
        }
        individual.successors[prev] = 0;
    }

    eval.penalized_cost = eval.distance
        + eval.capacity_excess * params.penalty_capacity
        + eval.duration_excess * params.penalty_duration;
    eval.is_feasible = eval.capacity_excess < EPSILON && eval.duration_excess < EPSILON;
    individual.eval = eval;
}

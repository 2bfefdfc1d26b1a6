//! 2-opt (intra-route) and 2-opt* (inter-route) moves.
//!
//! # Algorithm
//!
//! With `x = succ(u)` and `y = succ(v)`:
//!
//! - 2-opt, `u` before `v` in the same route: replace `(u, x), (v, y)` by
//!   `(u, v), (x, y)` and reverse the segment `x..=v`. The segment's inner
//!   edges are re-costed in reverse so asymmetric matrices are priced exactly.
//! - 2-opt*, different routes: exchange the tails after `u` and after `v`,
//!   giving `(u, y)` and `(v, x)`.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use crate::models::Instance;

use super::{improves, LocalSearch};

impl LocalSearch {
    /// Reverses the path between `u` and `v` within one route.
    pub(super) fn two_opt(&mut self, u: usize, v: usize, instance: &Instance) -> bool {
        let (ru, pu) = self.loc(u);
        let (rv, pv) = self.loc(v);
        if ru != rv || pu + 1 >= pv {
            return false;
        }

        let route = &self.routes[ru];
        let x = route[pu + 1];
        let y = self.succ(v);
        let d = |i: usize, j: usize| instance.distance(i, j);

        let segment = &route[pu + 1..=pv];
        let (forward, backward) = segment.windows(2).fold((0.0, 0.0), |(f, b), w| {
            (f + d(w[0], w[1]), b + d(w[1], w[0]))
        });
        let distance = self.distances[ru] - d(u, x) - d(v, y) - forward
            + d(u, v)
            + d(x, y)
            + backward;
        let delta = self.route_cost(distance, self.loads[ru], self.services[ru], instance)
            - self.current_cost(ru, instance);

        if !improves(delta) {
            return false;
        }

        self.routes[ru][pu + 1..=pv].reverse();
        self.refresh_route(ru, instance);
        true
    }

    /// Exchanges the tails following `u` and `v` across two routes.
    pub(super) fn two_opt_star(&mut self, u: usize, v: usize, instance: &Instance) -> bool {
        let (ru, pu) = self.loc(u);
        let (rv, pv) = self.loc(v);
        if ru == rv {
            return false;
        }
        let x = self.succ(u);
        let y = self.succ(v);
        if x == 0 && y == 0 {
            return false;
        }
        let d = |i: usize, j: usize| instance.distance(i, j);

        let (dist_u, load_u, serv_u) = self.prefix(ru, pu, instance);
        let (dist_v, load_v, serv_v) = self.prefix(rv, pv, instance);
        let tail_dist_u = self.distances[ru] - dist_u - d(u, x);
        let tail_dist_v = self.distances[rv] - dist_v - d(v, y);

        let new_u = self.route_cost(
            dist_u + d(u, y) + tail_dist_v,
            load_u + self.loads[rv] - load_v,
            serv_u + self.services[rv] - serv_v,
            instance,
        );
        let new_v = self.route_cost(
            dist_v + d(v, x) + tail_dist_u,
            load_v + self.loads[ru] - load_u,
            serv_v + self.services[ru] - serv_u,
            instance,
        );
        let delta =
            new_u + new_v - self.current_cost(ru, instance) - self.current_cost(rv, instance);

        if !improves(delta) {
            return false;
        }

        let tail_u = self.routes[ru].split_off(pu + 1);
        let tail_v = self.routes[rv].split_off(pv + 1);
        self.routes[ru].extend(tail_v);
        self.routes[rv].extend(tail_u);
        self.refresh_route(ru, instance);
        self.refresh_route(rv, instance);
        true
    }

    /// Distance from the depot to position `pos` of route `r`, with the load
    /// and service accumulated along the way.
    fn prefix(&self, r: usize, pos: usize, instance: &Instance) -> (f64, f64, f64) {
        let mut prev = 0;
        let mut distance = 0.0;
        let mut load = 0.0;
        let mut service = 0.0;
        for &c in &self.routes[r][..=pos] {
            distance += instance.distance(prev, c);
            load += instance.demand(c);
            service += instance.service_duration(c);
            prev = c;
        }
        (distance, load, service)
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::DistanceMatrix;
    use crate::fixtures;
    use crate::local_search::LocalSearch;
    use crate::models::{Customer, Instance};
    use crate::params::{AlgorithmConfig, Params};

    #[test]
    fn test_two_opt_reverses_crossing() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 1.0, 10.0),
            Customer::new(2, 2.0, 1.0, 10.0),
            Customer::new(3, 2.0, -1.0, 10.0),
            Customer::new(4, 1.0, -1.0, 10.0),
        ];
        let instance = Instance::from_customers(customers, 100.0).with_vehicles(1);
        let params = Params::new(instance, AlgorithmConfig::default()).unwrap();
        let inst = &params.instance;
        // 0 -> 1 -> 3 -> 2 -> 4 -> 0 crosses itself
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 3, 2, 4]], 1.0, 1.0);
        let before = ls.total_cost(inst);

        assert!(ls.two_opt(1, 2, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3, 4]]);
        assert!(ls.total_cost(inst) < before);
        assert!(!ls.two_opt(1, 3, inst));
    }

    #[test]
    fn test_two_opt_asymmetric_segment() {
        let customers = fixtures::line_customers(3);
        // Going "backwards" (to a lower id) costs 10 per step
        let mut dm = DistanceMatrix::new(4);
        for i in 0..4 {
            for j in 0..4 {
                let cost = if j >= i { (j - i) as f64 } else { 10.0 * (i - j) as f64 };
                dm.set(i, j, cost);
            }
        }
        let instance = Instance::new(customers, dm, 100.0).with_vehicles(1);
        let params = Params::new(instance, AlgorithmConfig::default()).unwrap();
        let inst = &params.instance;

        // 0 -> 1 -> 2 -> 3 -> 0: 1 + 1 + 1 + 30 = 33
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 2, 3]], 1.0, 1.0);
        // 0 -> 1 -> 3 -> 2 -> 0: 1 + 2 + 10 + 20 = 33, no gain once the
        // reversed inner edge 3 -> 2 is priced
        assert!(!ls.two_opt(1, 3, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_two_opt_star_exchanges_tails() {
        let params = fixtures::line_params(4, 100.0, 2);
        let inst = &params.instance;
        // [1, 4] + [2, 3]: 8 + 6 = 14
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 4], vec![2, 3]], 1.0, 1.0);
        assert!((ls.total_cost(inst) - 14.0).abs() < 1e-10);

        // Tails after 1 ([4]) and after 3 ([]) swap: [1] + [2, 3, 4] = 2 + 8
        assert!(ls.two_opt_star(1, 3, inst));
        assert_eq!(ls.routes, vec![vec![1], vec![2, 3, 4]]);
        assert!((ls.total_cost(inst) - 10.0).abs() < 1e-10);
        assert_eq!(ls.loads, vec![10.0, 30.0]);
    }

    #[test]
    fn test_two_opt_star_respects_penalty() {
        let params = fixtures::line_params(4, 20.0, 2);
        let inst = &params.instance;
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 4], vec![2, 3]], 100.0, 1.0);
        // Same move would overload the second route by 10
        assert!(!ls.two_opt_star(1, 3, inst));
        assert!(!ls.two_opt_star(4, 3, inst));
    }
}

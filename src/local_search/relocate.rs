//! Customer relocation moves.
//!
//! # Algorithm
//!
//! Removes customer `u` from its route and reinserts it between two
//! consecutive locations `a -> b` of a target route (possibly the same
//! route, possibly empty). The distance change is
//!
//! ```text
//! d(x, y) - d(x, u) - d(u, y) + d(a, u) + d(u, b) - d(a, b)
//! ```
//!
//! where `x -> u -> y` are `u`'s current neighbours.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::models::Instance;

use super::{improves, LocalSearch};

impl LocalSearch {
    /// Moves `u` directly after `v`.
    pub(super) fn relocate_after(&mut self, u: usize, v: usize, instance: &Instance) -> bool {
        if self.succ(v) == u {
            return false;
        }
        let (rv, _) = self.loc(v);
        let b = self.succ(v);
        self.relocate_between(u, v, b, rv, instance)
    }

    /// Moves `u` to the front of `v`'s route when `v` leads it.
    pub(super) fn relocate_to_front(&mut self, u: usize, v: usize, instance: &Instance) -> bool {
        let (rv, pv) = self.loc(v);
        if pv != 0 {
            return false;
        }
        self.relocate_between(u, 0, v, rv, instance)
    }

    /// Moves `u` alone into the first empty route.
    pub(super) fn relocate_to_empty(&mut self, u: usize, instance: &Instance) -> bool {
        let (ru, _) = self.loc(u);
        if self.routes[ru].len() == 1 {
            return false;
        }
        let Some(empty) = self.routes.iter().position(Vec::is_empty) else {
            return false;
        };
        self.relocate_between(u, 0, 0, empty, instance)
    }

    /// Inserts `u` between `a` and `b` of route `rv`, 0 standing for the depot.
    fn relocate_between(
        &mut self,
        u: usize,
        a: usize,
        b: usize,
        rv: usize,
        instance: &Instance,
    ) -> bool {
        let (ru, pu) = self.loc(u);
        let x = self.pred(u);
        let y = self.succ(u);
        let d = |i: usize, j: usize| instance.distance(i, j);

        let removal = d(x, y) - d(x, u) - d(u, y);
        let insertion = d(a, u) + d(u, b) - d(a, b);

        let delta = if ru == rv {
            let distance = self.distances[ru] + removal + insertion;
            self.route_cost(distance, self.loads[ru], self.services[ru], instance)
                - self.current_cost(ru, instance)
        } else {
            let q = instance.demand(u);
            let s = instance.service_duration(u);
            let new_u = self.route_cost(
                self.distances[ru] + removal,
                self.loads[ru] - q,
                self.services[ru] - s,
                instance,
            );
            let new_v = self.route_cost(
                self.distances[rv] + insertion,
                self.loads[rv] + q,
                self.services[rv] + s,
                instance,
            );
            new_u + new_v - self.current_cost(ru, instance) - self.current_cost(rv, instance)
        };

        if !improves(delta) {
            return false;
        }

        self.routes[ru].remove(pu);
        let at = if a == 0 {
            0
        } else {
            self.routes[rv]
                .iter()
                .position(|&c| c == a)
                .map_or(0, |p| p + 1)
        };
        self.routes[rv].insert(at, u);

        self.refresh_route(ru, instance);
        if rv != ru {
            self.refresh_route(rv, instance);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_relocate_between_routes() {
        let params = fixtures::line_params(4, 100.0, 2);
        let inst = &params.instance;
        // [1, 2, 4] + [3]: 8 + 6 = 14
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 2, 4], vec![3]], 1.0, 1.0);
        assert!((ls.total_cost(inst) - 14.0).abs() < 1e-10);

        assert!(ls.relocate_after(3, 2, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3, 4], vec![]]);
        assert!((ls.total_cost(inst) - 8.0).abs() < 1e-10);
        assert_eq!(ls.loc(4), (0, 3));
    }

    #[test]
    fn test_relocate_within_route() {
        let params = fixtures::line_params(3, 100.0, 1);
        let inst = &params.instance;
        // [2, 1, 3]: 2 + 1 + 2 + 3 = 8
        let mut ls = LocalSearch::for_routes(&params, vec![vec![2, 1, 3]], 1.0, 1.0);
        assert!(ls.relocate_after(2, 1, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3]]);
        assert!((ls.total_cost(inst) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_relocate_to_front() {
        let params = fixtures::line_params(3, 100.0, 2);
        let inst = &params.instance;
        // [2, 3] + [1]: 6 + 2 = 8
        let mut ls = LocalSearch::for_routes(&params, vec![vec![2, 3], vec![1]], 1.0, 1.0);
        assert!(!ls.relocate_to_front(1, 3, inst));
        assert!(ls.relocate_to_front(1, 2, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn test_relocate_rejects_non_improving() {
        let params = fixtures::line_params(3, 100.0, 2);
        let inst = &params.instance;
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 2, 3], vec![]], 1.0, 1.0);
        assert!(!ls.relocate_after(1, 3, inst));
        assert!(!ls.relocate_after(2, 1, inst));
        assert!(!ls.relocate_to_empty(3, inst));
        assert_eq!(ls.routes, vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn test_relocate_to_empty_under_penalty() {
        let params = fixtures::line_params(3, 20.0, 2);
        let inst = &params.instance;
        // Load 30 on capacity 20: excess 10 at weight 10 costs 100
        let mut ls = LocalSearch::for_routes(&params, vec![vec![1, 2, 3], vec![]], 10.0, 1.0);
        assert!(ls.relocate_to_empty(3, inst));
        assert_eq!(ls.routes, vec![vec![1, 2], vec![3]]);
        assert_eq!(ls.loads, vec![20.0, 10.0]);
    }
}

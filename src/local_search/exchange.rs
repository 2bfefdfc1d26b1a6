//! Inter-route customer swap.
//!
//! # Algorithm
//!
//! Customers `u` and `v` of two different routes trade places:
//!
//! ```text
//! x -> u -> y   becomes   x -> v -> y
//! a -> v -> b   becomes   a -> u -> b
//! ```
//!
//! Both routes change load by the demand difference, so the move can
//! repair capacity excess that no single relocation fixes.

use crate::models::Instance;

use super::{improves, LocalSearch};

impl LocalSearch {
    /// Swaps `u` and `v` when they sit in different routes.
    pub(super) fn swap(&mut self, u: usize, v: usize, instance: &Instance) -> bool {
        let (ru, pu) = self.loc(u);
        let (rv, pv) = self.loc(v);
        if ru == rv {
            return false;
        }

        let (x, y) = (self.pred(u), self.succ(u));
        let (a, b) = (self.pred(v), self.succ(v));
        let d = |i: usize, j: usize| instance.distance(i, j);

        let dq = instance.demand(v) - instance.demand(u);
        let ds = instance.service_duration(v) - instance.service_duration(u);

        let new_u = self.route_cost(
            self.distances[ru] - d(x, u) - d(u, y) + d(x, v) + d(v, y),
            self.loads[ru] + dq,
            self.services[ru] + ds,
            instance,
        );
        let new_v = self.route_cost(
            self.distances[rv] - d(a, v) - d(v, b) + d(a, u) + d(u, b),
            self.loads[rv] - dq,
            self.services[rv] - ds,
            instance,
        );
        let delta =
            new_u + new_v - self.current_cost(ru, instance) - self.current_cost(rv, instance);

        if !improves(delta) {
            return false;
        }

        self.routes[ru][pu] = v;
        self.routes[rv][pv] = u;
        self.refresh_route(ru, instance);
        self.refresh_route(rv, instance);
        true
    }
}

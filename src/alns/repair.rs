//! Recreate operator: greedy insertion with blinks.
//!
//! Removed customers are reinserted one at a time, in one of four randomly
//! chosen orders, at a capacity-feasible position sampled from a geometric
//! distribution over the ranked insertion costs. With blink probability
//! `p` the cheapest position is taken with probability `1 - p`, the second
//! cheapest with `(1 - p) p`, and so on.
//!
//! # Reference
//!
//! Christiaens, J. & Vanden Berghe, G. (2020). "Slack Induction by String
//! Removals for Vehicle Routing Problems", *Transportation Science* 54(2),
//! 417-433.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::models::{Individual, Instance};
use crate::params::Params;

/// A candidate position for one customer.
#[derive(Debug, Clone, Copy)]
struct InsertionPoint {
    route: usize,
    pos: usize,
    cost: f64,
}

/// Detour cost of inserting `customer` before index `pos` of `route`.
fn insertion_cost(instance: &Instance, route: &[usize], pos: usize, customer: usize) -> f64 {
    let prev = if pos == 0 { 0 } else { route[pos - 1] };
    let next = if pos == route.len() { 0 } else { route[pos] };
    instance.distance(prev, customer) + instance.distance(customer, next)
        - instance.distance(prev, next)
}

/// Orders the customers to reinsert using one of four rules drawn uniformly:
/// random, decreasing demand, increasing then decreasing depot distance.
fn sort_removed<R: Rng>(removed: &mut [usize], instance: &Instance, rng: &mut R) {
    match rng.random_range(0..4) {
        0 => removed.shuffle(rng),
        1 => removed.sort_by(|&a, &b| instance.demand(b).total_cmp(&instance.demand(a))),
        2 => removed.sort_by(|&a, &b| {
            instance
                .distance(0, a)
                .total_cmp(&instance.distance(0, b))
        }),
        _ => removed.sort_by(|&a, &b| {
            instance
                .distance(0, b)
                .total_cmp(&instance.distance(0, a))
        }),
    }
}

/// Samples a rank: rank `r` (0-based) has weight `(1 - p) p^r`.
fn sample_blink_rank<R: Rng>(count: usize, blink_probability: f64, rng: &mut R) -> usize {
    let weights: Vec<f64> = (0..count)
        .map(|r| (1.0 - blink_probability) * blink_probability.powi(r as i32))
        .collect();
    let total: f64 = weights.iter().sum();
    let draw = rng.random_range(0.0..total);

    let mut cumulative = 0.0;
    for (rank, w) in weights.iter().enumerate() {
        cumulative += w;
        if draw <= cumulative {
            return rank;
        }
    }
    0
}

/// Reinserts `removed` customers into `solution`.
///
/// Customers are first taken out of whichever route holds them. Each one
/// then goes to a capacity-feasible position; when none exists it opens the
/// first empty route that can hold it, and is otherwise left unrouted.
/// The flat tour is rebuilt and the cost recomputed at the end.
///
/// # Examples
///
/// ```
/// use hgs_rr::alns::greedy_insertion_with_blinks;
/// use hgs_rr::models::{Customer, Individual, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 0.0, 10.0, 10.0),
///     Customer::new(2, 1.0, 10.0, 10.0),
///     Customer::new(3, 2.0, 10.0, 10.0),
/// ];
/// let instance = Instance::from_customers(customers, 100.0).with_vehicles(2);
/// let config = AlgorithmConfig::default().with_blink_probability(0.0);
/// let mut params = Params::new(instance, config).unwrap();
///
/// let mut indiv = Individual::new(3, 2);
/// indiv.chrom_r = vec![vec![1, 2, 3], vec![]];
/// greedy_insertion_with_blinks(&mut indiv, &[2], &mut params);
/// assert_eq!(indiv.chrom_r, vec![vec![1, 2, 3], vec![]]);
/// assert_eq!(indiv.chrom_t, vec![1, 2, 3]);
/// ```
pub fn greedy_insertion_with_blinks(
    solution: &mut Individual,
    removed: &[usize],
    params: &mut Params,
) {
    {
        let Params {
            instance,
            config,
            rng,
            ..
        } = &mut *params;
        let capacity = instance.capacity();

        for &customer in removed {
            for route in solution.chrom_r.iter_mut() {
                if let Some(idx) = route.iter().position(|&c| c == customer) {
                    route.remove(idx);
                    break;
                }
            }
        }

        let mut order = removed.to_vec();
        sort_removed(&mut order, instance, rng);

        let mut route_loads: Vec<f64> = solution
            .chrom_r
            .iter()
            .map(|route| route.iter().map(|&c| instance.demand(c)).sum())
            .collect();

        let mut candidates: Vec<InsertionPoint> = Vec::new();
        for customer in order {
            let demand = instance.demand(customer);
            candidates.clear();

            for (r, route) in solution.chrom_r.iter().enumerate() {
                if route_loads[r] + demand > capacity {
                    continue;
                }
                for pos in 0..=route.len() {
                    candidates.push(InsertionPoint {
                        route: r,
                        pos,
                        cost: insertion_cost(instance, route, pos, customer),
                    });
                }
            }

            if candidates.is_empty() {
                let empty_route = solution
                    .chrom_r
                    .iter()
                    .position(|route| route.is_empty() && demand <= capacity);
                match empty_route {
                    Some(r) => {
                        solution.chrom_r[r].push(customer);
                        route_loads[r] += demand;
                    }
                    None => trace!(customer, demand, "no insertion point, customer left unrouted"),
                }
                continue;
            }

            candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
            let rank = sample_blink_rank(candidates.len(), config.blink_probability, rng);
            let chosen = candidates[rank];
            solution.chrom_r[chosen.route].insert(chosen.pos, customer);
            route_loads[chosen.route] += demand;
        }
    }

    solution.rebuild_tour();
    solution.evaluate_complete_cost(params);
}

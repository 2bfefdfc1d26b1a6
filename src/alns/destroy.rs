//! Ruin operator: adjacent string removal.
//!
//! Removes groups ("strings") of customers clustered around random seeds.
//! Every member of a string is the pool customer closest to the string's
//! seed, so strings grow as compact blobs rather than chains.
//!
//! # Reference
//!
//! Christiaens, J. & Vanden Berghe, G. (2020). "Slack Induction by String
//! Removals for Vehicle Routing Problems", *Transportation Science* 54(2),
//! 417-433.

use rand::Rng;

use crate::params::Params;

/// Number of customers a single ruin aims to remove.
pub fn removal_target(params: &Params) -> usize {
    (params.config.avg_customers_to_remove * params.nb_clients() as f64).round() as usize
}

/// Selects customers to remove, as consecutive strings.
///
/// Returns `round(avg_customers_to_remove * nb_clients)` distinct customer
/// ids (or fewer if the pool runs out). Only the random stream is consumed;
/// no solution is modified.
///
/// # Examples
///
/// ```
/// use hgs_rr::alns::adjacent_string_removal;
/// use hgs_rr::models::{Customer, Instance};
/// use hgs_rr::params::{AlgorithmConfig, Params};
///
/// let customers: Vec<Customer> = std::iter::once(Customer::depot(0.0, 0.0))
///     .chain((1..=10).map(|i| Customer::new(i, i as f64, 0.0, 1.0)))
///     .collect();
/// let instance = Instance::from_customers(customers, 100.0);
/// let config = AlgorithmConfig::default()
///     .with_seed(3)
///     .with_avg_customers_to_remove(0.3);
/// let mut params = Params::new(instance, config).unwrap();
///
/// let removed = adjacent_string_removal(&mut params);
/// assert_eq!(removed.len(), 3);
/// ```
pub fn adjacent_string_removal(params: &mut Params) -> Vec<usize> {
    let target = removal_target(params);
    let Params {
        instance,
        config,
        rng,
        ..
    } = params;

    let mut removed = Vec::with_capacity(target);
    let mut pool: Vec<usize> = (1..=instance.num_clients()).collect();

    while removed.len() < target && !pool.is_empty() {
        let seed = pool.remove(rng.random_range(0..pool.len()));
        let string_length = config.max_string_length.min(target - removed.len());
        removed.push(seed);

        for _ in 1..string_length {
            let Some((closest_idx, _)) = pool
                .iter()
                .enumerate()
                .map(|(idx, &c)| (idx, instance.distance(seed, c)))
                .fold(None, |best: Option<(usize, f64)>, (idx, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((idx, d)),
                })
            else {
                break;
            };
            removed.push(pool.remove(closest_idx));
        }
    }

    removed
}

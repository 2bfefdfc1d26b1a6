//! Order crossover (OX) on flat tours.
//!
//! # Algorithm (Davis, 1985)
//!
//! 1. Draw two distinct cut positions `start != end`
//! 2. Copy the circular segment `start..=end` of parent 1 to the same positions
//! 3. Scan parent 2 circularly from `end + 1` and fill the remaining
//!    positions, in order, with the customers not yet placed
//!
//! The offspring is then decoded into routes, aiming at parent 1's route
//! count.

use rand::Rng;

use crate::models::Individual;
use crate::params::Params;

use super::Split;

/// Builds an OX child from explicit cut positions.
///
/// Both parents must be permutations of the same customer set, with
/// `start` and `end` in `0..n`. The segment wraps when `end < start`.
///
/// # Examples
///
/// ```
/// use hgs_rr::ga::ox_fill;
///
/// let p1 = [1, 2, 3, 4, 5];
/// let p2 = [5, 4, 3, 2, 1];
/// // Segment positions 1..=2 from p1, the rest from p2 starting after position 2
/// assert_eq!(ox_fill(&p1, &p2, 1, 2), vec![4, 2, 3, 1, 5]);
/// // Full wrap copies parent 1
/// assert_eq!(ox_fill(&p1, &p2, 0, 4), p1.to_vec());
/// ```
pub fn ox_fill(parent1: &[usize], parent2: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = parent1.len();
    let max_id = parent1.iter().copied().max().unwrap_or(0);
    let mut child = vec![0; n];
    let mut placed = vec![false; max_id + 1];

    let segment_len = (end + n - start) % n + 1;
    let mut j = start;
    for _ in 0..segment_len {
        let c = parent1[j % n];
        child[j % n] = c;
        placed[c] = true;
        j += 1;
    }

    for i in 1..=n {
        let c = parent2[(end + i) % n];
        if !placed[c] {
            child[j % n] = c;
            j += 1;
        }
    }

    child
}

/// Order crossover of two parent tours into `result`.
///
/// Cut points are drawn from the shared random stream. `result`'s
/// evaluation is left stale: only its flat tour and routes are written.
///
/// Requires at least 2 customers, otherwise two distinct cut points
/// cannot be drawn.
pub fn crossover_ox(
    result: &mut Individual,
    parent1: &Individual,
    parent2: &Individual,
    params: &mut Params,
    split: &Split,
) {
    let n = params.nb_clients();
    debug_assert!(n >= 2, "order crossover needs at least 2 customers");

    let start = params.rng.random_range(0..n);
    let mut end = params.rng.random_range(0..n);
    while end == start {
        end = params.rng.random_range(0..n);
    }

    result.chrom_t = ox_fill(&parent1.chrom_t, &parent2.chrom_t, start, end);
    split.general_split(result, parent1.eval.nb_routes, params);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn is_permutation(tour: &[usize], n: usize) -> bool {
        let mut sorted = tour.to_vec();
        sorted.sort_unstable();
        sorted == (1..=n).collect::<Vec<_>>()
    }

    #[test]
    fn test_ox_keeps_segment() {
        let p1 = [1, 2, 3, 4, 5, 6, 7];
        let p2 = [7, 6, 5, 4, 3, 2, 1];
        let child = ox_fill(&p1, &p2, 2, 4);
        assert_eq!(&child[2..=4], &[3, 4, 5]);
        // Fill starts at position 5 with p2 order from position 5: 2, 1, 7, 6
        assert_eq!(child, vec![7, 6, 3, 4, 5, 2, 1]);
    }

    #[test]
    fn test_ox_wrapping_segment() {
        let p1 = [1, 2, 3, 4, 5];
        let p2 = [3, 5, 1, 4, 2];
        // Segment wraps: positions 3, 4, 0
        let child = ox_fill(&p1, &p2, 3, 0);
        assert_eq!(child[3], 4);
        assert_eq!(child[4], 5);
        assert_eq!(child[0], 1);
        // Remaining positions 1, 2 filled from p2 scanning from position 1: 5, 1, 4, 2, 3
        assert_eq!(child, vec![1, 2, 3, 4, 5]);
        assert!(is_permutation(&child, 5));
    }

    #[test]
    fn test_ox_full_wrap_copies_parent1() {
        let p1 = [4, 1, 3, 2, 5];
        let p2 = [1, 2, 3, 4, 5];
        assert_eq!(ox_fill(&p1, &p2, 0, 4), p1.to_vec());
    }

    #[test]
    fn test_crossover_five_customers() {
        let mut params = fixtures::line_params(5, 100.0, 2);
        let split = Split::new();

        let mut p1 = Individual::random(5, 2, &mut params.rng);
        split.general_split(&mut p1, 1, &params);
        p1.evaluate_complete_cost(&params);
        let mut p2 = Individual::random(5, 2, &mut params.rng);
        split.general_split(&mut p2, 1, &params);
        p2.evaluate_complete_cost(&params);

        let mut child = Individual::new(5, 2);
        crossover_ox(&mut child, &p1, &p2, &mut params, &split);
        assert!(is_permutation(&child.chrom_t, 5));
        assert_eq!(child.chrom_r.len(), 2);
        assert_eq!(child.num_routed(), 5);
        // Not evaluated yet
        assert_eq!(child.eval.penalized_cost, 1.0e30);
    }

    #[test]
    fn test_crossover_restores_short_result() {
        let mut params = fixtures::line_params(6, 100.0, 2);
        let split = Split::new();
        let p1 = Individual::new(6, 2);
        let p2 = Individual::random(6, 2, &mut params.rng);

        let mut child = Individual::new(6, 2);
        child.chrom_t = vec![1, 2];
        crossover_ox(&mut child, &p1, &p2, &mut params, &split);
        assert!(is_permutation(&child.chrom_t, 6));
    }

    proptest! {
        #[test]
        fn prop_ox_is_permutation(
            n in 2usize..60,
            seed in any::<u64>(),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut p1: Vec<usize> = (1..=n).collect();
            let mut p2 = p1.clone();
            p1.shuffle(&mut rng);
            p2.shuffle(&mut rng);

            let start = a.index(n);
            let end = b.index(n);
            prop_assume!(start != end);

            let child = ox_fill(&p1, &p2, start, end);
            prop_assert!(is_permutation(&child, n));
        }
    }
}

//! Hybrid genetic search.
//!
//! - [`Split`]: decodes a flat tour into routes (Prins split, limited fleet)
//! - [`crossover_ox`]: order crossover on flat tours
//! - [`Population`]: feasible/infeasible archive with biased fitness
//! - [`Genetic`]: the generational driver

mod crossover;
mod genetic;
mod population;
pub mod split;

pub use crossover::{crossover_ox, ox_fill};
pub use genetic::{Genetic, GeneticStats};
pub use population::Population;
pub use split::{Split, SplitResult};

//! Ruin-and-recreate neighbourhood for the genetic search.
//!
//! - [`adjacent_string_removal`]: ruin, strings of customers clustered around random seeds
//! - [`greedy_insertion_with_blinks`]: recreate, randomized cheapest insertion
//! - [`RuinAndRecreate`]: simulated-annealing loop combining both

pub mod destroy;
pub mod repair;
mod ruin_recreate;

pub use destroy::adjacent_string_removal;
pub use repair::greedy_insertion_with_blinks;
pub use ruin_recreate::{RuinAndRecreate, RuinAndRecreateReport};

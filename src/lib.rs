//! # hgs-rr
//!
//! Hybrid genetic search for the capacitated vehicle routing problem, with
//! a simulated-annealing ruin-and-recreate step (adjacent string removal
//! and greedy insertion with blinks) applied to every offspring.
//!
//! ## Modules
//!
//! - [`models`]: Customers, instance data and individuals
//! - [`distance`]: Distance matrix and granular neighbourhoods
//! - [`evaluation`]: Penalized cost recomputation
//! - [`params`]: Algorithm configuration and run context
//! - [`ga`]: Split, order crossover, population and the genetic driver
//! - [`local_search`]: Granular relocate / swap / 2-opt / 2-opt* search
//! - [`alns`]: Ruin-and-recreate operators and annealing loop
//!
//! ## Example
//!
//! ```
//! use hgs_rr::{AlgorithmConfig, Customer, Genetic, Instance, Params};
//!
//! let customers: Vec<Customer> = std::iter::once(Customer::depot(0.0, 0.0))
//!     .chain((1..=8).map(|i| Customer::new(i, i as f64, 0.0, 10.0)))
//!     .collect();
//! let instance = Instance::from_customers(customers, 40.0).with_vehicles(3);
//! let config = AlgorithmConfig::default().with_seed(1).with_nb_iter(20);
//! let params = Params::new(instance, config)?;
//!
//! let mut genetic = Genetic::new(params)?;
//! if let Some(best) = genetic.run() {
//!     assert!(best.eval.is_feasible);
//! }
//! # Ok::<(), hgs_rr::HgsError>(())
//! ```

pub mod alns;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod local_search;
pub mod models;
pub mod params;

#[cfg(test)]
mod fixtures;

pub use error::HgsError;
pub use ga::Genetic;
pub use models::{Customer, Individual, Instance};
pub use params::{AlgorithmConfig, Params};

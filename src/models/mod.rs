//! Domain model types for capacitated vehicle routing.
//!
//! Provides customers with demands, the instance (locations, distances,
//! fleet), and the individual: a solution carried both as a flat tour
//! and as a route set.

mod customer;
mod individual;
mod instance;

pub use customer::Customer;
pub use individual::{EvalIndiv, Individual, EPSILON};
pub use instance::Instance;

//! Cost and feasibility evaluation.
//!
//! Evaluations are always recomputed from the route set, never patched
//! incrementally.

mod evaluator;

pub use evaluator::{evaluate_complete_cost, RouteMetrics};

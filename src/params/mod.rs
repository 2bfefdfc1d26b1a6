//! Hyperparameters and the per-run context.
//!
//! [`AlgorithmConfig`] is plain serde data loadable from TOML;
//! [`Params`] binds it to an instance together with the shared random
//! stream and the penalty weights.

mod config;
mod context;

pub use config::AlgorithmConfig;
pub use context::Params;

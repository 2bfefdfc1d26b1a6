//! Error type for instance, configuration and solver construction.
//!
//! The search loop itself never fails: degenerate cases (an empty ruin,
//! a customer with no feasible insertion) are handled by policy. Errors
//! only surface while building the inputs of a run.

use thiserror::Error;

/// Errors raised while loading configuration or preparing a run.
#[derive(Debug, Error)]
pub enum HgsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// Order crossover needs two distinct cut points.
    #[error("at least 2 customers are required, found {found}")]
    TooFewCustomers { found: usize },
}

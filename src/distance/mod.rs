//! Distance matrix and granular neighbourhoods.
//!
//! The matrix is indexed by location id, depot at 0.

mod matrix;

pub use matrix::DistanceMatrix;

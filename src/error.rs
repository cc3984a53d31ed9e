//! Error types
//!
//! Configuration errors are fatal and surface before any station worker
//! starts. The engine itself has no runtime error path.

use thiserror::Error;

/// Invalid run parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {what} range: min {min} > max {max} (use min <= max)")]
    InvalidRange { what: String, min: u64, max: u64 },

    #[error("rework probability must be within [0, 1], got {0}")]
    ReworkProbability(f64),

    #[error("time scale must be finite and >= 0, got {0}")]
    TimeScale(f64),

    #[error("catalog must name at least one product type")]
    NoProductTypes,

    #[error("catalog must name at least one stage")]
    NoStages,

    #[error(
        "service table is {types}x{stages} but the catalog has {expected_types} types and {expected_stages} stages"
    )]
    ServiceShape {
        types: usize,
        stages: usize,
        expected_types: usize,
        expected_stages: usize,
    },
}

/// Crate-level error used by the report writers and the CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

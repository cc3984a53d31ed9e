//! Concurrent pipeline
//!
//! Engine, station workers and cancellation.

mod cancel;
mod engine;
mod station;

pub use cancel::CancelToken;
pub use engine::{Phase, Pipeline, RunOutcome, RunStatus};
pub use station::StationStats;

pub mod error;
pub mod pipeline;
pub mod queue;
pub mod report;
pub mod sim;

pub use error::{ConfigError, Error};

#[cfg(test)]
mod test;

//! Stage queues
//!
//! One unbounded FIFO per (type, stage). There is no capacity
//! limit: a burst of arrivals grows the queue instead of blocking producers.

mod stage_queue;

pub use stage_queue::StageQueue;

/// Something a cancellation signal can stop.
pub trait Abort: Send + Sync {
    /// Stops handing out work; returns how many pending entries were discarded.
    fn abort(&self) -> usize;
}

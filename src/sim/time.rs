//! Simulated time
//!
//! Simulated time and its unit conversions. The simulated clock is
//! authoritative; wall time only appears in the cosmetic pacing helper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Simulated time (nanoseconds).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    pub fn saturating_add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }

    /// Wall-clock duration for `self × scale`, used only to pace demos.
    ///
    /// Returns `None` when nothing should be slept (zero duration, zero or
    /// non-finite scale).
    pub fn scaled_wall(self, scale: f64) -> Option<Duration> {
        if self.0 == 0 || !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let nanos = (self.0 as f64 * scale).round();
        if nanos < 1.0 {
            return None;
        }
        Some(Duration::from_nanos(nanos.min(u64::MAX as f64) as u64))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.as_secs_f64())
    }
}

//! Clock and station state
//!
//! Next-free times of every station plus the completion and visit logs,
//! all behind one mutex. `advance` is the only way to move simulated time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use super::item::{CompletionRecord, Item, VisitRecord};
use super::time::SimTime;

/// Service interval handed back by [`ClockState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub start: SimTime,
    pub finish: SimTime,
}

#[derive(Debug, Default)]
struct ClockInner {
    /// Indexed `type * stages + stage`.
    next_free: Vec<SimTime>,
    completed: Vec<CompletionRecord>,
    visits: Vec<VisitRecord>,
}

/// Shared simulated-clock bookkeeping.
#[derive(Debug)]
pub struct ClockState {
    stages: usize,
    inner: Mutex<ClockInner>,
}

impl ClockState {
    pub fn new(types: usize, stages: usize) -> Self {
        Self {
            stages,
            inner: Mutex::new(ClockInner {
                next_free: vec![SimTime::ZERO; types.saturating_mul(stages)],
                ..ClockInner::default()
            }),
        }
    }

    pub fn stages(&self) -> usize {
        self.stages
    }

    fn lock(&self) -> MutexGuard<'_, ClockInner> {
        // only arithmetic runs under this lock
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Books `item` on station `(item.id.ty, stage)` for `base + rework`.
    ///
    /// The station read, the station write and the item update happen under
    /// a single lock acquisition. At stage 0 the entry time is stamped if the
    /// item has none yet; at the final stage a completion record is appended.
    pub fn advance(&self, item: &mut Item, stage: usize, base: SimTime, rework: SimTime) -> Visit {
        let idx = item.id.ty.0 * self.stages + stage;
        let duration = base.saturating_add(rework);

        let mut g = self.lock();
        let start = item.arrival.max(g.next_free[idx]);
        let finish = start.saturating_add(duration);
        g.next_free[idx] = finish;
        item.arrival = finish;

        if stage == 0 && item.entry.is_none() {
            item.entry = Some(start);
        }
        g.visits.push(VisitRecord {
            item_id: item.id,
            stage,
            start,
            finish,
            base,
            rework,
        });
        if stage + 1 == self.stages {
            let entry = *item.entry.get_or_insert(start);
            item.completion = Some(finish);
            g.completed.push(CompletionRecord {
                item_id: item.id,
                ty: item.id.ty,
                entry,
                completion: finish,
                lead_time: finish.saturating_sub(entry),
            });
        }
        drop(g);

        trace!(item = %item.id, stage, ?start, ?finish, "station booked");
        Visit { start, finish }
    }

    pub fn next_free(&self, ty: usize, stage: usize) -> SimTime {
        self.lock().next_free[ty * self.stages + stage]
    }

    pub fn completed_count(&self) -> usize {
        self.lock().completed.len()
    }

    /// Completion records in insertion order, and the visit log in booking order.
    pub fn into_logs(self) -> (Vec<CompletionRecord>, Vec<VisitRecord>) {
        let inner = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        (inner.completed, inner.visits)
    }
}

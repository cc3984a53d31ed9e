//! Cancellation
//!
//! A cloneable token that aborts every attached stage queue. Stations stop
//! pulling new items; items already being served finish their stage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::queue::Abort;

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    targets: Mutex<Vec<Arc<dyn Abort>>>,
}

#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn targets(&self) -> MutexGuard<'_, Vec<Arc<dyn Abort>>> {
        self.inner.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Idempotent.
    pub fn cancel(&self) {
        let mut targets = self.targets();
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let discarded: usize = targets.drain(..).map(|t| t.abort()).sum();
        info!(discarded, "cancellation requested");
    }

    /// Registers a target; aborts it right away if already cancelled.
    pub(crate) fn attach(&self, target: Arc<dyn Abort>) {
        let mut targets = self.targets();
        if self.is_cancelled() {
            target.abort();
        } else {
            targets.push(target);
        }
    }

    pub(crate) fn detach_all(&self) {
        self.targets().clear();
    }
}

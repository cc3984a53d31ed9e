//! Unbounded FIFO stage queue with drain tracking
//!
//! Every `put` adds one unit of unfinished work; the consumer acknowledges it
//! with `task_done` once the dequeued item has been fully handled. `join`
//! blocks until no unfinished work remains.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::Abort;

#[derive(Debug)]
struct Inner<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
    aborted: bool,
}

#[derive(Debug)]
pub struct StageQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    all_done: Condvar,
}

impl<T> Default for StageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StageQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                unfinished: 0,
                closed: false,
                aborted: false,
            }),
            not_empty: Condvar::new(),
            all_done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends at the tail; a closed queue hands the item back.
    pub fn put(&self, item: T) -> Result<(), T> {
        let mut g = self.lock();
        if g.closed {
            return Err(item);
        }
        g.items.push_back(item);
        g.unfinished = g.unfinished.saturating_add(1);
        drop(g);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks for the head item. `None` once the queue is closed and empty,
    /// or as soon as it has been aborted.
    pub fn get(&self) -> Option<T> {
        let mut g = self.lock();
        loop {
            if g.aborted {
                return None;
            }
            if let Some(item) = g.items.pop_front() {
                return Some(item);
            }
            if g.closed {
                return None;
            }
            g = self.not_empty.wait(g).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Acknowledges one item previously returned by `get`.
    pub fn task_done(&self) {
        let mut g = self.lock();
        g.unfinished = g.unfinished.saturating_sub(1);
        if g.unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Blocks until every item put so far has been acknowledged.
    pub fn join(&self) {
        let mut g = self.lock();
        while g.unfinished > 0 {
            g = self.all_done.wait(g).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Refuses further puts and wakes idle consumers once the queue is empty.
    pub fn close(&self) {
        self.lock().closed = true;
        self.not_empty.notify_all();
    }

    /// Drops pending items and stops handing out new ones. Items already
    /// taken by a consumer still count as unfinished until acknowledged.
    pub fn abort(&self) -> usize {
        let mut g = self.lock();
        let discarded = g.items.len();
        g.items.clear();
        g.unfinished = g.unfinished.saturating_sub(discarded);
        g.closed = true;
        g.aborted = true;
        let idle = g.unfinished == 0;
        drop(g);
        self.not_empty.notify_all();
        if idle {
            self.all_done.notify_all();
        }
        discarded
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }
}

impl<T: Send> Abort for StageQueue<T> {
    fn abort(&self) -> usize {
        StageQueue::abort(self)
    }
}

//! Pipeline engine
//!
//! Seeds the stage-0 queues, runs one worker thread per station and waits
//! until every queue has been drained and acknowledged.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::station::{StationSetup, StationStats, StationWorker};
use crate::error::ConfigError;
use crate::queue::StageQueue;
use crate::sim::{
    ClockState, CompletionRecord, EntryPolicy, Item, ItemId, RunParameters, SimTime, VisitRecord,
    makespan,
};

/// Engine lifecycle. Invalid parameters never leave `Configuring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Seeding,
    Running,
    Draining,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted,
}

/// Everything a run leaves behind for metrics and export.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Insertion order is completion-append order.
    pub records: Vec<CompletionRecord>,
    /// Booking order; per station this is service order.
    pub visits: Vec<VisitRecord>,
    pub stations: Vec<StationStats>,
    pub makespan: SimTime,
    pub items_seeded: usize,
    /// Seeded items without a completion record (non-zero only when aborted).
    pub incomplete: usize,
    /// Informational only.
    pub wall_runtime: Duration,
}

pub struct Pipeline<R> {
    params: RunParameters,
    rng: R,
    cancel: CancelToken,
    phase: Phase,
}

impl<R: RngCore> Pipeline<R> {
    /// Validates `params`; `rng` is the only source of randomness for the run.
    pub fn new(params: RunParameters, rng: R) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params,
            rng,
            cancel: CancelToken::new(),
            phase: Phase::Configuring,
        })
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    /// Runs to completion (or cancellation) on the simulated clock.
    #[tracing::instrument(skip(self))]
    pub fn run(mut self) -> RunOutcome {
        let wall_start = Instant::now();
        let types = self.params.catalog.type_count();
        let stages = self.params.catalog.stage_count();
        let idx = |t: usize, s: usize| t * stages + s;

        let queues: Vec<Arc<StageQueue<Item>>> = (0..types * stages)
            .map(|_| Arc::new(StageQueue::new()))
            .collect();
        for q in &queues {
            self.cancel.attach(q.clone());
        }
        let clock = ClockState::new(types, stages);

        self.enter(Phase::Seeding);
        let mut seed_rng = StdRng::seed_from_u64(self.rng.next_u64());
        let mut items_seeded = 0usize;
        for ty in self.params.catalog.product_types() {
            let n = self.params.items_per_type.sample(&mut seed_rng);
            for seq in 0..n {
                let arrival = self.params.arrival.arrival(seq);
                let mut item = Item::new(ItemId { ty, seq }, arrival);
                if self.params.entry == EntryPolicy::Seeded {
                    item.entry = Some(arrival);
                }
                items_seeded += 1;
                if queues[idx(ty.0, 0)].put(item).is_err() {
                    debug!(ty = ty.0, seq, "stage 0 refused item");
                }
            }
            debug!(ty = ty.0, items = n, "seeded");
        }
        info!(items_seeded, "items seeded");

        let setups: Vec<(StationSetup, StdRng)> = self
            .params
            .catalog
            .product_types()
            .flat_map(|ty| (0..stages).map(move |stage| (ty, stage)))
            .map(|(ty, stage)| {
                let setup = StationSetup {
                    ty,
                    stage,
                    base_secs: self.params.service(ty, stage),
                    rework_probability: self.params.rework_probability,
                    rework_extra_secs: self.params.rework_extra_secs,
                    time_scale: self.params.time_scale,
                };
                (setup, StdRng::seed_from_u64(self.rng.next_u64()))
            })
            .collect();

        self.enter(Phase::Running);
        let stations = thread::scope(|scope| {
            let handles: Vec<_> = setups
                .into_iter()
                .map(|(setup, rng)| {
                    let input = &*queues[idx(setup.ty.0, setup.stage)];
                    let output = (setup.stage + 1 < stages)
                        .then(|| &*queues[idx(setup.ty.0, setup.stage + 1)]);
                    let worker = StationWorker::new(setup, rng, input, output, &clock);
                    scope.spawn(move || worker.run())
                })
                .collect();

            self.enter(Phase::Draining);
            // stage order matters: an item reaches stage s+1 before stage s acknowledges it
            for t in 0..types {
                for s in 0..stages {
                    queues[idx(t, s)].join();
                }
            }
            for q in &queues {
                q.close();
            }

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect::<Vec<_>>()
        });
        self.cancel.detach_all();

        let (records, visits) = clock.into_logs();
        let makespan = makespan(&records);
        let incomplete = items_seeded.saturating_sub(records.len());
        let status = if self.cancel.is_cancelled() && incomplete > 0 {
            self.enter(Phase::Aborted);
            warn!(completed = records.len(), incomplete, "run aborted");
            RunStatus::Aborted
        } else {
            self.enter(Phase::Completed);
            RunStatus::Completed
        };

        let wall_runtime = wall_start.elapsed();
        info!(
            completed = records.len(),
            makespan = %makespan,
            wall_ms = wall_runtime.as_millis() as u64,
            "run finished"
        );

        RunOutcome {
            status,
            records,
            visits,
            stations,
            makespan,
            items_seeded,
            incomplete,
            wall_runtime,
        }
    }
}

//! Station worker
//!
//! One worker per (type, stage). It owns its random stream, so the draws it
//! makes depend only on the order in which its queue delivers items.

use std::thread;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::queue::StageQueue;
use crate::sim::{ClockState, Item, ProductType, SimTime, UniformRange};

/// Per-station counters returned when the worker exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationStats {
    pub ty: ProductType,
    pub stage: usize,
    pub served: u64,
    pub reworked: u64,
}

/// Immutable sampling setup of one station.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StationSetup {
    pub ty: ProductType,
    pub stage: usize,
    pub base_secs: UniformRange,
    pub rework_probability: f64,
    pub rework_extra_secs: UniformRange,
    pub time_scale: f64,
}

pub(crate) struct StationWorker<'a> {
    setup: StationSetup,
    rng: StdRng,
    input: &'a StageQueue<Item>,
    /// `None` at the final stage.
    output: Option<&'a StageQueue<Item>>,
    clock: &'a ClockState,
}

impl<'a> StationWorker<'a> {
    pub fn new(
        setup: StationSetup,
        rng: StdRng,
        input: &'a StageQueue<Item>,
        output: Option<&'a StageQueue<Item>>,
        clock: &'a ClockState,
    ) -> Self {
        Self {
            setup,
            rng,
            input,
            output,
            clock,
        }
    }

    /// Services the input queue until it is closed or aborted.
    pub fn run(mut self) -> StationStats {
        let mut stats = StationStats {
            ty: self.setup.ty,
            stage: self.setup.stage,
            served: 0,
            reworked: 0,
        };
        trace!(ty = self.setup.ty.0, stage = self.setup.stage, "station started");

        while let Some(mut item) = self.input.get() {
            let rework = self.serve(&mut item);
            stats.served += 1;
            if rework > SimTime::ZERO {
                stats.reworked += 1;
            }

            if let Some(next) = self.output {
                if let Err(item) = next.put(item) {
                    // next stage aborted; the item stays incomplete
                    debug!(item = %item.id, stage = self.setup.stage, "next stage refused item");
                }
            }
            self.input.task_done();
        }

        trace!(
            ty = self.setup.ty.0,
            stage = self.setup.stage,
            served = stats.served,
            "station stopped"
        );
        stats
    }

    /// Draws the visit duration, books the station, paces the demo.
    /// Returns the rework share of the duration.
    fn serve(&mut self, item: &mut Item) -> SimTime {
        let s = &self.setup;
        let base = s.base_secs.sample_secs(&mut self.rng);
        let rework = if s.rework_probability > 0.0 && self.rng.gen_bool(s.rework_probability) {
            s.rework_extra_secs.sample_secs(&mut self.rng)
        } else {
            SimTime::ZERO
        };

        let visit = self.clock.advance(item, s.stage, base, rework);
        let duration = visit.finish.saturating_sub(visit.start);
        debug!(
            item = %item.id,
            stage = s.stage,
            start = %visit.start,
            finish = %visit.finish,
            %duration,
            "stage visit"
        );
        if rework > SimTime::ZERO {
            debug!(item = %item.id, stage = s.stage, extra = %rework, "rework");
        }

        if let Some(pause) = duration.scaled_wall(s.time_scale) {
            thread::sleep(pause);
        }
        rework
    }
}

//! Analysis hooks
//!
//! Optional consumers of a finished run. The engine never calls these;
//! callers wire them after `Pipeline::run` returns.

use crate::sim::{CompletionRecord, SimTime};

pub trait RunObserver {
    fn consume(&mut self, records: &[CompletionRecord], makespan: SimTime);
}

/// Equal-width lead-time histogram rendered as text bars.
#[derive(Debug, Clone)]
pub struct LeadTimeHistogram {
    bins: usize,
    lo: SimTime,
    width: SimTime,
    counts: Vec<usize>,
    makespan: SimTime,
}

impl LeadTimeHistogram {
    pub fn new(bins: usize) -> Self {
        Self {
            bins: bins.max(1),
            lo: SimTime::ZERO,
            width: SimTime::ZERO,
            counts: Vec::new(),
            makespan: SimTime::ZERO,
        }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn render(&self) -> String {
        if self.counts.is_empty() {
            return "no lead times recorded".to_string();
        }
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut lines = Vec::with_capacity(self.counts.len() + 1);
        lines.push(format!(
            "lead time distribution (sim), makespan {}",
            self.makespan
        ));
        for (i, &n) in self.counts.iter().enumerate() {
            let from = SimTime(self.lo.0.saturating_add(self.width.0.saturating_mul(i as u64)));
            let to = from.saturating_add(self.width);
            let bar = "#".repeat(n * 40 / peak);
            lines.push(format!("{from:>10} .. {to:<10} {n:>5} {bar}"));
        }
        lines.join("\n")
    }
}

impl RunObserver for LeadTimeHistogram {
    fn consume(&mut self, records: &[CompletionRecord], makespan: SimTime) {
        self.makespan = makespan;
        self.counts.clear();
        let (Some(lo), Some(hi)) = (
            records.iter().map(|r| r.lead_time).min(),
            records.iter().map(|r| r.lead_time).max(),
        ) else {
            return;
        };
        let span = hi.0 - lo.0;
        let width = span.div_ceil(self.bins as u64).max(1);
        let bins = if span == 0 { 1 } else { self.bins };
        self.lo = lo;
        self.width = SimTime(width);
        self.counts = vec![0; bins];
        for r in records {
            let i = ((r.lead_time.0 - lo.0) / width) as usize;
            // `hi` falls on the upper edge of the last bin
            self.counts[i.min(bins - 1)] += 1;
        }
    }
}

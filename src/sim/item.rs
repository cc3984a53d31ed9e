//! Items and records
//!
//! An item is owned by exactly one station at a time; it moves between
//! stage queues by value.

use std::fmt;

use super::params::{Catalog, ProductType};
use super::time::SimTime;

/// Item identifier: product type plus per-type sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId {
    pub ty: ProductType,
    pub seq: u64,
}

impl ItemId {
    /// Human label such as `Tablet-0003`.
    pub fn label(&self, catalog: &Catalog) -> String {
        format!("{}-{:04}", catalog.type_name(self.ty), self.seq)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}-{:04}", self.ty.0, self.seq)
    }
}

/// One unit moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Time the item became ready for its current stage.
    pub arrival: SimTime,
    pub entry: Option<SimTime>,
    pub completion: Option<SimTime>,
}

impl Item {
    pub fn new(id: ItemId, arrival: SimTime) -> Self {
        Self {
            id,
            arrival,
            entry: None,
            completion: None,
        }
    }
}

/// Produced exactly once per item leaving the final stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionRecord {
    pub item_id: ItemId,
    pub ty: ProductType,
    pub entry: SimTime,
    pub completion: SimTime,
    pub lead_time: SimTime,
}

/// One service interval at one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitRecord {
    pub item_id: ItemId,
    pub stage: usize,
    pub start: SimTime,
    pub finish: SimTime,
    pub base: SimTime,
    pub rework: SimTime,
}

impl VisitRecord {
    pub fn duration(&self) -> SimTime {
        self.finish.saturating_sub(self.start)
    }
}

/// `max(completion) − min(entry)` over the records; zero when empty.
pub fn makespan(records: &[CompletionRecord]) -> SimTime {
    let first = records.iter().map(|r| r.entry).min();
    let last = records.iter().map(|r| r.completion).max();
    match (first, last) {
        (Some(first), Some(last)) => last.saturating_sub(first),
        _ => SimTime::ZERO,
    }
}

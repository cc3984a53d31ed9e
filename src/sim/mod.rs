//! Simulation core
//!
//! Simulated time, run parameters, items and the shared clock state.

mod clock;
mod item;
mod params;
mod time;

pub use clock::{ClockState, Visit};
pub use item::{CompletionRecord, Item, ItemId, VisitRecord, makespan};
pub use params::{ArrivalPolicy, Catalog, EntryPolicy, ProductType, RunParameters, UniformRange};
pub use time::SimTime;

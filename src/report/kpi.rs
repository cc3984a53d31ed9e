//! Lead-time KPIs
//!
//! Pure functions over finished records; computing twice over the same
//! records gives the same result. Times are reported in simulated seconds
//! rounded to milliseconds.

use serde::Serialize;

use crate::sim::{Catalog, CompletionRecord, ProductType, SimTime, VisitRecord};

pub(crate) fn secs(t: SimTime) -> f64 {
    round3(t.as_secs_f64())
}

pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn mean(values: &[SimTime]) -> SimTime {
    if values.is_empty() {
        return SimTime::ZERO;
    }
    let sum: u128 = values.iter().map(|v| v.0 as u128).sum();
    SimTime((sum / values.len() as u128) as u64)
}

/// Upper median (`sorted[n / 2]`).
fn median(values: &[SimTime]) -> SimTime {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.get(sorted.len() / 2).copied().unwrap_or(SimTime::ZERO)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeLeadTime {
    pub product_type: String,
    pub completed: usize,
    pub lead_time_avg_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRow {
    pub order_id: String,
    pub ended_at_sim_sec: f64,
    pub lead_time_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub orders_completed: usize,
    pub lead_time_avg_sec: f64,
    pub lead_time_med_sec: f64,
    /// Every catalog type, in catalog order.
    pub lead_time_avg_by_type: Vec<TypeLeadTime>,
    /// Ascending by completion time; ties keep record order.
    pub last_completed: Vec<CompletedRow>,
}

impl Kpis {
    pub fn compute(records: &[CompletionRecord], catalog: &Catalog, last_n: usize) -> Kpis {
        let lead_times: Vec<SimTime> = records.iter().map(|r| r.lead_time).collect();

        let lead_time_avg_by_type = catalog
            .product_types()
            .map(|ty| {
                let per_type: Vec<SimTime> = records
                    .iter()
                    .filter(|r| r.ty == ty)
                    .map(|r| r.lead_time)
                    .collect();
                TypeLeadTime {
                    product_type: catalog.type_name(ty).to_string(),
                    completed: per_type.len(),
                    lead_time_avg_sec: secs(mean(&per_type)),
                }
            })
            .collect();

        Kpis {
            orders_completed: records.len(),
            lead_time_avg_sec: secs(mean(&lead_times)),
            lead_time_med_sec: secs(median(&lead_times)),
            lead_time_avg_by_type,
            last_completed: last_completed(records, last_n)
                .into_iter()
                .map(|r| CompletedRow {
                    order_id: r.item_id.label(catalog),
                    ended_at_sim_sec: secs(r.completion),
                    lead_time_sec: secs(r.lead_time),
                })
                .collect(),
        }
    }

    pub fn by_type(&self, name: &str) -> Option<&TypeLeadTime> {
        self.lead_time_avg_by_type
            .iter()
            .find(|t| t.product_type == name)
    }
}

/// The `n` most recently completed records, oldest first.
pub fn last_completed(records: &[CompletionRecord], n: usize) -> Vec<CompletionRecord> {
    let mut sorted = records.to_vec();
    // stable: equal completion times keep insertion order
    sorted.sort_by_key(|r| r.completion);
    let skip = sorted.len().saturating_sub(n);
    sorted.split_off(skip)
}

/// Busy time of one station over the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationLoad {
    pub product_type: String,
    pub stage: String,
    pub served: usize,
    pub reworked: usize,
    pub busy_sec: f64,
    /// `busy / makespan`; zero when the makespan is zero.
    pub utilization: f64,
}

impl StationLoad {
    pub fn from_visits(visits: &[VisitRecord], catalog: &Catalog, makespan: SimTime) -> Vec<Self> {
        let mut out = Vec::with_capacity(catalog.type_count() * catalog.stage_count());
        for ty in catalog.product_types() {
            for stage in 0..catalog.stage_count() {
                out.push(Self::for_station(visits, catalog, ty, stage, makespan));
            }
        }
        out
    }

    fn for_station(
        visits: &[VisitRecord],
        catalog: &Catalog,
        ty: ProductType,
        stage: usize,
        makespan: SimTime,
    ) -> Self {
        let mine = visits
            .iter()
            .filter(|v| v.item_id.ty == ty && v.stage == stage);
        let (mut served, mut reworked, mut busy) = (0usize, 0usize, SimTime::ZERO);
        for v in mine {
            served += 1;
            if v.rework > SimTime::ZERO {
                reworked += 1;
            }
            busy = busy.saturating_add(v.duration());
        }
        let utilization = if makespan == SimTime::ZERO {
            0.0
        } else {
            round3(busy.0 as f64 / makespan.0 as f64)
        };
        Self {
            product_type: catalog.type_name(ty).to_string(),
            stage: catalog.stage_name(stage).to_string(),
            served,
            reworked,
            busy_sec: secs(busy),
            utilization,
        }
    }
}

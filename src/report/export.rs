//! Report export
//!
//! JSON payload plus a plain-text summary, built only from the run outcome
//! and its parameters.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::kpi::{Kpis, StationLoad, round3, secs};
use crate::error::Error;
use crate::pipeline::{RunOutcome, RunStatus};
use crate::sim::RunParameters;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub order_id: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub start_sim_sec: f64,
    pub end_sim_sec: f64,
    pub lead_time_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportPayload {
    pub generated_at_utc: String,
    pub status: RunStatus,
    pub params: RunParameters,
    pub items_seeded: usize,
    pub incomplete: usize,
    pub kpis: Kpis,
    pub stations: Vec<StationLoad>,
    /// Simulated.
    pub makespan_sec: f64,
    /// Wall clock, informational.
    pub runtime_real_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderRow>>,
}

impl ExportPayload {
    pub fn build(
        outcome: &RunOutcome,
        params: &RunParameters,
        last_n: usize,
        include_orders: bool,
    ) -> Self {
        let catalog = &params.catalog;
        let orders = include_orders.then(|| {
            outcome
                .records
                .iter()
                .map(|r| OrderRow {
                    order_id: r.item_id.label(catalog),
                    product_type: catalog.type_name(r.ty).to_string(),
                    start_sim_sec: secs(r.entry),
                    end_sim_sec: secs(r.completion),
                    lead_time_sec: secs(r.lead_time),
                })
                .collect()
        });
        Self {
            generated_at_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            status: outcome.status,
            params: params.clone(),
            items_seeded: outcome.items_seeded,
            incomplete: outcome.incomplete,
            kpis: Kpis::compute(&outcome.records, catalog, last_n),
            stations: StationLoad::from_visits(&outcome.visits, catalog, outcome.makespan),
            makespan_sec: secs(outcome.makespan),
            runtime_real_sec: round3(outcome.wall_runtime.as_secs_f64()),
            orders,
        }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable report.
    pub fn render_text(&self) -> String {
        let k = &self.kpis;
        let mut lines = vec![
            "=== Packing Simulator - Report ===".to_string(),
            format!("Generated UTC: {}", self.generated_at_utc),
            format!(
                "Parameters: {}",
                serde_json::to_string(&self.params).unwrap_or_default()
            ),
            format!("Status: {:?}", self.status),
            format!("Orders completed: {}", k.orders_completed),
        ];
        if self.incomplete > 0 {
            lines.push(format!("Orders not completed: {}", self.incomplete));
        }
        lines.push(format!("Mean lead time (sim): {} s", k.lead_time_avg_sec));
        lines.push(format!("Median lead time (sim): {} s", k.lead_time_med_sec));
        lines.push("Mean lead time by type (sim):".to_string());
        for t in &k.lead_time_avg_by_type {
            lines.push(format!(" - {}: {} s", t.product_type, t.lead_time_avg_sec));
        }
        lines.push(format!("Simulated makespan: {} s", self.makespan_sec));
        lines.push(format!("Real runtime: {} s", self.runtime_real_sec));
        lines.push("Last completed (sim time):".to_string());
        for row in &k.last_completed {
            lines.push(format!(
                " - t_sim={}s  {}  {}s",
                row.ended_at_sim_sec, row.order_id, row.lead_time_sec
            ));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub txt: PathBuf,
}

/// Writes `<prefix>_<UTC stamp>.json` and `.txt` under `out_dir`.
pub fn save_report_files(
    out_dir: &Path,
    prefix: &str,
    payload: &ExportPayload,
) -> Result<ReportPaths, Error> {
    fs::create_dir_all(out_dir)?;
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let paths = ReportPaths {
        json: out_dir.join(format!("{prefix}_{stamp}.json")),
        txt: out_dir.join(format!("{prefix}_{stamp}.txt")),
    };
    fs::write(&paths.json, payload.to_json()?)?;
    fs::write(&paths.txt, payload.render_text())?;
    info!(json = %paths.json.display(), txt = %paths.txt.display(), "report saved");
    Ok(paths)
}

use crate::pipeline::{Pipeline, RunOutcome, RunStatus};
use crate::report::{ExportPayload, save_report_files};
use crate::sim::{Catalog, RunParameters, UniformRange};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "packsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ))
}

fn small_run() -> (RunOutcome, RunParameters) {
    let params = RunParameters::uniform(
        Catalog::default(),
        UniformRange::fixed(2),
        UniformRange::fixed(5),
        0.0,
        UniformRange::fixed(0),
    );
    let out = Pipeline::new(params.clone(), StdRng::seed_from_u64(42))
        .expect("valid")
        .run();
    (out, params)
}

#[test]
fn payload_serializes_kpis_orders_and_params() {
    let (out, params) = small_run();
    let payload = ExportPayload::build(&out, &params, 4, true);
    let v: Value = serde_json::from_str(&payload.to_json().expect("json")).expect("parse");

    assert_eq!(v["status"], "completed");
    assert_eq!(v["items_seeded"], 6);
    assert_eq!(v["kpis"]["orders_completed"], 6);
    assert_eq!(v["kpis"]["last_completed"].as_array().map(Vec::len), Some(4));
    // two items per type, five 5s stages each, entry at first service
    assert_eq!(v["makespan_sec"], 30.0);
    assert_eq!(v["kpis"]["lead_time_avg_sec"], 25.0);
    assert_eq!(v["params"]["rework_probability"], 0.0);
    assert_eq!(v["stations"].as_array().map(Vec::len), Some(15));

    let orders = v["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 6);
    let first = orders
        .iter()
        .find(|o| o["order_id"] == "Tablet-0000")
        .expect("Tablet-0000");
    assert_eq!(first["type"], "Tablet");
    assert_eq!(first["start_sim_sec"], 0.0);
    assert_eq!(first["end_sim_sec"], 25.0);
    assert_eq!(first["lead_time_sec"], 25.0);
}

#[test]
fn payload_can_leave_out_orders() {
    let (out, params) = small_run();
    let payload = ExportPayload::build(&out, &params, 20, false);
    assert!(payload.orders.is_none());
    let v: Value = serde_json::to_value(&payload).expect("to value");
    assert!(v.get("orders").is_none());
    assert_eq!(payload.status, RunStatus::Completed);
}

#[test]
fn text_report_lists_kpis() {
    let (out, params) = small_run();
    let txt = ExportPayload::build(&out, &params, 2, true).render_text();
    assert!(txt.starts_with("=== Packing Simulator - Report ==="));
    assert!(txt.contains("Orders completed: 6"));
    assert!(txt.contains("Simulated makespan: 30 s"));
    assert!(txt.contains(" - Printer: 25 s"));
    assert!(!txt.contains("Orders not completed"));
    assert_eq!(txt.lines().filter(|l| l.starts_with(" - t_sim=")).count(), 2);
}

#[test]
fn report_files_are_written_under_out_dir() {
    let dir = unique_temp_dir("report");
    let (out, params) = small_run();
    let payload = ExportPayload::build(&out, &params, 20, true);

    let paths = save_report_files(&dir, "packing_report", &payload).expect("save");
    assert!(paths.json.starts_with(&dir));
    let name = paths.json.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("packing_report_") && name.ends_with(".json"));
    assert_eq!(paths.txt.with_extension("json"), paths.json);

    let raw = fs::read_to_string(&paths.json).expect("read json");
    let v: Value = serde_json::from_str(&raw).expect("parse json");
    assert_eq!(v["kpis"]["orders_completed"], 6);
    let txt = fs::read_to_string(&paths.txt).expect("read txt");
    assert!(txt.contains("Orders completed: 6"));

    let _ = fs::remove_dir_all(&dir);
}

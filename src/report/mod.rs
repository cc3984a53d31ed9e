//! Reporting
//!
//! KPIs, JSON/TXT export and analysis hooks over a finished run.

mod export;
mod kpi;
mod observer;

pub use export::{ExportPayload, OrderRow, ReportPaths, save_report_files};
pub use kpi::{CompletedRow, Kpis, StationLoad, TypeLeadTime, last_completed};
pub use observer::{LeadTimeHistogram, RunObserver};

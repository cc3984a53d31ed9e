//! Packing pipeline simulation
//!
//! Runs one batch through the packing stations and prints lead-time KPIs.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use packsim_rs::Error;
use packsim_rs::pipeline::{Pipeline, RunOutcome, RunStatus};
use packsim_rs::report::{ExportPayload, LeadTimeHistogram, RunObserver, save_report_files};
use packsim_rs::sim::{ArrivalPolicy, Catalog, EntryPolicy, RunParameters, UniformRange};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

const DEFAULT_MIN_ITEMS: u64 = 10;
const DEFAULT_MAX_ITEMS: u64 = 20;
const DEFAULT_MIN_SECS: u64 = 5;
const DEFAULT_MAX_SECS: u64 = 12;
const DEFAULT_REWORK_PROB: f64 = 0.05;
const DEFAULT_TIME_SCALE: f64 = 0.05;

#[derive(Debug, Parser)]
#[command(
    name = "packing-sim",
    about = "Packing pipeline simulator: item types through single-server stages"
)]
struct Args {
    /// Run parameters as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum items per product type [10]
    #[arg(long)]
    min_items: Option<u64>,

    /// Maximum items per product type [20]
    #[arg(long)]
    max_items: Option<u64>,

    /// Minimum base time per stage in simulated seconds [5]
    #[arg(long)]
    min_secs: Option<u64>,

    /// Maximum base time per stage in simulated seconds [12]
    #[arg(long)]
    max_secs: Option<u64>,

    /// Rework probability per stage visit, 0..=1 [0.05]
    #[arg(long)]
    rework_prob: Option<f64>,

    /// Minimum rework extra seconds (defaults to the stage time range)
    #[arg(long)]
    rework_min_secs: Option<u64>,

    /// Maximum rework extra seconds (defaults to the stage time range)
    #[arg(long)]
    rework_max_secs: Option<u64>,

    /// Wall-clock seconds slept per simulated second; 0 runs flat out [0.05]
    #[arg(long)]
    time_scale: Option<f64>,

    /// Stagger arrivals: k-th item of each type arrives at k * this many seconds
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Measure lead time from seeding instead of from first service
    #[arg(long)]
    entry_seeded: bool,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Rows in the "last completed" table
    #[arg(long, default_value_t = 20)]
    last: usize,

    /// Write the JSON payload to this file
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write a JSON + TXT report pair into this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    #[arg(long, default_value = "packing_report")]
    report_prefix: String,

    /// Leave per-order rows out of the JSON payload
    #[arg(long)]
    no_orders: bool,

    /// Print a lead-time histogram with this many bins
    #[arg(long)]
    histogram_bins: Option<usize>,

    /// Cancel the run after this many wall-clock milliseconds
    #[arg(long)]
    abort_after_ms: Option<u64>,

    /// Disable logging
    #[arg(long)]
    quiet: bool,
}

fn resolve_params(args: &Args, rng: &mut StdRng) -> Result<RunParameters, Error> {
    let items = |base: UniformRange| {
        UniformRange::new(
            args.min_items.unwrap_or(base.min),
            args.max_items.unwrap_or(base.max),
        )
    };

    let mut params = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let mut params: RunParameters = serde_json::from_str(&raw)?;
            params.items_per_type = items(params.items_per_type);
            if args.min_secs.is_some() || args.max_secs.is_some() {
                let current = params.service_secs.first().and_then(|row| row.first()).copied();
                let range = UniformRange::new(
                    args.min_secs.or(current.map(|r| r.min)).unwrap_or(DEFAULT_MIN_SECS),
                    args.max_secs.or(current.map(|r| r.max)).unwrap_or(DEFAULT_MAX_SECS),
                );
                params.service_secs = vec![
                    vec![range; params.catalog.stage_count()];
                    params.catalog.type_count()
                ];
            }
            if let Some(p) = args.rework_prob {
                params.rework_probability = p;
            }
            if let Some(scale) = args.time_scale {
                params.time_scale = scale;
            }
            params
        }
        None => {
            let durations = UniformRange::new(
                args.min_secs.unwrap_or(DEFAULT_MIN_SECS),
                args.max_secs.unwrap_or(DEFAULT_MAX_SECS),
            );
            RunParameters::generate(
                Catalog::default(),
                items(UniformRange::new(DEFAULT_MIN_ITEMS, DEFAULT_MAX_ITEMS)),
                durations,
                args.rework_prob.unwrap_or(DEFAULT_REWORK_PROB),
                rng,
            )?
            .with_time_scale(args.time_scale.unwrap_or(DEFAULT_TIME_SCALE))
        }
    };

    params.rework_extra_secs = UniformRange::new(
        args.rework_min_secs.unwrap_or(params.rework_extra_secs.min),
        args.rework_max_secs.unwrap_or(params.rework_extra_secs.max),
    );
    if let Some(every_secs) = args.interval_secs {
        params.arrival = ArrivalPolicy::Interval { every_secs };
    }
    if args.entry_seeded {
        params.entry = EntryPolicy::Seeded;
    }
    params.validate()?;
    Ok(params)
}

fn print_kpis(payload: &ExportPayload) {
    let k = &payload.kpis;
    println!("makespan_sim_sec={}", payload.makespan_sec);
    println!("runtime_real_sec={}", payload.runtime_real_sec);
    if k.orders_completed == 0 {
        println!("\n[no orders completed: KPIs unavailable]");
        return;
    }
    println!("\n--- KPIs (simulated time) ---");
    println!("orders_completed={}", k.orders_completed);
    println!("lead_time_avg_sec={:.2}", k.lead_time_avg_sec);
    println!("lead_time_med_sec={:.2}", k.lead_time_med_sec);
    for t in &k.lead_time_avg_by_type {
        println!("- {}: mean lead time {:.2}s", t.product_type, t.lead_time_avg_sec);
    }
    println!("\nLast completed (simulated time):");
    println!("{:<15} {:<26} {:>12}", "END_SIM(s)", "ORDER", "LEAD_TIME(s)");
    println!("{}", "-".repeat(60));
    for row in &k.last_completed {
        println!(
            "{:<15.2} {:<26} {:>12.2}",
            row.ended_at_sim_sec, row.order_id, row.lead_time_sec
        );
    }
}

fn run(args: Args) -> Result<(), Error> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let params = resolve_params(&args, &mut rng)?;
    let pipeline = Pipeline::new(params.clone(), rng)?;

    if let Some(ms) = args.abort_after_ms {
        let token = pipeline.cancel_token();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(ms));
            token.cancel();
        });
    }

    let outcome: RunOutcome = pipeline.run();
    if outcome.status == RunStatus::Aborted {
        println!("status=aborted incomplete={}", outcome.incomplete);
    } else {
        println!("status=completed");
    }

    let payload = ExportPayload::build(&outcome, &params, args.last, !args.no_orders);
    print_kpis(&payload);

    if let Some(bins) = args.histogram_bins {
        let mut hist = LeadTimeHistogram::new(bins);
        hist.consume(&outcome.records, outcome.makespan);
        println!("\n{}", hist.render());
    }

    if let Some(path) = &args.json_out {
        fs::write(path, payload.to_json()?)?;
        info!(path = %path.display(), "wrote json payload");
    }
    if let Some(dir) = &args.report_dir {
        let paths = save_report_files(dir, &args.report_prefix, &payload)?;
        println!("\nreport json: {}", paths.json.display());
        println!("report txt : {}", paths.txt.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

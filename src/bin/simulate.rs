use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use gemcost::api_computations::{run_with_calibration, RunRequest};
use gemcost::env_config::{default_seed, init_rayon_threads};
use gemcost::logging::init_tracing;
use gemcost::simulation::Report;
use gemcost::types::Grade;

/// Estimate the cost per net point of processing gems of one grade.
#[derive(Parser, Debug)]
#[command(name = "gemcost-simulate", version)]
struct Args {
    /// Gem grade.
    #[arg(long, value_enum, default_value = "hero")]
    grade: Grade,

    /// Market price of one gem.
    #[arg(long)]
    gem_price: f64,

    /// Allow restarting a gem that can no longer reach +1.
    #[arg(long)]
    restart: bool,

    /// Charge the per-gem processing fee.
    #[arg(long)]
    fee: bool,

    /// Crystal base price used for fee and restart costs.
    #[arg(long)]
    crystal_price: Option<f64>,

    /// Gems simulated per calibration round.
    #[arg(long, default_value_t = 1000)]
    runs: usize,

    /// Fixed seed (overrides GEMCOST_SEED).
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn format_currency(value: f64) -> String {
    if value.is_finite() {
        format!("{:.0}", value)
    } else {
        "inf".to_string()
    }
}

fn print_report(report: &Report) {
    let gems = if report.gems_per_point.is_finite() {
        format!("{:.2}", report.gems_per_point)
    } else {
        "inf".to_string()
    };
    println!("Gems per point:              {}", gems);
    println!("Currency per point:          {}", format_currency(report.currency_per_point));
    println!(
        "Processing currency / point: {}",
        format_currency(report.processing_currency_per_point)
    );
    println!("  gem:        {}", format_currency(report.cost_breakdown.gem));
    println!("  fee:        {}", format_currency(report.cost_breakdown.fee));
    println!("  processing: {}", format_currency(report.cost_breakdown.processing));
    println!("  restart:    {}", format_currency(report.cost_breakdown.restart));
    let h = &report.outcome_histogram;
    println!("Final scores over {} gems:", report.runs);
    println!("  +2: {:>8}", h.two_points);
    println!("  +1: {:>8}", h.one_point);
    println!("   0: {:>8}", h.zero_points);
    println!("  <0: {:>8}", h.negative_points);
    println!("Calibration rounds: {}", report.calibration_rounds);
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    init_rayon_threads();

    let request = RunRequest {
        grade: args.grade,
        gem_unit_price: args.gem_price,
        use_restart: args.restart,
        use_fee_surcharge: args.fee,
        fee_base_unit_price: args.crystal_price,
        simulation_runs: args.runs,
        seed: args.seed.or_else(default_seed),
    };
    let params = request.validate().context("invalid simulation parameters")?;

    let start = Instant::now();
    let (report, calibration) = run_with_calibration(&params);
    let elapsed = start.elapsed();

    if args.json {
        let mut value = serde_json::to_value(report)?;
        value["calibration"] = serde_json::to_value(&calibration.history)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_report(&report);
        println!("Elapsed: {:.2}s", elapsed.as_secs_f64());
    }
    Ok(())
}

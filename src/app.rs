//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - ingests CSV inputs (or generates seeded synthetic data for `demo`)
//! - runs fitting, projection, curve fitting, and cost estimation
//! - prints reports
//! - writes artifact/export files

use clap::Parser;

use crate::cli::{Command, CostArgs, DemoArgs, FitArgs, PriceCurveArgs, ProjectArgs};
use crate::domain::{EngineConfig, Period, PeriodTemperatureSeries};
use crate::error::AppError;
use crate::io::ingest::{self, Ingested, TemperatureRow};

pub mod pipeline;

/// Entry point for the `rti` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Project(args) => handle_project(args),
        Command::PriceCurve(args) => handle_price_curve(args),
        Command::Cost(args) => handle_cost(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = args.config.to_config();

    let temps = ingest::read_temperatures(&args.temps)?;
    let demand = ingest::read_demand(&args.demand)?;
    report_row_errors("temperature", &temps);
    report_row_errors("demand", &demand);

    let observations = ingest::join_observations(&temps.rows, &demand.rows);
    let artifact = pipeline::run_fit(&observations, &config)?;

    println!("{}", crate::report::format_fit_summary(&artifact, &config));

    crate::io::artifact::write_model_artifact(&args.out, &artifact)?;
    println!("Wrote model artifact to {}", args.out.display());
    Ok(())
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    let config = args.config.to_config();

    let artifact = crate::io::artifact::read_model_artifact(&args.models)?;
    let temps = ingest::read_temperatures(&args.temps)?;
    report_row_errors("temperature", &temps);

    let series = build_period_series(&temps.rows, &config);
    let impacts = pipeline::run_projection(artifact, &series, &config)?;

    println!("{}", crate::report::format_impact_tables(&impacts));

    if let Some(path) = &args.out_changes {
        crate::io::export::write_changes_csv(path, &impacts)?;
        println!("Wrote change table to {}", path.display());
    }
    if let Some(path) = &args.out_periods {
        crate::io::export::write_periods_csv(path, &impacts)?;
        println!("Wrote period table to {}", path.display());
    }
    Ok(())
}

fn handle_price_curve(args: PriceCurveArgs) -> Result<(), AppError> {
    let config = args.config.to_config();

    let days = match (&args.daily, &args.hourly) {
        (Some(path), None) => {
            let ingested = ingest::read_daily_price_demand(path)?;
            report_row_errors("daily price/demand", &ingested);
            ingested.rows
        }
        (None, Some(path)) => {
            let ingested = ingest::read_hourly_price_demand(path)?;
            report_row_errors("hourly price/demand", &ingested);
            ingested.rows
        }
        _ => {
            return Err(AppError::invalid_config(
                "exactly one of --daily or --hourly is required",
            ));
        }
    };

    let artifact = pipeline::run_price_curves(&days, &config)?;
    println!("{}", crate::report::format_curve_summary(&artifact));

    crate::io::curve::write_curve_artifact(&args.out, &artifact)?;
    println!("Wrote curve artifact to {}", args.out.display());
    Ok(())
}

fn handle_cost(args: CostArgs) -> Result<(), AppError> {
    let config = args.config.to_config();

    let models = crate::io::artifact::read_model_artifact(&args.models)?;
    let curves = crate::io::curve::read_curve_artifact(&args.curves)?;
    let temps = ingest::read_temperatures(&args.temps)?;
    report_row_errors("temperature", &temps);

    let series = build_period_series(&temps.rows, &config);
    let impacts = pipeline::run_projection(models, &series, &config)?;
    let report = pipeline::run_cost(&impacts, &curves, &config)?;

    println!("{}", crate::report::format_cost_report(&report));
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = args.config.to_config();
    let run = pipeline::run_demo(&config, args.seed)?;

    println!(
        "{}",
        crate::report::format_fit_summary(&run.model_artifact, &config)
    );
    println!("{}", crate::report::format_impact_tables(&run.impacts));
    println!(
        "{}",
        crate::report::format_curve_summary(&run.curve_artifact)
    );
    println!("{}", crate::report::format_cost_report(&run.cost));
    Ok(())
}

/// Slice the raw temperature table into per-region baseline and current series.
fn build_period_series(
    temps: &[TemperatureRow],
    config: &EngineConfig,
) -> Vec<PeriodTemperatureSeries> {
    let mut series = Vec::with_capacity(config.regions.len() * 2);
    for region in &config.regions {
        series.push(ingest::period_series(
            temps,
            region,
            Period::Baseline,
            config.baseline,
        ));
        series.push(ingest::period_series(
            temps,
            region,
            Period::Current,
            config.current,
        ));
    }
    series
}

/// Surface skipped CSV rows without failing the run.
fn report_row_errors<T>(label: &str, ingested: &Ingested<T>) {
    if ingested.row_errors.is_empty() {
        return;
    }
    eprintln!(
        "warning: skipped {} malformed {label} row(s)",
        ingested.row_errors.len()
    );
    for err in ingested.row_errors.iter().take(5) {
        eprintln!("  line {}: {}", err.line, err.message);
    }
    if ingested.row_errors.len() > 5 {
        eprintln!("  ... and {} more", ingested.row_errors.len() - 5);
    }
}

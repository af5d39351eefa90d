//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the
//! modeling/math code; flags map one-to-one onto `EngineConfig` fields.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{EngineConfig, YearSpan, DEFAULT_REGIONS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rti",
    version,
    about = "RTO temperature-demand modeling and climate-impact projection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit per-region demand(temperature) models and write the model artifact.
    Fit(FitArgs),
    /// Project a model artifact against baseline/current temperatures.
    Project(ProjectArgs),
    /// Fit price-demand curves from daily or hourly price/demand data.
    PriceCurve(PriceCurveArgs),
    /// Estimate the summer wholesale cost change.
    Cost(CostArgs),
    /// Run the full pipeline on seeded synthetic data (no input files).
    Demo(DemoArgs),
}

/// Configuration shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Regions to process.
    #[arg(long = "region", value_delimiter = ',', default_values_t = DEFAULT_REGIONS.map(String::from))]
    pub regions: Vec<String>,

    /// Training year for demand and price fits.
    #[arg(short = 'y', long, default_value_t = 2023)]
    pub year: i32,

    /// Polynomial degree of the temperature-demand fit.
    #[arg(short = 'd', long, default_value_t = 3)]
    pub degree: usize,

    /// First year of the baseline temperature period.
    #[arg(long, default_value_t = 1951)]
    pub baseline_start: i32,

    /// Last year of the baseline temperature period.
    #[arg(long, default_value_t = 1980)]
    pub baseline_end: i32,

    /// First year of the current temperature period.
    #[arg(long, default_value_t = 2015)]
    pub current_start: i32,

    /// Last year of the current temperature period.
    #[arg(long, default_value_t = 2024)]
    pub current_end: i32,

    /// Summer months (1-12) used for the price curve and cost estimate.
    #[arg(long, value_delimiter = ',', default_values_t = [6u32, 7, 8, 9])]
    pub summer_months: Vec<u32>,

    /// Minimum valid training days required for a stable fit.
    #[arg(long, default_value_t = 50)]
    pub min_days: usize,

    /// Segment count for the piecewise-linear price-demand fit.
    #[arg(long, default_value_t = 4)]
    pub segments: usize,

    /// Disable the built-in per-region demand plausibility bounds.
    #[arg(long)]
    pub no_demand_bounds: bool,
}

impl ConfigArgs {
    pub fn to_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            regions: self.regions.clone(),
            training_year: self.year,
            degree: self.degree,
            baseline: YearSpan::new(self.baseline_start, self.baseline_end),
            current: YearSpan::new(self.current_start, self.current_end),
            summer_months: self.summer_months.clone(),
            min_training_days: self.min_days,
            price_segments: self.segments,
            ..EngineConfig::default()
        };
        if self.no_demand_bounds {
            config.demand_bounds.clear();
        }
        config
    }
}

#[derive(Debug, Args)]
pub struct FitArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Daily temperature CSV (region,date,temperature_c).
    #[arg(long, value_name = "CSV")]
    pub temps: PathBuf,

    /// Daily demand CSV (region,date,demand_gw).
    #[arg(long, value_name = "CSV")]
    pub demand: PathBuf,

    /// Output model artifact JSON.
    #[arg(long, value_name = "JSON")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Model artifact JSON produced by `rti fit`.
    #[arg(long, value_name = "JSON")]
    pub models: PathBuf,

    /// Daily temperature CSV spanning both periods.
    #[arg(long, value_name = "CSV")]
    pub temps: PathBuf,

    /// Output CSV for the baseline/current change table.
    #[arg(long, value_name = "CSV")]
    pub out_changes: Option<PathBuf>,

    /// Output CSV for the raw per-period audit table.
    #[arg(long, value_name = "CSV")]
    pub out_periods: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PriceCurveArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Pre-reduced daily price/demand CSV
    /// (region,date,demand_gw,price_usd_per_mwh).
    #[arg(long, value_name = "CSV", conflicts_with = "hourly")]
    pub daily: Option<PathBuf>,

    /// Hourly price/demand CSV (region,date,hour,demand_mw,price_usd_per_mwh);
    /// days without 24 complete hours are dropped.
    #[arg(long, value_name = "CSV")]
    pub hourly: Option<PathBuf>,

    /// Output curve artifact JSON.
    #[arg(long, value_name = "JSON")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct CostArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Model artifact JSON produced by `rti fit`.
    #[arg(long, value_name = "JSON")]
    pub models: PathBuf,

    /// Curve artifact JSON produced by `rti price-curve`.
    #[arg(long, value_name = "JSON")]
    pub curves: PathBuf,

    /// Daily temperature CSV spanning both periods.
    #[arg(long, value_name = "CSV")]
    pub temps: PathBuf,
}

#[derive(Debug, Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Seed for synthetic series generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

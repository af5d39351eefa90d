//! Export impact tables to CSV.
//!
//! Two shapes, both meant to be easy to consume in spreadsheets or
//! downstream scripts:
//!
//! - the change table: one row per (region, bucket) with baseline mean,
//!   current mean, absolute change, and percent change
//! - the raw period table: one row per (region, period, bucket) with the
//!   mean projected demand, for auditing the change table

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::project::ImpactSet;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Write the baseline/current change table.
pub fn write_changes_csv(path: &Path, impacts: &ImpactSet) -> Result<(), AppError> {
    let mut file = create(path)?;

    writeln!(
        file,
        "region,bucket,baseline_gw,current_gw,change_gw,pct_change"
    )
    .map_err(write_err)?;

    for impact in &impacts.regions {
        for (m, row) in impact.monthly.iter().enumerate() {
            if let Some(row) = row {
                writeln!(
                    file,
                    "{},{},{:.4},{:.4},{:.4},{:.2}",
                    impact.region,
                    MONTH_NAMES[m],
                    row.baseline_mean_gw,
                    row.current_mean_gw,
                    row.absolute_change_gw,
                    row.percent_change,
                )
                .map_err(write_err)?;
            }
        }
        writeln!(
            file,
            "{},Annual,{:.4},{:.4},{:.4},{:.2}",
            impact.region,
            impact.annual.baseline_mean_gw,
            impact.annual.current_mean_gw,
            impact.annual.absolute_change_gw,
            impact.annual.percent_change,
        )
        .map_err(write_err)?;
    }

    Ok(())
}

/// Write the raw per-period monthly means (audit table).
pub fn write_periods_csv(path: &Path, impacts: &ImpactSet) -> Result<(), AppError> {
    let mut file = create(path)?;

    writeln!(file, "region,period,bucket,mean_gw,clipped_fraction").map_err(write_err)?;

    for impact in &impacts.regions {
        for aggregate in [&impact.baseline, &impact.current] {
            for (m, mean) in aggregate.monthly_mean_gw.iter().enumerate() {
                if let Some(mean) = mean {
                    writeln!(
                        file,
                        "{},{},{},{:.4},{:.4}",
                        aggregate.region,
                        aggregate.period,
                        MONTH_NAMES[m],
                        mean,
                        aggregate.clip.fraction(),
                    )
                    .map_err(write_err)?;
                }
            }
            writeln!(
                file,
                "{},{},Annual,{:.4},{:.4}",
                aggregate.region,
                aggregate.period,
                aggregate.annual_mean_gw,
                aggregate.clip.fraction(),
            )
            .map_err(write_err)?;
        }
    }

    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::io(format!("Failed to write export CSV: {e}"))
}

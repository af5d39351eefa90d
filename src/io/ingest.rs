//! CSV ingest and normalization.
//!
//! Turns collaborator-produced CSVs into clean in-memory series:
//!
//! - daily population-weighted temperatures: `region,date,temperature_c`
//! - daily demand: `region,date,demand_gw`
//! - hourly price/demand: `region,date,hour,demand_mw,price_usd_per_mwh`
//!
//! Design goals (shared across readers):
//! - row-level validation: skip bad rows, but report what happened
//! - deterministic behavior, no hidden unit guessing
//! - separation of concerns: no fitting logic here

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{
    DailyObservation, DailyPriceDemand, Period, PeriodTemperatureSeries, YearSpan,
};
use crate::error::AppError;

/// Hourly records per complete day; partial days bias demand weighting and
/// are dropped.
const HOURS_PER_DAY: usize = 24;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows plus skipped-row diagnostics.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureRow {
    pub region: String,
    pub date: NaiveDate,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemandRow {
    pub region: String,
    pub date: NaiveDate,
    pub demand_gw: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyPriceDemandRow {
    pub region: String,
    pub date: NaiveDate,
    pub hour: u32,
    pub demand_mw: f64,
    pub price_usd_per_mwh: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyPriceDemandRow {
    pub region: String,
    pub date: NaiveDate,
    pub demand_gw: f64,
    pub price_usd_per_mwh: f64,
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Ingested<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // +2: records start after the header line, and CSV lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(row) => rows.push(row),
            Err(e) => row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }
    Ok(Ingested { rows, row_errors })
}

/// Read a daily temperature CSV covering one or more regions.
pub fn read_temperatures(path: &Path) -> Result<Ingested<TemperatureRow>, AppError> {
    read_csv(path)
}

/// Read a daily demand CSV covering one or more regions.
pub fn read_demand(path: &Path) -> Result<Ingested<DemandRow>, AppError> {
    read_csv(path)
}

/// Read a pre-reduced daily price/demand CSV.
pub fn read_daily_price_demand(path: &Path) -> Result<Ingested<DailyPriceDemand>, AppError> {
    let ingested = read_csv::<DailyPriceDemandRow>(path)?;
    Ok(map_ingested(ingested, |r| DailyPriceDemand {
        region: r.region,
        date: r.date,
        demand_gw: r.demand_gw,
        price_usd_per_mwh: r.price_usd_per_mwh,
    }))
}

/// Read an hourly price/demand CSV and reduce it to daily values.
///
/// Days with fewer than 24 hourly records are excluded before reduction:
/// a partial day would bias the demand-weighted price average.
pub fn read_hourly_price_demand(path: &Path) -> Result<Ingested<DailyPriceDemand>, AppError> {
    let ingested = read_csv::<HourlyPriceDemandRow>(path)?;
    let reduced = reduce_hourly(&ingested.rows);
    Ok(Ingested {
        rows: reduced,
        row_errors: ingested.row_errors,
    })
}

fn map_ingested<A, B>(input: Ingested<A>, f: impl Fn(A) -> B) -> Ingested<B> {
    Ingested {
        rows: input.rows.into_iter().map(f).collect(),
        row_errors: input.row_errors,
    }
}

/// Reduce hourly price/demand records to one demand-weighted value per day.
pub fn reduce_hourly(rows: &[HourlyPriceDemandRow]) -> Vec<DailyPriceDemand> {
    let mut days: BTreeMap<(String, NaiveDate), Vec<&HourlyPriceDemandRow>> = BTreeMap::new();
    for row in rows {
        if row.demand_mw.is_finite() && row.price_usd_per_mwh.is_finite() {
            days.entry((row.region.clone(), row.date)).or_default().push(row);
        }
    }

    let mut out = Vec::new();
    for ((region, date), hours) in days {
        if hours.len() != HOURS_PER_DAY {
            continue;
        }
        let total_demand_mw: f64 = hours.iter().map(|h| h.demand_mw).sum();
        if total_demand_mw <= 0.0 {
            continue;
        }
        let weighted_price: f64 = hours
            .iter()
            .map(|h| h.price_usd_per_mwh * h.demand_mw)
            .sum::<f64>()
            / total_demand_mw;
        out.push(DailyPriceDemand {
            region,
            date,
            // Mean daily demand, MW -> GW.
            demand_gw: total_demand_mw / HOURS_PER_DAY as f64 / 1e3,
            price_usd_per_mwh: weighted_price,
        });
    }
    out
}

/// Join temperature and demand rows into training observations.
///
/// Only (region, date) pairs present in both inputs survive; missing values
/// are dropped, never imputed.
pub fn join_observations(
    temperatures: &[TemperatureRow],
    demand: &[DemandRow],
) -> Vec<DailyObservation> {
    let mut demand_by_key: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
    for row in demand {
        demand_by_key.insert((row.region.as_str(), row.date), row.demand_gw);
    }

    let mut out = Vec::new();
    for t in temperatures {
        if let Some(&demand_gw) = demand_by_key.get(&(t.region.as_str(), t.date)) {
            out.push(DailyObservation::new(
                t.region.clone(),
                t.date,
                t.temperature_c,
                demand_gw,
            ));
        }
    }
    out
}

/// Slice a temperature table into one region's period series.
pub fn period_series(
    temperatures: &[TemperatureRow],
    region: &str,
    period: Period,
    span: YearSpan,
) -> PeriodTemperatureSeries {
    use chrono::Datelike;
    let mut days: Vec<(NaiveDate, f64)> = temperatures
        .iter()
        .filter(|t| t.region == region && span.contains(t.date.year()))
        .map(|t| (t.date, t.temperature_c))
        .collect();
    days.sort_by_key(|(d, _)| *d);
    PeriodTemperatureSeries {
        region: region.to_string(),
        period,
        days,
    }
}

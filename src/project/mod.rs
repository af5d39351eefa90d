//! Impact projection: evaluate fitted models against multi-decade
//! temperature series and aggregate the deltas.
//!
//! Every temperature is clipped to the model's valid domain before the
//! polynomial is evaluated. That keeps high-degree fits from blowing up
//! outside the training range; the cost is a flat projection beyond the
//! observed extremes, which is why the clipped fraction is tracked and
//! reported per (region, period).
//!
//! Aggregation follows calendar position, not date alignment: daily
//! projections are averaged within each (year, month), those monthly means
//! are averaged across the period's years, and the annual figure is the mean
//! of the twelve monthly means.

use std::collections::BTreeMap;

use chrono::Datelike;
use rayon::prelude::*;

use crate::domain::{
    is_calendar_weekday, EngineConfig, FittedModel, Period, PeriodTemperatureSeries, RegionFailure,
};
use crate::error::AppError;
use crate::fit::ModelStore;
use crate::math::eval_polynomial;

/// How often projection inputs fell outside the model's valid domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipDiagnostics {
    pub n_total: usize,
    pub n_below: usize,
    pub n_above: usize,
}

impl ClipDiagnostics {
    /// Fraction of projected days whose temperature was clipped.
    pub fn fraction(&self) -> f64 {
        if self.n_total == 0 {
            return 0.0;
        }
        (self.n_below + self.n_above) as f64 / self.n_total as f64
    }
}

/// Mean projected demand per calendar bucket for one (region, period).
#[derive(Debug, Clone)]
pub struct PeriodAggregate {
    pub region: String,
    pub period: Period,
    /// Mean projected demand per month (index 0 = January). `None` when the
    /// period series has no days in that month.
    pub monthly_mean_gw: [Option<f64>; 12],
    /// Mean of the available monthly means.
    pub annual_mean_gw: f64,
    pub clip: ClipDiagnostics,
}

/// Baseline/current comparison for one bucket.
#[derive(Debug, Clone, Copy)]
pub struct ChangeRow {
    pub baseline_mean_gw: f64,
    pub current_mean_gw: f64,
    pub absolute_change_gw: f64,
    pub percent_change: f64,
}

impl ChangeRow {
    fn new(baseline: f64, current: f64) -> Self {
        let absolute = current - baseline;
        Self {
            baseline_mean_gw: baseline,
            current_mean_gw: current,
            absolute_change_gw: absolute,
            // IEEE semantics on a zero baseline: +/-inf (or NaN for 0/0),
            // never an arithmetic fault.
            percent_change: absolute / baseline * 100.0,
        }
    }
}

/// Full impact result for one region.
#[derive(Debug, Clone)]
pub struct RegionImpact {
    pub region: String,
    pub monthly: [Option<ChangeRow>; 12],
    pub annual: ChangeRow,
    pub baseline: PeriodAggregate,
    pub current: PeriodAggregate,
}

/// Impact results for every region that could be projected, plus recorded
/// reasons for every region that could not.
#[derive(Debug, Clone)]
pub struct ImpactSet {
    pub training_year: i32,
    pub degree: usize,
    pub regions: Vec<RegionImpact>,
    pub failures: Vec<RegionFailure>,
}

/// Evaluate a model at one temperature, clipping to the valid domain first.
///
/// Returns the projected demand and whether clipping occurred.
pub fn project_demand(model: &FittedModel, temp_c: f64, is_weekday: bool) -> (f64, bool) {
    let clipped = model.valid_domain.clip(temp_c);
    let demand = eval_polynomial(&model.coefficients, clipped)
        + if is_weekday { model.weekday_coeff } else { 0.0 };
    (demand, clipped != temp_c)
}

/// Project one period series through a model and aggregate by calendar month.
pub fn project_period(
    model: &FittedModel,
    series: &PeriodTemperatureSeries,
) -> Result<PeriodAggregate, AppError> {
    // Per-(year, month) accumulation; BTreeMap keeps iteration deterministic.
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    let mut clip = ClipDiagnostics::default();

    for &(date, temp_c) in &series.days {
        if !temp_c.is_finite() {
            continue;
        }
        clip.n_total += 1;
        if temp_c < model.valid_domain.min_temp_c {
            clip.n_below += 1;
        } else if temp_c > model.valid_domain.max_temp_c {
            clip.n_above += 1;
        }

        let (demand, _) = project_demand(model, temp_c, is_calendar_weekday(date));
        let entry = buckets.entry((date.year(), date.month())).or_insert((0.0, 0));
        entry.0 += demand;
        entry.1 += 1;
    }

    if clip.n_total == 0 {
        return Err(AppError::empty_series(&series.region, series.period));
    }

    // Month mean = mean across years of the per-(year, month) means.
    let mut monthly_mean_gw: [Option<f64>; 12] = [None; 12];
    for month in 1..=12u32 {
        let year_means: Vec<f64> = buckets
            .iter()
            .filter(|((_, m), _)| *m == month)
            .map(|(_, (sum, count))| sum / *count as f64)
            .collect();
        if !year_means.is_empty() {
            monthly_mean_gw[(month - 1) as usize] =
                Some(year_means.iter().sum::<f64>() / year_means.len() as f64);
        }
    }

    let available: Vec<f64> = monthly_mean_gw.iter().flatten().copied().collect();
    let annual_mean_gw = available.iter().sum::<f64>() / available.len() as f64;

    Ok(PeriodAggregate {
        region: series.region.clone(),
        period: series.period,
        monthly_mean_gw,
        annual_mean_gw,
        clip,
    })
}

/// Build the baseline/current comparison for one region.
pub fn compare_periods(baseline: PeriodAggregate, current: PeriodAggregate) -> RegionImpact {
    let mut monthly: [Option<ChangeRow>; 12] = [None; 12];
    for m in 0..12 {
        if let (Some(b), Some(c)) = (baseline.monthly_mean_gw[m], current.monthly_mean_gw[m]) {
            monthly[m] = Some(ChangeRow::new(b, c));
        }
    }
    let annual = ChangeRow::new(baseline.annual_mean_gw, current.annual_mean_gw);

    RegionImpact {
        region: baseline.region.clone(),
        monthly,
        annual,
        baseline,
        current,
    }
}

/// Project every configured region against its baseline and current series.
///
/// Per-region problems (missing model, empty series) are recorded and the
/// run continues; only structural misconfiguration aborts.
pub fn compute_impacts(
    store: &ModelStore,
    series: &[PeriodTemperatureSeries],
    config: &EngineConfig,
) -> Result<ImpactSet, AppError> {
    config.validate()?;

    let results: Vec<(String, Result<RegionImpact, AppError>)> = config
        .regions
        .par_iter()
        .map(|region| (region.clone(), project_region(region, store, series, config)))
        .collect();

    let mut regions = Vec::new();
    let mut failures = Vec::new();
    for (region, result) in results {
        match result {
            Ok(impact) => regions.push(impact),
            Err(e) => failures.push(RegionFailure {
                region,
                reason: e.to_string(),
            }),
        }
    }

    Ok(ImpactSet {
        training_year: config.training_year,
        degree: config.degree,
        regions,
        failures,
    })
}

fn project_region(
    region: &str,
    store: &ModelStore,
    series: &[PeriodTemperatureSeries],
    config: &EngineConfig,
) -> Result<RegionImpact, AppError> {
    let model = store.get(region, config.training_year, config.degree)?;

    let baseline_series = find_series(series, region, Period::Baseline)?;
    let current_series = find_series(series, region, Period::Current)?;

    let baseline = project_period(model, baseline_series)?;
    let current = project_period(model, current_series)?;
    Ok(compare_periods(baseline, current))
}

fn find_series<'a>(
    series: &'a [PeriodTemperatureSeries],
    region: &str,
    period: Period,
) -> Result<&'a PeriodTemperatureSeries, AppError> {
    series
        .iter()
        .find(|s| s.region == region && s.period == period)
        .ok_or_else(|| AppError::empty_series(region, period))
}

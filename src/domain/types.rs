//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and projection
//! - exported to JSON/CSV artifacts
//! - reloaded later for projection or cost analysis without refitting

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The seven RTO/ISO regions the analysis covers by default.
pub const DEFAULT_REGIONS: [&str; 7] = [
    "CAISO", "ERCOT", "ISONE", "MISO", "NYISO", "PJM", "SPP",
];

/// Which multi-decade temperature span a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Baseline,
    Current,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Baseline => write!(f, "baseline"),
            Period::Current => write!(f, "current"),
        }
    }
}

/// Inclusive year span, e.g. 1951-1980.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

impl YearSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

impl std::fmt::Display for YearSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One daily training observation for a region.
#[derive(Debug, Clone)]
pub struct DailyObservation {
    pub region: String,
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub demand_gw: f64,
    pub is_weekday: bool,
}

impl DailyObservation {
    pub fn new(region: impl Into<String>, date: NaiveDate, temperature_c: f64, demand_gw: f64) -> Self {
        Self {
            region: region.into(),
            date,
            temperature_c,
            demand_gw,
            is_weekday: is_calendar_weekday(date),
        }
    }
}

/// Mon-Fri. No holiday calendar; weekends alone define the indicator.
pub fn is_calendar_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The temperature span a fitted model is valid over.
///
/// Always the observed extremes of the model's own training data. Evaluating
/// outside this range is extrapolation; inputs are clipped to it first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub min_temp_c: f64,
    pub max_temp_c: f64,
}

impl TempRange {
    /// Clip a temperature to the valid range. Idempotent.
    pub fn clip(&self, temp_c: f64) -> f64 {
        temp_c.clamp(self.min_temp_c, self.max_temp_c)
    }

    pub fn contains(&self, temp_c: f64) -> bool {
        temp_c >= self.min_temp_c && temp_c <= self.max_temp_c
    }
}

/// Training-set diagnostics. Reported, never used to auto-reject a fit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitStatistics {
    pub rmse_gw: f64,
    pub r2: f64,
    pub n_days: usize,
}

/// A fitted polynomial demand(temperature) model for one region.
///
/// `demand(T) = c0 + c1*T + ... + cD*T^D + weekday_coeff * is_weekday`
///
/// Immutable once fit (write-once, read-many); identified by
/// `(region, training_year, degree)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub region: String,
    pub training_year: i32,
    pub degree: usize,
    /// Polynomial coefficients, ascending power; length is exactly `degree + 1`.
    pub coefficients: Vec<f64>,
    pub weekday_coeff: f64,
    pub stats: FitStatistics,
    pub valid_domain: TempRange,
    pub avg_demand_gw: f64,
    pub max_demand_gw: f64,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
}

impl FittedModel {
    pub fn key(&self) -> ModelKey {
        ModelKey {
            region: self.region.clone(),
            year: self.training_year,
            degree: self.degree,
        }
    }
}

/// Identity of a fitted model inside an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub region: String,
    pub year: i32,
    pub degree: usize,
}

/// A multi-year daily temperature series for one region and period.
#[derive(Debug, Clone)]
pub struct PeriodTemperatureSeries {
    pub region: String,
    pub period: Period,
    /// Ordered by date; dates are not aligned across periods.
    pub days: Vec<(NaiveDate, f64)>,
}

/// One daily demand-weighted price/demand reduction for price-curve fitting.
#[derive(Debug, Clone)]
pub struct DailyPriceDemand {
    pub region: String,
    pub date: NaiveDate,
    /// Mean demand over the day, GW.
    pub demand_gw: f64,
    /// Demand-weighted average day-ahead price, $/MWh.
    pub price_usd_per_mwh: f64,
}

/// A monotone piecewise-linear price = f(demand) relationship.
///
/// Knots are ordered by demand and span exactly the observed demand range of
/// the fit; evaluation outside the knot range clips to the nearest knot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDemandCurve {
    pub region: String,
    pub training_year: i32,
    pub n_segments: usize,
    /// `(demand_gw, price_usd_per_mwh)` pairs, monotone in demand.
    pub knots: Vec<(f64, f64)>,
    /// False when the fitted slopes violate non-decreasing price in demand.
    /// Reported as a warning downstream, never fatal.
    pub monotone: bool,
}

/// Optional per-region demand plausibility bounds applied before fitting.
///
/// Mirrors the source data's known artifacts (e.g. PJM partial-footprint days
/// below 40 GW, ERCOT telemetry spikes above 80 GW).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DemandBounds {
    pub min_gw: Option<f64>,
    pub max_gw: Option<f64>,
}

impl DemandBounds {
    pub fn accepts(&self, demand_gw: f64) -> bool {
        if let Some(min) = self.min_gw {
            if demand_gw < min {
                return false;
            }
        }
        if let Some(max) = self.max_gw {
            if demand_gw > max {
                return false;
            }
        }
        true
    }
}

/// A full run's configuration, threaded explicitly through every call.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub regions: Vec<String>,
    pub training_year: i32,
    pub degree: usize,
    pub baseline: YearSpan,
    pub current: YearSpan,
    /// Calendar months (1-12) treated as the high-demand summer season.
    pub summer_months: Vec<u32>,
    /// Minimum valid training days for a stable fit.
    pub min_training_days: usize,
    /// Segment count for the piecewise-linear price-demand fit.
    pub price_segments: usize,
    pub demand_bounds: BTreeMap<String, DemandBounds>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut demand_bounds = BTreeMap::new();
        demand_bounds.insert(
            "PJM".to_string(),
            DemandBounds {
                min_gw: Some(40.0),
                max_gw: None,
            },
        );
        demand_bounds.insert(
            "ERCOT".to_string(),
            DemandBounds {
                min_gw: None,
                max_gw: Some(80.0),
            },
        );

        Self {
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            training_year: 2023,
            degree: 3,
            baseline: YearSpan::new(1951, 1980),
            current: YearSpan::new(2015, 2024),
            summer_months: vec![6, 7, 8, 9],
            min_training_days: 50,
            price_segments: 4,
            demand_bounds,
        }
    }
}

impl EngineConfig {
    /// Validate structural settings. Any failure here is fatal and happens
    /// before a single region is fit.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.regions.is_empty() {
            return Err(AppError::invalid_config("Region list is empty."));
        }
        if self.degree < 1 {
            return Err(AppError::invalid_config(format!(
                "Polynomial degree must be >= 1 (got {}).",
                self.degree
            )));
        }
        if self.baseline.start > self.baseline.end {
            return Err(AppError::invalid_config(format!(
                "Invalid baseline period {}.",
                self.baseline
            )));
        }
        if self.current.start > self.current.end {
            return Err(AppError::invalid_config(format!(
                "Invalid current period {}.",
                self.current
            )));
        }
        if self.summer_months.is_empty() || self.summer_months.iter().any(|m| !(1..=12).contains(m)) {
            return Err(AppError::invalid_config(
                "Summer months must be a non-empty subset of 1-12.",
            ));
        }
        if self.min_training_days <= self.degree + 2 {
            return Err(AppError::invalid_config(format!(
                "Minimum training days ({}) must exceed the parameter count for degree {}.",
                self.min_training_days, self.degree
            )));
        }
        if self.price_segments < 1 {
            return Err(AppError::invalid_config("Price curve needs at least 1 segment."));
        }
        Ok(())
    }

    pub fn bounds_for(&self, region: &str) -> DemandBounds {
        self.demand_bounds.get(region).copied().unwrap_or_default()
    }

    pub fn is_summer_month(&self, month: u32) -> bool {
        self.summer_months.contains(&month)
    }
}

/// File-level metadata for a model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub max_degree: usize,
    pub n_regions_total: usize,
    pub n_regions_successful: usize,
    pub n_regions_failed: usize,
}

/// A recorded per-region failure reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionFailure {
    pub region: String,
    pub reason: String,
}

/// The persisted model artifact for one training year.
///
/// One record per (region, degree). Consumers must tolerate partial failure:
/// some regions may be missing, with their reasons listed in `failures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub training_year: i32,
    pub metadata: ArtifactMetadata,
    pub fits: Vec<FittedModel>,
    pub failures: Vec<RegionFailure>,
}

/// The persisted price-curve artifact for one training year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveArtifact {
    pub training_year: i32,
    pub n_segments: usize,
    pub curves: Vec<PriceDemandCurve>,
    pub failures: Vec<RegionFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_is_idempotent_and_two_sided() {
        let range = TempRange {
            min_temp_c: 0.7,
            max_temp_c: 33.7,
        };
        assert_eq!(range.clip(-5.0), 0.7);
        assert_eq!(range.clip(40.0), 33.7);
        assert_eq!(range.clip(20.0), 20.0);
        for t in [-50.0, 0.7, 12.3, 33.7, 99.0] {
            assert_eq!(range.clip(range.clip(t)), range.clip(t));
        }
    }

    #[test]
    fn weekday_indicator_is_pure_calendar() {
        // 2023-07-03 is a Monday (a US holiday, still a weekday here).
        assert!(is_calendar_weekday(NaiveDate::from_ymd_opt(2023, 7, 3).unwrap()));
        // 2023-07-08 is a Saturday.
        assert!(!is_calendar_weekday(NaiveDate::from_ymd_opt(2023, 7, 8).unwrap()));
    }

    #[test]
    fn config_validation_rejects_structural_errors() {
        let mut config = EngineConfig::default();
        config.degree = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.regions.clear();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.summer_months = vec![13];
        assert!(config.validate().is_err());

        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn demand_bounds_filter_default_regions() {
        let config = EngineConfig::default();
        assert!(!config.bounds_for("PJM").accepts(30.0));
        assert!(config.bounds_for("PJM").accepts(80.0));
        assert!(!config.bounds_for("ERCOT").accepts(90.0));
        assert!(config.bounds_for("CAISO").accepts(1000.0));
    }
}

//! Wholesale cost-change estimation.
//!
//! Composes the projected demand deltas with the price-demand curve:
//! for each region and configured summer month,
//!
//! `cost = price(demand) * demand_MW * hours_in_month`
//!
//! evaluated at the baseline and current mean demand, then aggregated into a
//! total dollar change. Only the configured summer months enter the estimate.
//!
//! Results are keyed by the upstream (training_year, degree) choice; rerun
//! the estimator per model choice to compare them.

use crate::domain::{EngineConfig, PriceDemandCurve, RegionFailure};
use crate::error::AppError;
use crate::project::ImpactSet;

/// Hours per calendar month (non-leap), index 0 = January.
const HOURS_IN_MONTH: [f64; 12] = [
    744.0, 672.0, 744.0, 720.0, 744.0, 720.0, 744.0, 744.0, 720.0, 744.0, 720.0, 744.0,
];

/// Summer cost comparison for one region.
#[derive(Debug, Clone)]
pub struct RegionCost {
    pub region: String,
    pub baseline_cost_usd: f64,
    pub current_cost_usd: f64,
    pub change_usd: f64,
    pub percent_change: f64,
    /// Price evaluations that fell outside the fitted demand range.
    pub n_extrapolated_prices: usize,
    /// Carried from the curve fit; a false value means the price relationship
    /// violated monotonicity and the estimate should be read with care.
    pub curve_monotone: bool,
}

/// The full cost-change estimate for one (training_year, degree) choice.
#[derive(Debug, Clone)]
pub struct CostReport {
    pub training_year: i32,
    pub degree: usize,
    pub summer_months: Vec<u32>,
    pub regions: Vec<RegionCost>,
    pub failures: Vec<RegionFailure>,
    pub total_baseline_usd: f64,
    pub total_current_usd: f64,
    pub total_change_usd: f64,
}

/// Estimate the summer wholesale cost change across all projected regions.
///
/// Regions without a matching price curve are recorded as failures; the
/// estimate completes for the rest.
pub fn estimate_cost_change(
    impacts: &ImpactSet,
    curves: &[PriceDemandCurve],
    config: &EngineConfig,
) -> Result<CostReport, AppError> {
    config.validate()?;

    let mut regions = Vec::new();
    let mut failures: Vec<RegionFailure> = impacts.failures.clone();

    for impact in &impacts.regions {
        let curve = curves
            .iter()
            .find(|c| c.region == impact.region && c.training_year == config.training_year);
        let Some(curve) = curve else {
            failures.push(RegionFailure {
                region: impact.region.clone(),
                reason: format!(
                    "no price-demand curve for training year {}",
                    config.training_year
                ),
            });
            continue;
        };

        let mut baseline_cost = 0.0;
        let mut current_cost = 0.0;
        let mut n_extrapolated = 0usize;

        for &month in &config.summer_months {
            let Some(row) = impact.monthly[(month - 1) as usize] else {
                continue;
            };
            let hours = HOURS_IN_MONTH[(month - 1) as usize];

            let b = curve.price_at(row.baseline_mean_gw);
            let c = curve.price_at(row.current_mean_gw);
            n_extrapolated += usize::from(b.extrapolated) + usize::from(c.extrapolated);

            // GW -> MW, then $/MWh * MW * h.
            baseline_cost += b.price_usd_per_mwh * row.baseline_mean_gw * 1e3 * hours;
            current_cost += c.price_usd_per_mwh * row.current_mean_gw * 1e3 * hours;
        }

        let change = current_cost - baseline_cost;
        regions.push(RegionCost {
            region: impact.region.clone(),
            baseline_cost_usd: baseline_cost,
            current_cost_usd: current_cost,
            change_usd: change,
            percent_change: change / baseline_cost * 100.0,
            n_extrapolated_prices: n_extrapolated,
            curve_monotone: curve.monotone,
        });
    }

    let total_baseline_usd = regions.iter().map(|r| r.baseline_cost_usd).sum();
    let total_current_usd = regions.iter().map(|r| r.current_cost_usd).sum();

    Ok(CostReport {
        training_year: impacts.training_year,
        degree: impacts.degree,
        summer_months: config.summer_months.clone(),
        regions,
        failures,
        total_baseline_usd,
        total_current_usd,
        total_change_usd: total_current_usd - total_baseline_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ChangeRow, ClipDiagnostics, ImpactSet, PeriodAggregate, RegionImpact};
    use crate::domain::Period;

    fn change_row(baseline: f64, current: f64) -> ChangeRow {
        ChangeRow {
            baseline_mean_gw: baseline,
            current_mean_gw: current,
            absolute_change_gw: current - baseline,
            percent_change: (current - baseline) / baseline * 100.0,
        }
    }

    fn aggregate(region: &str, period: Period, mean: f64) -> PeriodAggregate {
        PeriodAggregate {
            region: region.to_string(),
            period,
            monthly_mean_gw: [Some(mean); 12],
            annual_mean_gw: mean,
            clip: ClipDiagnostics::default(),
        }
    }

    fn impact(region: &str, baseline: f64, current: f64) -> RegionImpact {
        RegionImpact {
            region: region.to_string(),
            monthly: [Some(change_row(baseline, current)); 12],
            annual: change_row(baseline, current),
            baseline: aggregate(region, Period::Baseline, baseline),
            current: aggregate(region, Period::Current, current),
        }
    }

    fn flat_curve(region: &str, price: f64) -> PriceDemandCurve {
        PriceDemandCurve {
            region: region.to_string(),
            training_year: 2023,
            n_segments: 1,
            knots: vec![(10.0, price), (100.0, price)],
            monotone: true,
        }
    }

    fn impact_set(regions: Vec<RegionImpact>) -> ImpactSet {
        ImpactSet {
            training_year: 2023,
            degree: 3,
            regions,
            failures: vec![],
        }
    }

    #[test]
    fn flat_price_cost_scales_with_demand_and_hours() {
        // 40 GW baseline, 50 GW current, $30/MWh flat: cost change is
        // 30 * 10e3 MW * summer hours.
        let impacts = impact_set(vec![impact("ERCOT", 40.0, 50.0)]);
        let curves = vec![flat_curve("ERCOT", 30.0)];
        let config = EngineConfig::default();

        let report = estimate_cost_change(&impacts, &curves, &config).unwrap();
        assert_eq!(report.regions.len(), 1);

        // June-September: 720 + 744 + 744 + 720 hours.
        let summer_hours = 720.0 + 744.0 + 744.0 + 720.0;
        let expected_change = 30.0 * 10.0e3 * summer_hours;
        assert!((report.regions[0].change_usd - expected_change).abs() < 1e-3);
        assert!((report.total_change_usd - expected_change).abs() < 1e-3);
    }

    #[test]
    fn missing_curve_is_recorded_not_fatal() {
        let impacts = impact_set(vec![impact("ERCOT", 40.0, 50.0), impact("CAISO", 30.0, 35.0)]);
        let curves = vec![flat_curve("ERCOT", 30.0)];

        let report = estimate_cost_change(&impacts, &curves, &EngineConfig::default()).unwrap();
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].region, "CAISO");
    }

    #[test]
    fn extrapolated_price_lookups_are_counted() {
        // Demands above the fitted range: both period lookups extrapolate.
        let impacts = impact_set(vec![impact("ERCOT", 200.0, 250.0)]);
        let curves = vec![flat_curve("ERCOT", 30.0)];

        let report = estimate_cost_change(&impacts, &curves, &EngineConfig::default()).unwrap();
        // 2 lookups per summer month, all outside [10, 100] GW.
        assert_eq!(report.regions[0].n_extrapolated_prices, 8);
    }

    #[test]
    fn non_monotone_curve_flag_is_carried_through() {
        let impacts = impact_set(vec![impact("ERCOT", 40.0, 50.0)]);
        let mut curve = flat_curve("ERCOT", 30.0);
        curve.monotone = false;
        let report = estimate_cost_change(&impacts, &[curve], &EngineConfig::default()).unwrap();
        assert!(!report.regions[0].curve_monotone);
    }
}

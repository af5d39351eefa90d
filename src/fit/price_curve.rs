//! Monotone piecewise-linear price = f(demand) fitting.
//!
//! Fit over summer (high-demand) days of the training year only, where the
//! price-demand coupling is steepest and the curve is economically
//! meaningful. The curve is continuous piecewise-linear:
//!
//! - breakpoints at demand quantiles (deterministic placement)
//! - hinge-basis OLS for the segment slopes (linear in the coefficients, so
//!   the shared SVD solver applies)
//! - knots stored as `(demand, price)` at each breakpoint
//!
//! Monotonicity (price non-decreasing in demand) is checked on the fitted
//! slopes. A violation is surfaced as a flag on the curve, not an error.
//!
//! Evaluation interpolates linearly between knots; demand outside the knot
//! range is clipped to the nearest knot and the evaluation is marked
//! extrapolated, the same discipline the projector applies to temperature.

use chrono::Datelike;
use nalgebra::{DMatrix, DVector};

use crate::domain::{DailyPriceDemand, EngineConfig, PriceDemandCurve};
use crate::error::{AppError, ErrorKind};
use crate::math::solve_least_squares;

/// Slopes this close to zero (or above) still count as non-decreasing.
const MONOTONE_EPS: f64 = 1e-9;

/// One curve evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CurveEval {
    pub price_usd_per_mwh: f64,
    /// True when the demand fell outside the fitted range and was clipped.
    pub extrapolated: bool,
}

/// Fit the price-demand curve for one region.
pub fn fit_price_curve(
    region: &str,
    days: &[DailyPriceDemand],
    config: &EngineConfig,
) -> Result<PriceDemandCurve, AppError> {
    let used: Vec<&DailyPriceDemand> = days
        .iter()
        .filter(|d| {
            d.region == region
                && d.date.year() == config.training_year
                && config.is_summer_month(d.date.month())
                && d.demand_gw.is_finite()
                && d.demand_gw > 0.0
                && d.price_usd_per_mwh.is_finite()
        })
        .collect();

    let n_segments = config.price_segments;
    let min_points = n_segments + 2;
    if used.len() < min_points {
        return Err(AppError::insufficient_data(region, used.len(), min_points));
    }

    let mut demands: Vec<f64> = used.iter().map(|d| d.demand_gw).collect();
    demands.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let breakpoints = quantile_breakpoints(&demands, n_segments)?;
    let k = breakpoints.len() - 1; // usable segment count after dedup

    // Hinge design: [1, (d-b0)+, (d-b1)+, ..., (d-b_{k-1})+]
    let n = used.len();
    let p = k + 1;
    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    for (i, day) in used.iter().enumerate() {
        x[(i, 0)] = 1.0;
        for j in 0..k {
            x[(i, j + 1)] = (day.demand_gw - breakpoints[j]).max(0.0);
        }
        y[i] = day.price_usd_per_mwh;
    }

    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        AppError::new(
            ErrorKind::Numeric,
            format!("{region}: price-demand hinge regression is too ill-conditioned to solve"),
        )
    })?;

    // Segment slope j is the running sum of hinge coefficients 1..=j+1.
    let mut monotone = true;
    let mut slope = 0.0;
    for j in 0..k {
        slope += beta[j + 1];
        if slope < -MONOTONE_EPS {
            monotone = false;
        }
    }

    let knots: Vec<(f64, f64)> = breakpoints
        .iter()
        .map(|&b| (b, eval_hinge(&beta, &breakpoints, b)))
        .collect();

    Ok(PriceDemandCurve {
        region: region.to_string(),
        training_year: config.training_year,
        n_segments: k,
        knots,
        monotone,
    })
}

fn eval_hinge(beta: &DVector<f64>, breakpoints: &[f64], demand: f64) -> f64 {
    let k = breakpoints.len() - 1;
    let mut out = beta[0];
    for j in 0..k {
        out += beta[j + 1] * (demand - breakpoints[j]).max(0.0);
    }
    out
}

/// Breakpoints at demand quantiles, endpoints at the observed extremes.
///
/// Duplicate quantile values (heavy ties in the demand distribution) are
/// collapsed, shrinking the effective segment count rather than producing a
/// degenerate zero-width segment.
fn quantile_breakpoints(sorted_demands: &[f64], n_segments: usize) -> Result<Vec<f64>, AppError> {
    let n = sorted_demands.len();
    let mut out = Vec::with_capacity(n_segments + 1);
    for s in 0..=n_segments {
        let q = s as f64 / n_segments as f64;
        let idx = ((n - 1) as f64 * q).round() as usize;
        let b = sorted_demands[idx.min(n - 1)];
        if out.last().map_or(true, |&last: &f64| b > last) {
            out.push(b);
        }
    }
    if out.len() < 2 {
        return Err(AppError::new(
            ErrorKind::Numeric,
            "Demand range is degenerate; cannot place piecewise-linear breakpoints.",
        ));
    }
    Ok(out)
}

impl PriceDemandCurve {
    /// Observed demand range the curve is valid over.
    pub fn demand_range(&self) -> (f64, f64) {
        // Knots are non-empty by construction.
        let first = self.knots.first().map(|k| k.0).unwrap_or(0.0);
        let last = self.knots.last().map(|k| k.0).unwrap_or(0.0);
        (first, last)
    }

    /// Evaluate the curve at a demand level.
    ///
    /// Exact at knots; linear in between; clipped (and flagged) outside.
    pub fn price_at(&self, demand_gw: f64) -> CurveEval {
        let (lo, hi) = self.demand_range();

        if demand_gw <= lo {
            return CurveEval {
                price_usd_per_mwh: self.knots[0].1,
                extrapolated: demand_gw < lo,
            };
        }
        if demand_gw >= hi {
            let last = self.knots[self.knots.len() - 1];
            return CurveEval {
                price_usd_per_mwh: last.1,
                extrapolated: demand_gw > hi,
            };
        }

        for window in self.knots.windows(2) {
            let (d0, p0) = window[0];
            let (d1, p1) = window[1];
            if demand_gw == d0 {
                return CurveEval {
                    price_usd_per_mwh: p0,
                    extrapolated: false,
                };
            }
            if demand_gw < d1 {
                let t = (demand_gw - d0) / (d1 - d0);
                return CurveEval {
                    price_usd_per_mwh: p0 + t * (p1 - p0),
                    extrapolated: false,
                };
            }
        }

        // Unreachable: demand_gw < hi guarantees a containing segment.
        CurveEval {
            price_usd_per_mwh: self.knots[self.knots.len() - 1].1,
            extrapolated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summer_days(region: &str, year: i32, f: impl Fn(f64) -> f64) -> Vec<DailyPriceDemand> {
        // ~120 summer days sweeping demand 30..70 GW.
        let start = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
        (0..120)
            .map(|i| {
                let demand = 30.0 + 40.0 * (i as f64 / 119.0);
                DailyPriceDemand {
                    region: region.to_string(),
                    date: start + chrono::Duration::days(i as i64),
                    demand_gw: demand,
                    price_usd_per_mwh: f(demand),
                }
            })
            .collect()
    }

    fn config(year: i32) -> EngineConfig {
        EngineConfig {
            training_year: year,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn recovers_linear_price_relationship() {
        let days = summer_days("ERCOT", 2023, |d| 10.0 + 1.5 * d);
        let curve = fit_price_curve("ERCOT", &days, &config(2023)).unwrap();

        assert!(curve.monotone);
        for &(d, p) in &curve.knots {
            assert!((p - (10.0 + 1.5 * d)).abs() < 1e-6, "knot ({d}, {p})");
        }
    }

    #[test]
    fn evaluation_is_exact_at_knots() {
        let days = summer_days("PJM", 2023, |d| 5.0 + 0.02 * d * d);
        let curve = fit_price_curve("PJM", &days, &config(2023)).unwrap();

        for &(d, p) in &curve.knots {
            let eval = curve.price_at(d);
            assert_eq!(eval.price_usd_per_mwh, p);
            assert!(!eval.extrapolated);
        }
    }

    #[test]
    fn out_of_range_demand_is_clipped_and_flagged() {
        let days = summer_days("CAISO", 2023, |d| 20.0 + d);
        let curve = fit_price_curve("CAISO", &days, &config(2023)).unwrap();
        let (lo, hi) = curve.demand_range();

        let below = curve.price_at(lo - 10.0);
        assert!(below.extrapolated);
        assert_eq!(below.price_usd_per_mwh, curve.knots[0].1);

        let above = curve.price_at(hi + 10.0);
        assert!(above.extrapolated);
        assert_eq!(above.price_usd_per_mwh, curve.knots[curve.knots.len() - 1].1);
    }

    #[test]
    fn decreasing_price_flags_non_monotone() {
        let days = summer_days("MISO", 2023, |d| 200.0 - 2.0 * d);
        let curve = fit_price_curve("MISO", &days, &config(2023)).unwrap();
        assert!(!curve.monotone);
    }

    #[test]
    fn winter_days_are_excluded_from_the_fit() {
        let mut days = summer_days("NYISO", 2023, |d| 10.0 + d);
        // A wild January outlier that would wreck the fit if included.
        days.push(DailyPriceDemand {
            region: "NYISO".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            demand_gw: 50.0,
            price_usd_per_mwh: 100_000.0,
        });
        let curve = fit_price_curve("NYISO", &days, &config(2023)).unwrap();
        for &(d, p) in &curve.knots {
            assert!((p - (10.0 + d)).abs() < 1e-6);
        }
    }

    #[test]
    fn too_few_summer_days_is_insufficient_data() {
        let days: Vec<DailyPriceDemand> = summer_days("SPP", 2023, |d| d).into_iter().take(3).collect();
        let err = fit_price_curve("SPP", &days, &config(2023)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }
}

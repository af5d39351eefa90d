//! Per-region polynomial demand regression.
//!
//! Given one region's daily observations for the training year, fit
//!
//! `demand(T) = c0 + c1*T + ... + cD*T^D + w * weekday`
//!
//! by ordinary least squares and package the result as an immutable
//! `FittedModel` with training diagnostics and the observed temperature
//! extremes as its valid domain.

use chrono::Datelike;
use nalgebra::{DMatrix, DVector};

use crate::domain::{DailyObservation, EngineConfig, FitStatistics, FittedModel, TempRange};
use crate::error::{AppError, ErrorKind};
use crate::math::{eval_polynomial, fill_design_row, solve_least_squares};

/// Fit one region for the configured training year and degree.
///
/// Observations with non-finite temperature, non-finite or zero demand, or
/// demand outside the region's plausibility bounds are dropped before
/// fitting, never imputed. Fails with `InsufficientData` below the configured
/// minimum sample size.
pub fn fit_region(
    region: &str,
    observations: &[DailyObservation],
    config: &EngineConfig,
) -> Result<FittedModel, AppError> {
    let bounds = config.bounds_for(region);
    let used: Vec<&DailyObservation> = observations
        .iter()
        .filter(|o| {
            o.region == region
                && o.date.year() == config.training_year
                && o.temperature_c.is_finite()
                && o.demand_gw.is_finite()
                && o.demand_gw > 0.0
                && bounds.accepts(o.demand_gw)
        })
        .collect();

    fit_observations(region, &used, config)
}

fn fit_observations(
    region: &str,
    used: &[&DailyObservation],
    config: &EngineConfig,
) -> Result<FittedModel, AppError> {
    let n = used.len();
    if n < config.min_training_days {
        return Err(AppError::insufficient_data(region, n, config.min_training_days));
    }

    let degree = config.degree;
    let p = degree + 2; // polynomial terms + weekday indicator

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for (i, obs) in used.iter().enumerate() {
        fill_design_row(obs.temperature_c, obs.is_weekday, degree, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }
        y[i] = obs.demand_gw;
    }

    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        AppError::new(
            ErrorKind::Numeric,
            format!("{region}: degree-{degree} design matrix is too ill-conditioned to solve"),
        )
    })?;

    let coefficients: Vec<f64> = beta.iter().take(degree + 1).copied().collect();
    let weekday_coeff = beta[degree + 1];

    // Training-set diagnostics.
    let mean_demand = y.iter().sum::<f64>() / n as f64;
    let mut sse = 0.0;
    let mut sst = 0.0;
    for obs in used {
        let fitted = eval_polynomial(&coefficients, obs.temperature_c)
            + if obs.is_weekday { weekday_coeff } else { 0.0 };
        let r = obs.demand_gw - fitted;
        sse += r * r;
        let d = obs.demand_gw - mean_demand;
        sst += d * d;
    }
    let rmse_gw = (sse / n as f64).sqrt();
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

    let min_temp = used
        .iter()
        .map(|o| o.temperature_c)
        .fold(f64::INFINITY, f64::min);
    let max_temp = used
        .iter()
        .map(|o| o.temperature_c)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_demand = used.iter().map(|o| o.demand_gw).fold(f64::NEG_INFINITY, f64::max);
    // Non-empty per the threshold check above; the fallbacks are unreachable.
    let train_start = used.iter().map(|o| o.date).min().unwrap_or(chrono::NaiveDate::MIN);
    let train_end = used.iter().map(|o| o.date).max().unwrap_or(chrono::NaiveDate::MAX);

    Ok(FittedModel {
        region: region.to_string(),
        training_year: config.training_year,
        degree,
        coefficients,
        weekday_coeff,
        stats: FitStatistics { rmse_gw, r2, n_days: n },
        valid_domain: TempRange {
            min_temp_c: min_temp,
            max_temp_c: max_temp,
        },
        avg_demand_gw: mean_demand,
        max_demand_gw: max_demand,
        train_start,
        train_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::is_calendar_weekday;
    use chrono::NaiveDate;

    fn synthetic_year(region: &str, year: i32, n_days: usize) -> Vec<DailyObservation> {
        // Deterministic smooth temperature sweep with a known cubic response.
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        (0..n_days)
            .map(|i| {
                let date = start + chrono::Duration::days(i as i64);
                let t = 0.7 + 33.0 * (i as f64 / (n_days.max(2) - 1) as f64);
                let demand = true_demand(t, is_calendar_weekday(date));
                DailyObservation::new(region, date, t, demand)
            })
            .collect()
    }

    fn true_demand(t: f64, weekday: bool) -> f64 {
        40.0 - 0.8 * t + 0.05 * t * t + 0.002 * t * t * t + if weekday { 3.0 } else { 0.0 }
    }

    fn config(year: i32, degree: usize) -> EngineConfig {
        // The synthetic cubic sweeps well past the default plausibility
        // bounds, so tests opt into bounds explicitly where they matter.
        let mut config = EngineConfig {
            training_year: year,
            degree,
            ..EngineConfig::default()
        };
        config.demand_bounds.clear();
        config
    }

    #[test]
    fn recovers_known_cubic_coefficients() {
        let obs = synthetic_year("ERCOT", 2023, 365);
        let model = fit_region("ERCOT", &obs, &config(2023, 3)).unwrap();

        let expected = [40.0, -0.8, 0.05, 0.002];
        for (got, want) in model.coefficients.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "coefficient {got} != {want}");
        }
        assert!((model.weekday_coeff - 3.0).abs() < 1e-6);
        assert!(model.stats.rmse_gw < 1e-6);
        assert!(model.stats.r2 > 0.999);
        assert_eq!(model.stats.n_days, 365);
    }

    #[test]
    fn valid_domain_equals_observed_extremes() {
        let obs = synthetic_year("ERCOT", 2023, 365);
        let model = fit_region("ERCOT", &obs, &config(2023, 3)).unwrap();

        assert!((model.valid_domain.min_temp_c - 0.7).abs() < 1e-12);
        assert!((model.valid_domain.max_temp_c - 33.7).abs() < 1e-12);
        for o in &obs {
            assert!(model.valid_domain.contains(o.temperature_c));
        }
    }

    #[test]
    fn refit_is_bit_identical() {
        let obs = synthetic_year("NYISO", 2023, 200);
        let cfg = config(2023, 4);
        let a = fit_region("NYISO", &obs, &cfg).unwrap();
        let b = fit_region("NYISO", &obs, &cfg).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.weekday_coeff.to_bits(), b.weekday_coeff.to_bits());
    }

    #[test]
    fn rejects_insufficient_data() {
        let obs = synthetic_year("SPP", 2023, 30);
        let err = fit_region("SPP", &obs, &config(2023, 3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn mid_year_start_still_fits_with_truncated_count() {
        // Data begins in July: fewer days, but above the threshold.
        let mut obs = synthetic_year("MISO", 2023, 365);
        obs.drain(..200);
        let model = fit_region("MISO", &obs, &config(2023, 3)).unwrap();
        assert_eq!(model.stats.n_days, 165);
    }

    #[test]
    fn drops_zero_demand_and_out_of_bounds_days() {
        let mut obs = synthetic_year("ERCOT", 2023, 365);
        obs[10].demand_gw = 0.0;
        obs[11].demand_gw = f64::NAN;
        obs[12].demand_gw = 500.0;

        let mut cfg = config(2023, 3);
        cfg.demand_bounds.insert(
            "ERCOT".to_string(),
            crate::domain::DemandBounds {
                min_gw: None,
                max_gw: Some(200.0),
            },
        );
        let model = fit_region("ERCOT", &obs, &cfg).unwrap();
        assert_eq!(model.stats.n_days, 362);
    }

    #[test]
    fn observations_from_other_years_are_ignored() {
        let mut obs = synthetic_year("CAISO", 2023, 365);
        obs.extend(synthetic_year("CAISO", 2022, 365));
        let model = fit_region("CAISO", &obs, &config(2023, 3)).unwrap();
        assert_eq!(model.stats.n_days, 365);
    }
}

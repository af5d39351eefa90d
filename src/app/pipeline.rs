//! Shared pipeline logic used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> fit -> project -> price curves -> cost estimate
//!
//! The CLI can then focus on presentation (printing and file exports).

use rayon::prelude::*;

use crate::cost::{estimate_cost_change, CostReport};
use crate::data::{generate_sample, SyntheticData};
use crate::domain::{
    CurveArtifact, DailyObservation, DailyPriceDemand, EngineConfig, ModelArtifact,
    PeriodTemperatureSeries, RegionFailure,
};
use crate::error::AppError;
use crate::fit::price_curve::fit_price_curve;
use crate::fit::{fit_all_regions, ModelStore};
use crate::project::{compute_impacts, ImpactSet};

/// All computed outputs of a single `rti demo` run.
#[derive(Debug, Clone)]
pub struct DemoRun {
    pub sample: SyntheticData,
    pub model_artifact: ModelArtifact,
    pub impacts: ImpactSet,
    pub curve_artifact: CurveArtifact,
    pub cost: CostReport,
}

/// Fit every configured region and package the results as an artifact.
pub fn run_fit(
    observations: &[DailyObservation],
    config: &EngineConfig,
) -> Result<ModelArtifact, AppError> {
    let batch = fit_all_regions(observations, config)?;
    Ok(batch.into_artifact(config))
}

/// Project a model artifact against baseline/current temperature series.
pub fn run_projection(
    artifact: ModelArtifact,
    series: &[PeriodTemperatureSeries],
    config: &EngineConfig,
) -> Result<ImpactSet, AppError> {
    let mut store = ModelStore::new();
    store.load_artifact(artifact)?;
    compute_impacts(&store, series, config)
}

/// Fit the price-demand curve for every configured region in parallel.
///
/// Mirrors the model-fit batch semantics: per-region errors become recorded
/// failures, only structural misconfiguration aborts.
pub fn run_price_curves(
    days: &[DailyPriceDemand],
    config: &EngineConfig,
) -> Result<CurveArtifact, AppError> {
    config.validate()?;

    let results: Vec<_> = config
        .regions
        .par_iter()
        .map(|region| (region.clone(), fit_price_curve(region, days, config)))
        .collect();

    let mut curves = Vec::new();
    let mut failures = Vec::new();
    for (region, result) in results {
        match result {
            Ok(curve) => curves.push(curve),
            Err(e) => failures.push(RegionFailure {
                region,
                reason: e.to_string(),
            }),
        }
    }

    Ok(CurveArtifact {
        training_year: config.training_year,
        n_segments: config.price_segments,
        curves,
        failures,
    })
}

/// Estimate the summer cost change from projected impacts and fitted curves.
pub fn run_cost(
    impacts: &ImpactSet,
    curves: &CurveArtifact,
    config: &EngineConfig,
) -> Result<CostReport, AppError> {
    estimate_cost_change(impacts, &curves.curves, config)
}

/// Execute the full pipeline on seeded synthetic inputs.
pub fn run_demo(config: &EngineConfig, seed: u64) -> Result<DemoRun, AppError> {
    let sample = generate_sample(config, seed)?;

    let model_artifact = run_fit(&sample.observations, config)?;
    let impacts = run_projection(model_artifact.clone(), &sample.period_series, config)?;
    let curve_artifact = run_price_curves(&sample.price_days, config)?;
    let cost = run_cost(&impacts, &curve_artifact, config)?;

    Ok(DemoRun {
        sample,
        model_artifact,
        impacts,
        curve_artifact,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            regions: vec!["ERCOT".to_string(), "PJM".to_string()],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn demo_runs_end_to_end() {
        let config = small_config();
        let run = run_demo(&config, 7).unwrap();

        assert_eq!(run.model_artifact.fits.len(), 2);
        assert!(run.model_artifact.failures.is_empty());
        assert_eq!(run.impacts.regions.len(), 2);
        assert_eq!(run.curve_artifact.curves.len(), 2);
        assert_eq!(run.cost.regions.len(), 2);

        // Warmer current period should raise projected summer demand, and
        // costs must be internally consistent.
        for region in &run.cost.regions {
            assert!(region.baseline_cost_usd > 0.0);
            assert!(
                (region.change_usd - (region.current_cost_usd - region.baseline_cost_usd)).abs()
                    < 1e-6
            );
        }
    }

    #[test]
    fn demo_is_deterministic_for_a_seed() {
        let config = small_config();
        let a = run_demo(&config, 99).unwrap();
        let b = run_demo(&config, 99).unwrap();

        assert_eq!(
            a.model_artifact.fits[0].coefficients,
            b.model_artifact.fits[0].coefficients
        );
        assert_eq!(a.cost.total_change_usd, b.cost.total_change_usd);
    }

    #[test]
    fn price_curve_batch_records_unknown_region() {
        let config = EngineConfig {
            regions: vec!["NOWHERE".to_string()],
            ..EngineConfig::default()
        };
        let artifact = run_price_curves(&[], &config).unwrap();
        assert!(artifact.curves.is_empty());
        assert_eq!(artifact.failures.len(), 1);
        assert_eq!(artifact.failures[0].region, "NOWHERE");
    }
}

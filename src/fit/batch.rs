//! Batch fitting across regions and the read-only model store.
//!
//! Region fits are independent (no shared mutable state), so the batch runs
//! them on the rayon pool. Per-region failures are collected as recorded
//! reasons instead of aborting the run; a batch with zero successes is still
//! a valid (if useless) artifact and the caller decides what to do with it.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::{
    ArtifactMetadata, DailyObservation, EngineConfig, FittedModel, ModelArtifact, ModelKey,
    RegionFailure,
};
use crate::error::AppError;
use crate::fit::regression::fit_region;

/// Outcome of fitting every configured region.
#[derive(Debug, Clone)]
pub struct FitBatch {
    pub models: Vec<FittedModel>,
    pub failures: Vec<RegionFailure>,
}

impl FitBatch {
    /// Package the batch as the persistable artifact for its training year.
    pub fn into_artifact(self, config: &EngineConfig) -> ModelArtifact {
        let metadata = ArtifactMetadata {
            max_degree: config.degree,
            n_regions_total: config.regions.len(),
            n_regions_successful: self.models.len(),
            n_regions_failed: self.failures.len(),
        };
        ModelArtifact {
            training_year: config.training_year,
            metadata,
            fits: self.models,
            failures: self.failures,
        }
    }
}

/// Fit every configured region in parallel.
///
/// Fails fast only on structural misconfiguration; per-region errors become
/// recorded failures and the remaining regions still produce models.
pub fn fit_all_regions(
    observations: &[DailyObservation],
    config: &EngineConfig,
) -> Result<FitBatch, AppError> {
    config.validate()?;

    let results: Vec<(String, Result<FittedModel, AppError>)> = config
        .regions
        .par_iter()
        .map(|region| (region.clone(), fit_region(region, observations, config)))
        .collect();

    let mut models = Vec::new();
    let mut failures = Vec::new();
    for (region, result) in results {
        match result {
            Ok(model) => models.push(model),
            Err(e) => failures.push(RegionFailure {
                region,
                reason: e.to_string(),
            }),
        }
    }

    Ok(FitBatch { models, failures })
}

/// Read-only lookup of fitted models by (region, year, degree).
///
/// Models are write-once: loading the same key twice is a structural error,
/// so fits for different degrees can never silently overwrite one another.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    models: HashMap<ModelKey, FittedModel>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: FittedModel) -> Result<(), AppError> {
        let key = model.key();
        if self.models.contains_key(&key) {
            return Err(AppError::invalid_config(format!(
                "Duplicate model for {} year {} degree {}.",
                key.region, key.year, key.degree
            )));
        }
        self.models.insert(key, model);
        Ok(())
    }

    /// Load every fit from an artifact. Partial artifacts (failed regions
    /// missing) are fine; lookups for those regions report `ModelNotFound`.
    pub fn load_artifact(&mut self, artifact: ModelArtifact) -> Result<(), AppError> {
        for model in artifact.fits {
            self.insert(model)?;
        }
        Ok(())
    }

    pub fn get(&self, region: &str, year: i32, degree: usize) -> Result<&FittedModel, AppError> {
        let key = ModelKey {
            region: region.to_string(),
            year,
            degree,
        };
        self.models
            .get(&key)
            .ok_or_else(|| AppError::model_not_found(region, year, degree))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

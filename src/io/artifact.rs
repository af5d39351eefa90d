//! Read/write model artifact JSON.
//!
//! The artifact is the portable, write-once representation of a training
//! run: one `FittedModel` record per (region, degree) under the training
//! year, file-level metadata about how many regions succeeded, and the
//! recorded reason for every region that failed. Consumers tolerate partial
//! artifacts; a missing region surfaces later as `ModelNotFound`.

use std::fs::File;
use std::path::Path;

use crate::domain::ModelArtifact;
use crate::error::AppError;

pub fn write_model_artifact(path: &Path, artifact: &ModelArtifact) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create model artifact '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::io(format!("Failed to write model artifact: {e}")))?;
    Ok(())
}

pub fn read_model_artifact(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::io(format!(
            "Failed to open model artifact '{}': {e}",
            path.display()
        ))
    })?;
    let artifact: ModelArtifact = serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid model artifact: {e}")))?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ArtifactMetadata, FitStatistics, FittedModel, RegionFailure, TempRange,
    };
    use chrono::NaiveDate;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            training_year: 2023,
            metadata: ArtifactMetadata {
                max_degree: 3,
                n_regions_total: 2,
                n_regions_successful: 1,
                n_regions_failed: 1,
            },
            fits: vec![FittedModel {
                region: "ERCOT".to_string(),
                training_year: 2023,
                degree: 3,
                coefficients: vec![40.0, -0.5, 0.03, 0.001],
                weekday_coeff: 2.5,
                stats: FitStatistics {
                    rmse_gw: 1.8,
                    r2: 0.91,
                    n_days: 365,
                },
                valid_domain: TempRange {
                    min_temp_c: 0.7,
                    max_temp_c: 33.7,
                },
                avg_demand_gw: 52.0,
                max_demand_gw: 78.5,
                train_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                train_end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            }],
            failures: vec![RegionFailure {
                region: "SPP".to_string(),
                reason: "SPP: insufficient data (30 valid days, need 50)".to_string(),
            }],
        }
    }

    #[test]
    fn artifact_round_trips_with_partial_failure() {
        let dir = std::env::temp_dir().join("rti-artifact-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("polynomial_fits_2023_degree3.json");

        write_model_artifact(&path, &artifact()).unwrap();
        let loaded = read_model_artifact(&path).unwrap();

        assert_eq!(loaded.training_year, 2023);
        assert_eq!(loaded.fits.len(), 1);
        assert_eq!(loaded.fits[0].coefficients, vec![40.0, -0.5, 0.03, 0.001]);
        assert_eq!(loaded.metadata.n_regions_failed, 1);
        assert_eq!(loaded.failures[0].region, "SPP");

        std::fs::remove_file(&path).ok();
    }
}

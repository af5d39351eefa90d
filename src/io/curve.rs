//! Read/write price-demand curve JSON.
//!
//! The curve artifact carries, per region: the knot list, the training year,
//! the segment-count configuration actually used, and the monotonicity flag.

use std::fs::File;
use std::path::Path;

use crate::domain::CurveArtifact;
use crate::error::AppError;

pub fn write_curve_artifact(path: &Path, artifact: &CurveArtifact) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create curve artifact '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::io(format!("Failed to write curve artifact: {e}")))?;
    Ok(())
}

pub fn read_curve_artifact(path: &Path) -> Result<CurveArtifact, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::io(format!(
            "Failed to open curve artifact '{}': {e}",
            path.display()
        ))
    })?;
    let artifact: CurveArtifact = serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid curve artifact: {e}")))?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceDemandCurve;

    #[test]
    fn curve_artifact_round_trips() {
        let artifact = CurveArtifact {
            training_year: 2023,
            n_segments: 4,
            curves: vec![PriceDemandCurve {
                region: "ERCOT".to_string(),
                training_year: 2023,
                n_segments: 4,
                knots: vec![(30.0, 22.0), (45.0, 31.0), (60.0, 48.0), (70.0, 80.0), (78.0, 140.0)],
                monotone: true,
            }],
            failures: vec![],
        };

        let dir = std::env::temp_dir().join("rti-curve-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("price_demand_2023.json");

        write_curve_artifact(&path, &artifact).unwrap();
        let loaded = read_curve_artifact(&path).unwrap();
        assert_eq!(loaded.curves.len(), 1);
        assert_eq!(loaded.curves[0].knots.len(), 5);
        assert!(loaded.curves[0].monotone);

        std::fs::remove_file(&path).ok();
    }
}

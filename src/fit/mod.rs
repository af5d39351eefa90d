//! Fitting: per-region demand regression, batch orchestration, and the
//! price-demand curve.

pub mod batch;
pub mod price_curve;
pub mod regression;

pub use batch::{fit_all_regions, FitBatch, ModelStore};
pub use regression::fit_region;

//! Error type for the engine.
//!
//! Two propagation regimes coexist:
//!
//! - structural problems (bad configuration, unreadable files) abort the run
//!   with a process exit code
//! - per-region problems during batch fitting/projection are caught by the
//!   batch runner and recorded as `{region, reason}` entries so the run can
//!   complete for every other region
//!
//! Warnings (non-monotone price curve, clipped/extrapolated evaluations) are
//! not errors; they live as flags and counters on the produced records.

/// What went wrong, at the granularity downstream code cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Misconfiguration detected before any fitting starts. Fatal.
    InvalidConfig,
    /// File or serialization failure. Fatal.
    Io,
    /// Too few valid training days for a stable fit. Per-region.
    InsufficientData,
    /// A period temperature series has no usable entries. Per-region.
    EmptySeries,
    /// Projection requested for a (region, year, degree) with no fit.
    ModelNotFound,
    /// Solver or arithmetic failure (ill-conditioned system, non-finite value).
    Numeric,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidConfig | ErrorKind::Io => 2,
            ErrorKind::InsufficientData | ErrorKind::EmptySeries => 3,
            ErrorKind::ModelNotFound | ErrorKind::Numeric => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn insufficient_data(region: &str, n_days: usize, min_days: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientData,
            format!("{region}: insufficient data ({n_days} valid days, need {min_days})"),
        )
    }

    pub fn empty_series(region: &str, period: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::EmptySeries,
            format!("{region}: no usable temperature data in {period} period"),
        )
    }

    pub fn model_not_found(region: &str, year: i32, degree: usize) -> Self {
        Self::new(
            ErrorKind::ModelNotFound,
            format!("{region}: no fitted model for year {year}, degree {degree}"),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_exit_2() {
        assert_eq!(AppError::invalid_config("degree must be >= 1").exit_code(), 2);
        assert_eq!(AppError::io("missing file").exit_code(), 2);
    }

    #[test]
    fn data_errors_are_distinguishable() {
        let e = AppError::insufficient_data("SPP", 30, 50);
        assert_eq!(e.kind(), ErrorKind::InsufficientData);
        assert!(e.to_string().contains("30 valid days"));

        let e = AppError::model_not_found("ERCOT", 2023, 3);
        assert_eq!(e.kind(), ErrorKind::ModelNotFound);
    }
}

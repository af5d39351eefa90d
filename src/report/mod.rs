//! Reporting: formatted terminal output.

mod format;

pub use format::{
    format_cost_report, format_curve_summary, format_fit_summary, format_impact_tables,
};

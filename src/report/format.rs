//! Formatted terminal output.
//!
//! Formatting lives in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Every formatter ends with the succeeded/failed region accounting; a
//! region is never dropped from the output without its recorded reason.

use crate::cost::CostReport;
use crate::domain::{CurveArtifact, EngineConfig, ModelArtifact, RegionFailure};
use crate::project::ImpactSet;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format the training-run summary: per-region diagnostics plus failures.
pub fn format_fit_summary(artifact: &ModelArtifact, config: &EngineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== rti - Temperature-Demand Fit ===\n");
    out.push_str(&format!(
        "Training year: {} | degree: {} | min days: {}\n\n",
        artifact.training_year, config.degree, config.min_training_days
    ));

    out.push_str(&format!(
        "{:<8} {:>6} {:>10} {:>8} {:>10} {:>18} {:>10}\n",
        "region", "days", "rmse (GW)", "r2", "wkday GW", "domain (C)", "avg GW"
    ));
    for fit in &artifact.fits {
        out.push_str(&format!(
            "{:<8} {:>6} {:>10.2} {:>8.3} {:>10.2} {:>8.1} to {:>6.1} {:>10.1}\n",
            fit.region,
            fit.stats.n_days,
            fit.stats.rmse_gw,
            fit.stats.r2,
            fit.weekday_coeff,
            fit.valid_domain.min_temp_c,
            fit.valid_domain.max_temp_c,
            fit.avg_demand_gw,
        ));
    }

    out.push_str(&format!(
        "\n{} of {} regions fit",
        artifact.metadata.n_regions_successful, artifact.metadata.n_regions_total
    ));
    out.push('\n');
    push_failures(&mut out, &artifact.failures);
    out
}

/// Format the monthly/annual impact tables and clip diagnostics.
pub fn format_impact_tables(impacts: &ImpactSet) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Climate impact (training {}, degree {}) ===\n\n",
        impacts.training_year, impacts.degree
    ));

    out.push_str(&format!("{:<8} {:>10} {:>10} {:>10} {:>8}\n", "region", "base GW", "curr GW", "chg GW", "chg %"));
    for impact in &impacts.regions {
        out.push_str(&format!(
            "{:<8} {:>10.2} {:>10.2} {:>10.2} {:>8.2}\n",
            impact.region,
            impact.annual.baseline_mean_gw,
            impact.annual.current_mean_gw,
            impact.annual.absolute_change_gw,
            impact.annual.percent_change,
        ));
    }

    out.push_str("\nMonthly change (GW):\n");
    out.push_str(&format!("{:<8}", "region"));
    for name in MONTH_NAMES {
        out.push_str(&format!(" {name:>7}"));
    }
    out.push('\n');
    for impact in &impacts.regions {
        out.push_str(&format!("{:<8}", impact.region));
        for row in &impact.monthly {
            match row {
                Some(r) => out.push_str(&format!(" {:>7.2}", r.absolute_change_gw)),
                None => out.push_str(&format!(" {:>7}", "-")),
            }
        }
        out.push('\n');
    }

    out.push_str("\nClipped projection days:\n");
    for impact in &impacts.regions {
        out.push_str(&format!(
            "{:<8} baseline {:>6.2}% ({} low, {} high) | current {:>6.2}% ({} low, {} high)\n",
            impact.region,
            impact.baseline.clip.fraction() * 100.0,
            impact.baseline.clip.n_below,
            impact.baseline.clip.n_above,
            impact.current.clip.fraction() * 100.0,
            impact.current.clip.n_below,
            impact.current.clip.n_above,
        ));
    }

    push_failures(&mut out, &impacts.failures);
    out
}

/// Format the fitted price-demand curves.
pub fn format_curve_summary(artifact: &CurveArtifact) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Price-demand curves (training {}, {} segments) ===\n",
        artifact.training_year, artifact.n_segments
    ));
    for curve in &artifact.curves {
        let (lo, hi) = curve.demand_range();
        out.push_str(&format!(
            "{:<8} demand [{:.1}, {:.1}] GW | knots {}{}\n",
            curve.region,
            lo,
            hi,
            curve.knots.len(),
            if curve.monotone {
                ""
            } else {
                " | WARNING: non-monotone"
            },
        ));
    }

    push_failures(&mut out, &artifact.failures);
    out
}

/// Format the summer cost-change estimate.
pub fn format_cost_report(report: &CostReport) -> String {
    let mut out = String::new();

    let months: Vec<&str> = report
        .summer_months
        .iter()
        .map(|&m| MONTH_NAMES[(m - 1) as usize])
        .collect();
    out.push_str(&format!(
        "=== Summer cost change (training {}, degree {}, months {}) ===\n\n",
        report.training_year,
        report.degree,
        months.join("-"),
    ));

    out.push_str(&format!(
        "{:<8} {:>12} {:>12} {:>12} {:>8} {:>8}\n",
        "region", "base $B", "curr $B", "chg $B", "chg %", "extrap"
    ));
    for r in &report.regions {
        out.push_str(&format!(
            "{:<8} {:>12.3} {:>12.3} {:>12.3} {:>8.2} {:>8}{}\n",
            r.region,
            r.baseline_cost_usd / 1e9,
            r.current_cost_usd / 1e9,
            r.change_usd / 1e9,
            r.percent_change,
            r.n_extrapolated_prices,
            if r.curve_monotone { "" } else { "  (non-monotone curve)" },
        ));
    }
    out.push_str(&format!(
        "{:<8} {:>12.3} {:>12.3} {:>12.3}\n",
        "TOTAL",
        report.total_baseline_usd / 1e9,
        report.total_current_usd / 1e9,
        report.total_change_usd / 1e9,
    ));

    push_failures(&mut out, &report.failures);
    out
}

fn push_failures(out: &mut String, failures: &[RegionFailure]) {
    if failures.is_empty() {
        return;
    }
    out.push_str("\nFailed regions:\n");
    for f in failures {
        out.push_str(&format!("- {}\n", f.reason));
    }
}

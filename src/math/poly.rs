//! Polynomial design rows and evaluation.
//!
//! The demand model is linear in its coefficients:
//!
//! `demand(T) = c0 + c1*T + ... + cD*T^D + w * weekday`
//!
//! Two primitive operations support the fitter and the projector:
//! - build a design row for a given temperature and weekday flag (for OLS)
//! - evaluate the polynomial part given coefficients (for projection)

/// Fill a design row: `[1, T, T^2, ..., T^degree, weekday]`.
///
/// # Panics
/// Panics if `out` does not have length `degree + 2`. Callers size the row
/// from the configured degree.
pub fn fill_design_row(temp_c: f64, is_weekday: bool, degree: usize, out: &mut [f64]) {
    assert_eq!(out.len(), degree + 2, "design row length must be degree + 2");

    let mut power = 1.0;
    for slot in out.iter_mut().take(degree + 1) {
        *slot = power;
        power *= temp_c;
    }
    out[degree + 1] = if is_weekday { 1.0 } else { 0.0 };
}

/// Evaluate `c0 + c1*T + ... + cD*T^D` by Horner's rule.
pub fn eval_polynomial(coefficients: &[f64], temp_c: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * temp_c + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_row_powers_and_indicator() {
        let mut row = vec![0.0; 5];
        fill_design_row(2.0, true, 3, &mut row);
        assert_eq!(row, vec![1.0, 2.0, 4.0, 8.0, 1.0]);

        fill_design_row(3.0, false, 3, &mut row);
        assert_eq!(row, vec![1.0, 3.0, 9.0, 27.0, 0.0]);
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let coeffs = [5.0, -1.0, 0.25, 0.01];
        for t in [-10.0, 0.0, 7.3, 35.0] {
            let direct = 5.0 - 1.0 * t + 0.25 * t * t + 0.01 * t * t * t;
            assert!((eval_polynomial(&coeffs, t) - direct).abs() < 1e-9);
        }
    }
}

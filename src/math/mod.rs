//! Numerical primitives: least-squares solve and polynomial evaluation.

mod ols;
mod poly;

pub use ols::solve_least_squares;
pub use poly::{eval_polynomial, fill_design_row};

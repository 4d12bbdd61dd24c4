// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal cumulative distribution function.
///
/// Evaluated through `erfc` so the lower tail keeps full relative accuracy
/// and both tails saturate to exactly 0 and 1.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal probability density function
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

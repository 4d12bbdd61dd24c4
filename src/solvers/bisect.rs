// src/solvers/bisect.rs
//! Element-wise bisection for monotonic functions
//!
//! # Algorithm
//!
//! For every element of `targets` a bracket `[lo, hi]` is kept that contains
//! the solution of `f(x) = target`. Each iteration evaluates `f` once on the
//! array of midpoints and halves every bracket:
//! ```text
//! m = (lo + hi) / 2
//! f increasing:  f(m) ≥ target → hi = m, else lo = m
//! f decreasing:  f(m) ≤ target → hi = m, else lo = m
//! ```
//! The loop stops once `hi - lo ≤ precision` for every element and the
//! midpoints of the final brackets are returned.
//!
//! # Direction
//!
//! The direction of `f` is read per element from `f(lower)` and `f(upper)`,
//! so a single call may mix increasing and decreasing elements.

use crate::error::{validation::*, PricingError, PricingResult};
use ndarray::{arr0, Array, ArrayView, ArrayView0, Dimension, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BisectConfig {
    /// Bracket width at which refinement stops
    pub precision: f64,
    /// Hard cap on refinement steps
    pub max_iterations: usize,
}

impl Default for BisectConfig {
    fn default() -> Self {
        BisectConfig {
            precision: 1e-6,
            max_iterations: 100_000,
        }
    }
}

impl BisectConfig {
    /// A precision of zero or below is accepted: it can never be met and
    /// ends in `NonConvergence` once the iteration cap is reached.
    pub fn validate(&self) -> PricingResult<()> {
        validate_count("max_iterations", self.max_iterations, usize::MAX)
    }
}

/// Find `x` with `f(x) ≈ target` for every element of `targets`.
///
/// `f` is applied to whole arrays and must act element-wise, returning an
/// array of the same shape as its argument.
///
/// # Errors
///
/// - `InvalidConfiguration` if `lower >= upper` or `max_iterations` is zero
///   (checked before `f` is called)
/// - `NotBracketed` if a target lies outside `[f(lower), f(upper)]`
/// - `NonConvergence` if the brackets are still wider than `precision` after
///   `max_iterations` steps; a non-positive precision always ends here
pub fn bisect<D, F>(
    f: F,
    targets: ArrayView<f64, D>,
    lower: f64,
    upper: f64,
    config: &BisectConfig,
) -> PricingResult<Array<f64, D>>
where
    D: Dimension,
    F: Fn(ArrayView<f64, D>) -> Array<f64, D>,
{
    config.validate()?;
    validate_bracket(lower, upper)?;

    let lo = Array::from_elem(targets.raw_dim(), lower);
    let hi = Array::from_elem(targets.raw_dim(), upper);
    refine(f, targets, lo, hi, config)
}

/// [`bisect`] with a separate bracket `[lower[i], upper[i]]` per element.
///
/// Both bound arrays must have the shape of `targets`.
pub fn bisect_within<D, F>(
    f: F,
    targets: ArrayView<f64, D>,
    lower: ArrayView<f64, D>,
    upper: ArrayView<f64, D>,
    config: &BisectConfig,
) -> PricingResult<Array<f64, D>>
where
    D: Dimension,
    F: Fn(ArrayView<f64, D>) -> Array<f64, D>,
{
    config.validate()?;
    for bound_shape in [lower.shape(), upper.shape()] {
        if bound_shape != targets.shape() {
            return Err(PricingError::ShapeMismatch {
                expected: targets.shape().to_vec(),
                found: bound_shape.to_vec(),
            });
        }
    }
    for (&a, &b) in lower.iter().zip(upper.iter()) {
        validate_bracket(a, b)?;
    }

    refine(f, targets, lower.to_owned(), upper.to_owned(), config)
}

/// Scalar form of [`bisect`].
pub fn bisect_scalar<F>(
    f: F,
    target: f64,
    lower: f64,
    upper: f64,
    config: &BisectConfig,
) -> PricingResult<f64>
where
    F: Fn(f64) -> f64,
{
    let root = bisect(
        |x: ArrayView0<f64>| x.mapv(&f),
        arr0(target).view(),
        lower,
        upper,
        config,
    )?;
    Ok(root.into_scalar())
}

/// Halve the validated brackets `[lo, hi]` until they are narrower than the
/// precision.
fn refine<D, F>(
    f: F,
    targets: ArrayView<f64, D>,
    mut lo: Array<f64, D>,
    mut hi: Array<f64, D>,
    config: &BisectConfig,
) -> PricingResult<Array<f64, D>>
where
    D: Dimension,
    F: Fn(ArrayView<f64, D>) -> Array<f64, D>,
{
    let f_lo = evaluate(&f, &lo)?;
    let f_hi = evaluate(&f, &hi)?;

    let increasing = Zip::from(&f_lo).and(&f_hi).map_collect(|&a, &b| a <= b);

    // Every target must sit inside the image of its bracket
    let mut outside = None;
    Zip::from(&targets)
        .and(&f_lo)
        .and(&f_hi)
        .and(&lo)
        .and(&hi)
        .for_each(|&target, &a, &b, &lower, &upper| {
            let inside = target >= a.min(b) && target <= a.max(b);
            if !inside && outside.is_none() {
                outside = Some((target, lower, upper));
            }
        });
    if let Some((target, lower, upper)) = outside {
        return Err(PricingError::NotBracketed {
            target,
            lower,
            upper,
        });
    }

    let precision = config.precision;
    let mut iterations = 0usize;

    while !(precision > 0.0) || max_width(&lo, &hi) > precision {
        if iterations >= config.max_iterations {
            let width = max_width(&lo, &hi);
            warn!(
                iterations,
                precision, width, "bisection aborted at iteration cap"
            );
            return Err(PricingError::NonConvergence {
                method: "bisection".to_string(),
                iterations,
                reason: format!(
                    "bracket width {:e} still exceeds precision {:e}",
                    width, precision
                ),
            });
        }
        iterations += 1;

        let mid = Zip::from(&lo).and(&hi).map_collect(|&a, &b| 0.5 * (a + b));
        let output = evaluate(&f, &mid)?;

        Zip::from(&mut lo)
            .and(&mut hi)
            .and(&mid)
            .and(&output)
            .and(&targets)
            .and(&increasing)
            .for_each(|lo, hi, &m, &y, &target, &up| {
                let root_below = if up { y >= target } else { y <= target };
                if root_below {
                    *hi = m;
                } else {
                    *lo = m;
                }
            });
    }

    debug!(iterations, precision, "bisection converged");

    Ok(Zip::from(&lo).and(&hi).map_collect(|&a, &b| 0.5 * (a + b)))
}

fn evaluate<D, F>(f: &F, x: &Array<f64, D>) -> PricingResult<Array<f64, D>>
where
    D: Dimension,
    F: Fn(ArrayView<f64, D>) -> Array<f64, D>,
{
    let y = f(x.view());
    if y.shape() != x.shape() {
        return Err(PricingError::ShapeMismatch {
            expected: x.shape().to_vec(),
            found: y.shape().to_vec(),
        });
    }
    Ok(y)
}

fn max_width<D: Dimension>(lo: &Array<f64, D>, hi: &Array<f64, D>) -> f64 {
    Zip::from(lo)
        .and(hi)
        .fold(0.0_f64, |acc, &a, &b| acc.max(b - a))
}

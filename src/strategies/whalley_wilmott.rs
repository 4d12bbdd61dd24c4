// src/strategies/whalley_wilmott.rs
//! Whalley-Wilmott no-transaction band
//!
//! Under proportional transaction costs the optimal position stays put while
//! it lies inside a band around the Black-Scholes delta and is moved to the
//! nearest edge otherwise. The asymptotic half-width for small costs is
//! ```text
//! width = (3 c S Γ² / (2a))^{1/3}
//! ```
//! with `c` the proportional cost, `Γ` the Black-Scholes gamma and `a` the
//! risk aversion. Zero gamma gives a zero-width band, so the strategy falls
//! back to plain delta hedging.
//!
//! Reference: Whalley, A. E. & Wilmott, P. (1997), "An asymptotic analysis of
//! an optimal hedging model for option pricing with transaction costs",
//! Mathematical Finance 7(3), 307-324.

use super::HedgeStrategy;
use crate::analytics::formula::to_array;
use crate::analytics::{BlackScholes, Feature, Inputs, Point};
use crate::error::{validation::*, PricingError, PricingResult};
use ndarray::{ArrayD, ArrayViewD, Axis};
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WhalleyWilmott {
    formula: BlackScholes,
    cost: f64,
    a: f64,
}

impl WhalleyWilmott {
    /// Band around the delta of `formula` with risk aversion `a = 1`.
    pub fn new(formula: BlackScholes, cost: f64) -> PricingResult<Self> {
        Self::with_risk_aversion(formula, cost, 1.0)
    }

    pub fn with_risk_aversion(formula: BlackScholes, cost: f64, a: f64) -> PricingResult<Self> {
        validate_non_negative("cost", cost)?;
        validate_positive("a", a)?;
        Ok(WhalleyWilmott { formula, cost, a })
    }

    pub fn formula(&self) -> &BlackScholes {
        &self.formula
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn risk_aversion(&self) -> f64 {
        self.a
    }

    /// `(delta - width, delta + width)` at one point
    pub fn band(&self, point: &Point) -> PricingResult<(f64, f64)> {
        let greeks = self.formula.greeks_at(point)?;
        let spot = self.formula.strike() * point.log_moneyness.exp();
        let width = (3.0 * self.cost * spot * greeks.gamma.powi(2) / (2.0 * self.a)).cbrt();
        Ok((greeks.delta - width, greeks.delta + width))
    }

    /// Target positions for a feature tensor `(…, H_in + 1)` whose last
    /// column is the previous position; returns `(…, 1)`.
    pub fn forward(&self, x: ArrayViewD<f64>) -> PricingResult<ArrayD<f64>> {
        let features = HedgeStrategy::features(self);
        let inputs = Inputs::from_feature_tensor(&features, x)?;
        let gathered = inputs.gather(&features, &[])?;

        if gathered.prev_hedge.len() != gathered.points.len() {
            return Err(PricingError::ShapeMismatch {
                expected: vec![gathered.points.len()],
                found: vec![gathered.prev_hedge.len()],
            });
        }
        let targets = gathered
            .points
            .par_iter()
            .zip(gathered.prev_hedge.par_iter())
            .map(|(p, &prev)| self.hedge_ratio(p, prev))
            .collect::<PricingResult<Vec<f64>>>()?;
        let out = to_array(&gathered.shape, targets)?;
        let last = out.ndim();
        Ok(out.insert_axis(Axis(last)))
    }
}

impl HedgeStrategy for WhalleyWilmott {
    fn features(&self) -> Vec<Feature> {
        let mut features = self.formula.features();
        features.push(Feature::PrevHedge);
        features
    }

    fn hedge_ratio(&self, point: &Point, prev_hedge: f64) -> PricingResult<f64> {
        validate_finite("prev_hedge", prev_hedge)?;
        let (lower, upper) = self.band(point)?;
        Ok(prev_hedge.max(lower).min(upper))
    }
}

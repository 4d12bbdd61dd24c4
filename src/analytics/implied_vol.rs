// src/analytics/implied_vol.rs
//! Implied volatility by bisection
//!
//! Vanilla, one-touch, lookback and Asian put prices are monotone in
//! volatility. Binary, barrier and Asian call prices are not: an
//! out-of-the-money binary call rises and then falls as volatility grows. The
//! solver therefore searches each element on its low-volatility branch,
//! `[lower, v*]`, where `v*` is the first volatility at which vega changes
//! sign (or the configured upper bound), and solves it with
//! [`bisect_within`]. A target that is only reached beyond the first turn is
//! reported as not bracketed.

use super::formula::BlackScholes;
use super::inputs::{Feature, Inputs, Point};
use crate::error::{validation::*, PricingError, PricingResult};
use crate::solvers::bisect::{bisect_within, BisectConfig};
use ndarray::{Array, ArrayD, ArrayViewD, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolConfig {
    pub lower: f64,
    pub upper: f64,
    pub precision: f64,
    pub max_iterations: usize,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        ImpliedVolConfig {
            lower: 1e-8,
            upper: 10.0,
            precision: 1e-8,
            max_iterations: 200,
        }
    }
}

impl ImpliedVolConfig {
    pub fn validate(&self) -> PricingResult<()> {
        validate_non_negative("lower", self.lower)?;
        validate_bracket(self.lower, self.upper)?;
        validate_count("max_iterations", self.max_iterations, usize::MAX)
    }

    fn bisect_config(&self) -> BisectConfig {
        BisectConfig {
            precision: self.precision,
            max_iterations: self.max_iterations,
        }
    }
}

impl BlackScholes {
    /// Volatility at which [`price`](Self::price) equals `target`.
    ///
    /// `inputs` supplies every feature except `volatility` (a volatility
    /// column, if present, is ignored). The result has the broadcast shape of
    /// the inputs and the target.
    pub fn implied_volatility(
        &self,
        inputs: &Inputs,
        target: ArrayViewD<f64>,
        config: &ImpliedVolConfig,
    ) -> PricingResult<ArrayD<f64>> {
        config.validate()?;

        let features: Vec<Feature> = self
            .features()
            .into_iter()
            .filter(|f| *f != Feature::Volatility)
            .collect();
        let gathered = inputs.gather(&features, &[target.shape()])?;
        let shape = IxDyn(&gathered.shape);

        let points = Array::from_shape_vec(shape.clone(), gathered.points).map_err(|_| {
            PricingError::ShapeMismatch {
                expected: gathered.shape.clone(),
                found: target.shape().to_vec(),
            }
        })?;
        for p in points.iter() {
            self.validate_point(&p.with_volatility(config.lower))?;
        }

        let target = target
            .broadcast(shape.clone())
            .ok_or_else(|| PricingError::ShapeMismatch {
                expected: gathered.shape.clone(),
                found: target.shape().to_vec(),
            })?;
        for &price in target.iter() {
            validate_finite("target", price)?;
        }

        let lower = Array::from_elem(shape.clone(), config.lower);
        let upper = Zip::from(&points).par_map_collect(|p: &Point| {
            let turn = self.volatility_turning_point(p, config.lower, config.upper);
            if turn > config.lower && turn <= config.upper {
                turn
            } else {
                config.upper
            }
        });

        debug!(elements = points.len(), "inverting prices for volatility");

        let price_at = |vols: ArrayViewD<f64>| -> ArrayD<f64> {
            Zip::from(&vols)
                .and(&points)
                .par_map_collect(|&v, p: &Point| self.greeks_unchecked(&p.with_volatility(v)).price)
        };

        bisect_within(
            price_at,
            target,
            lower.view(),
            upper.view(),
            &config.bisect_config(),
        )
    }
}

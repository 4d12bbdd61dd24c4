// src/strategies/mod.rs
//! Hedging strategies
//!
//! A strategy maps the market state of one element, plus the position it held
//! on the previous step, to the position it wants to hold now.

pub mod whalley_wilmott;

use crate::analytics::{BlackScholes, Feature, Point};
use crate::error::PricingResult;

pub use whalley_wilmott::WhalleyWilmott;

pub trait HedgeStrategy: Sync {
    /// Input columns the strategy reads, in feature-tensor order
    fn features(&self) -> Vec<Feature>;

    /// Position to hold given the current point and the previous position.
    ///
    /// Fails with `InvalidParameters` if the point is not one the underlying
    /// formula can evaluate.
    fn hedge_ratio(&self, point: &Point, prev_hedge: f64) -> PricingResult<f64>;
}

/// Black-Scholes delta hedging: always hold the delta of the liability
impl HedgeStrategy for BlackScholes {
    fn features(&self) -> Vec<Feature> {
        BlackScholes::features(self)
    }

    fn hedge_ratio(&self, point: &Point, _prev_hedge: f64) -> PricingResult<f64> {
        self.greeks_at(point).map(|g| g.delta)
    }
}

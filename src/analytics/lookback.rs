// src/analytics/lookback.rs
//! Fixed-strike lookback call on the running maximum
//!
//! The payoff is `(M_T - K)⁺` where `M_T` is the maximum of the spot over the
//! life of the option. With `m` the running max in log-moneyness units, let
//! `L = K·e^max(m, 0)` be the level already locked in. At zero rate
//! ```text
//! x  = ln(S/L)
//! d₁ = x/w + w/2,  d₂ = d₁ - w
//! h  = d₁ Φ(d₁) + φ(d₁)
//! V  = (L - K) + S Φ(d₁) - L Φ(d₂) + S w h
//! ```
//! Since `∂h/∂d₁ = Φ(d₁)` and `S φ(d₁) = L φ(d₂)`:
//! ```text
//! Δ = 2Φ(d₁) + w h
//! Γ = (2φ(d₁)/w + Φ(d₁)) / S
//! ∂V/∂w = S (2φ(d₁) + w Φ(d₁))
//! ```
//! from which vega and theta follow through `w = σ√t`.

use super::formula::ClosedForm;
use super::greeks::{Greeks, COLLAPSE_DEVIATION};
use super::inputs::{Feature, Point};
use crate::error::{validation::*, PricingError, PricingResult};
use crate::math_utils::{norm_cdf, norm_pdf};

pub(crate) const FEATURES: [Feature; 4] = [
    Feature::LogMoneyness,
    Feature::MaxLogMoneyness,
    Feature::ExpiryTime,
    Feature::Volatility,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsLookback {
    strike: f64,
}

impl BsLookback {
    pub fn new(strike: f64, call: bool) -> PricingResult<Self> {
        if !call {
            return Err(PricingError::InvalidConfiguration {
                field: "call".to_string(),
                reason: "put is not supported for lookback options".to_string(),
            });
        }
        validate_positive("strike", strike)?;
        Ok(BsLookback { strike })
    }
}

impl Default for BsLookback {
    fn default() -> Self {
        BsLookback { strike: 1.0 }
    }
}

impl ClosedForm for BsLookback {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    fn validate_point(&self, point: &Point) -> PricingResult<()> {
        point.validate()?;
        validate_log_level("log_moneyness", self.strike, point.log_moneyness)?;
        validate_log_level("max_log_moneyness", self.strike, point.running_max())
    }

    fn greeks(&self, point: &Point) -> Greeks {
        let k = self.strike;
        let s = point.log_moneyness;
        let spot = k * s.exp();
        let max = point.running_max();
        let level = max.max(0.0);
        let w = point.total_deviation();

        if w < COLLAPSE_DEVIATION {
            let delta = if s >= level { 1.0 } else { 0.0 };
            return Greeks::intrinsic((k * max.exp() - k).max(0.0), delta);
        }

        let locked = k * level.exp();
        let d1 = (s - level) / w + 0.5 * w;
        let d2 = d1 - w;
        let (cdf, pdf) = (norm_cdf(d1), norm_pdf(d1));
        let h = d1 * cdf + pdf;
        let core = 2.0 * pdf + w * cdf;
        let sqrt_t = point.time_to_expiry.sqrt();

        Greeks {
            price: (locked - k) + spot * cdf - locked * norm_cdf(d2) + spot * w * h,
            delta: 2.0 * cdf + w * h,
            gamma: (2.0 * pdf / w + cdf) / spot,
            vega: spot * core * sqrt_t,
            theta: -spot * core * point.volatility / (2.0 * sqrt_t),
        }
    }
}

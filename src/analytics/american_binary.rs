// src/analytics/american_binary.rs
//! American binary (one-touch) call
//!
//! Pays one unit as soon as the spot touches the strike from below. Writing
//! `s = ln(S/K)` and `w = σ√t`, the reflection principle for a driftless
//! log-price at zero rate gives, while the strike is untouched (`s < 0`),
//! ```text
//! V = Φ(d₂) + eˢ Φ(d₁)
//! ```
//! which is exactly 1 at `s = 0`. Once the running max reached the strike the
//! option has paid and is worth 1 with zero sensitivities.
//!
//! With `eˢ φ(d₁) = φ(d₂)`:
//! ```text
//! ∂V/∂s   = 2φ(d₂)/w + eˢ Φ(d₁)
//! Δ       = (∂V/∂s) / S
//! Γ       = φ(d₂) (-2d₂/w - 1) / (w S²)
//! ν       = -φ(d₂) (d₁ + d₂) / σ
//! Θ       = φ(d₂) (d₁ + d₂) / (2t)
//! ```

use super::european::d1_d2;
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
pub struct BsAmericanBinary {
    strike: f64,
}

impl BsAmericanBinary {
    /// Only the up-and-touch call is available; `call = false` is rejected.
    pub fn new(strike: f64, call: bool) -> PricingResult<Self> {
        if !call {
            return Err(PricingError::InvalidConfiguration {
                field: "call".to_string(),
                reason: "put is not supported for American binary options".to_string(),
            });
        }
        validate_positive("strike", strike)?;
        Ok(BsAmericanBinary { strike })
    }
}

impl Default for BsAmericanBinary {
    fn default() -> Self {
        BsAmericanBinary { strike: 1.0 }
    }
}

impl ClosedForm for BsAmericanBinary {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    fn greeks(&self, point: &Point) -> Greeks {
        if point.running_max() >= 0.0 {
            return Greeks::intrinsic(1.0, 0.0);
        }

        let w = point.total_deviation();
        if w < COLLAPSE_DEVIATION {
            return Greeks::intrinsic(0.0, 0.0);
        }

        let s = point.log_moneyness;
        let (d1, d2) = d1_d2(s, w);
        let spot = self.strike * s.exp();
        let forward_term = s.exp() * norm_cdf(d1);
        let pdf = norm_pdf(d2);
        let density = pdf / w;

        Greeks {
            price: norm_cdf(d2) + forward_term,
            delta: (2.0 * density + forward_term) / spot,
            gamma: density * (-2.0 * d2 / w - 1.0) / spot / spot,
            vega: -pdf * (d1 + d2) / point.volatility,
            theta: pdf * (d1 + d2) / (2.0 * point.time_to_expiry),
        }
    }
}

// src/analytics/european.rs
//! Black-Scholes formulas for European options at zero interest rate
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model with zero rate the underlying follows
//! ```text
//! dS_t = σ S_t dW_t
//! ```
//! and, writing `s = ln(S/K)` and `w = σ√t`,
//! ```text
//! d₁ = s/w + w/2
//! d₂ = d₁ - w
//! C  = K (eˢ Φ(d₁) - Φ(d₂))
//! P  = K (Φ(-d₂) - eˢ Φ(-d₁))
//! ```
//!
//! # Greeks
//! ```text
//! Δ_call = Φ(d₁)            Δ_put = -Φ(-d₁)
//! Γ      = φ(d₁) / (S w)
//! ν      = S φ(d₁) √t
//! Θ      = -S φ(d₁) σ / (2√t)
//! ```
//! Gamma, vega and theta are shared by calls and puts.

use super::formula::ClosedForm;
use super::greeks::{Greeks, COLLAPSE_DEVIATION};
use super::inputs::{Feature, Point};
use crate::error::{validation::*, PricingResult};
use crate::math_utils::{norm_cdf, norm_pdf};

pub(crate) const FEATURES: [Feature; 3] = [
    Feature::LogMoneyness,
    Feature::ExpiryTime,
    Feature::Volatility,
];

/// `(d₁, d₂)` for log-moneyness `s` and total deviation `w`
pub(crate) fn d1_d2(log_moneyness: f64, total_deviation: f64) -> (f64, f64) {
    let d1 = log_moneyness / total_deviation + 0.5 * total_deviation;
    (d1, d1 - total_deviation)
}

/// Vanilla European call or put
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsEuropean {
    strike: f64,
    call: bool,
}

impl BsEuropean {
    pub fn new(strike: f64, call: bool) -> PricingResult<Self> {
        validate_positive("strike", strike)?;
        Ok(BsEuropean { strike, call })
    }

    pub fn is_call(&self) -> bool {
        self.call
    }
}

impl Default for BsEuropean {
    fn default() -> Self {
        BsEuropean {
            strike: 1.0,
            call: true,
        }
    }
}

impl ClosedForm for BsEuropean {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    /// At expiry or zero volatility the option is worth its intrinsic value
    /// and its delta is the slope of the payoff, counting `S = K` as in the
    /// money (call delta 1, put delta 0).
    fn greeks(&self, point: &Point) -> Greeks {
        let k = self.strike;
        let s = point.log_moneyness;
        let spot = k * s.exp();
        let w = point.total_deviation();

        if w < COLLAPSE_DEVIATION {
            let itm = s >= 0.0;
            return if self.call {
                Greeks::intrinsic((spot - k).max(0.0), if itm { 1.0 } else { 0.0 })
            } else {
                Greeks::intrinsic((k - spot).max(0.0), if itm { 0.0 } else { -1.0 })
            };
        }

        let (d1, d2) = d1_d2(s, w);
        let sqrt_t = point.time_to_expiry.sqrt();
        let pdf = norm_pdf(d1);

        let (price, delta) = if self.call {
            (k * (s.exp() * norm_cdf(d1) - norm_cdf(d2)), norm_cdf(d1))
        } else {
            (k * (norm_cdf(-d2) - s.exp() * norm_cdf(-d1)), -norm_cdf(-d1))
        };

        Greeks {
            price,
            delta,
            gamma: pdf / spot / w,
            vega: spot * pdf * sqrt_t,
            theta: -spot * pdf * point.volatility / (2.0 * sqrt_t),
        }
    }
}

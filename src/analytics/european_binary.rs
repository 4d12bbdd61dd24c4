// src/analytics/european_binary.rs
//! Cash-or-nothing European binary options paying one unit
//!
//! ```text
//! Call = Φ(d₂)          Put = 1 - Call
//! Δ    = φ(d₂) / (S w)
//! Γ    = -φ(d₂) d₁ / (S w)²
//! ν    = -φ(d₂) d₁ / σ
//! Θ    = φ(d₂) d₁ / (2t)
//! ```
//! Put greeks are the call greeks with opposite sign.

use super::european::{d1_d2, FEATURES};
use super::formula::ClosedForm;
use super::greeks::{Greeks, COLLAPSE_DEVIATION};
use super::inputs::{Feature, Point};
use crate::error::{validation::*, PricingResult};
use crate::math_utils::{norm_cdf, norm_pdf};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsEuropeanBinary {
    strike: f64,
    call: bool,
}

impl BsEuropeanBinary {
    pub fn new(strike: f64, call: bool) -> PricingResult<Self> {
        validate_positive("strike", strike)?;
        Ok(BsEuropeanBinary { strike, call })
    }

    pub fn is_call(&self) -> bool {
        self.call
    }
}

impl Default for BsEuropeanBinary {
    fn default() -> Self {
        BsEuropeanBinary {
            strike: 1.0,
            call: true,
        }
    }
}

impl ClosedForm for BsEuropeanBinary {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    /// `Φ(d₂)` peaks in `w` at `w² = -2s`, which lies inside the volatility
    /// range only out of the money (`s < 0`); the put mirrors the call.
    fn volatility_turning_point(&self, point: &Point, lower: f64, upper: f64) -> f64 {
        let s = point.log_moneyness;
        let t = point.time_to_expiry;
        if s >= 0.0 || t <= 0.0 {
            return upper;
        }
        let peak = (-2.0 * s / t).sqrt();
        if peak > lower && peak < upper {
            peak
        } else {
            upper
        }
    }

    /// The call pays at `S ≥ K`; the put is priced as `1 - call` so the two
    /// always sum to exactly one.
    fn greeks(&self, point: &Point) -> Greeks {
        let s = point.log_moneyness;
        let w = point.total_deviation();

        let call = if w < COLLAPSE_DEVIATION {
            Greeks::intrinsic(if s >= 0.0 { 1.0 } else { 0.0 }, 0.0)
        } else {
            let (d1, d2) = d1_d2(s, w);
            let spot = self.strike * s.exp();
            let t = point.time_to_expiry;
            let pdf = norm_pdf(d2);
            let slope = pdf / spot / w;

            Greeks {
                price: norm_cdf(d2),
                delta: slope,
                gamma: -slope * d1 / spot / w,
                vega: -pdf * d1 / point.volatility,
                theta: pdf * d1 / (2.0 * t),
            }
        };

        if self.call {
            call
        } else {
            Greeks {
                price: 1.0 - call.price,
                ..call.scaled(-1.0)
            }
        }
    }
}

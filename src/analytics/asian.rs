// src/analytics/asian.rs
//! European option on the continuous geometric average of the spot
//!
//! The payoff is `(K e^{A_T} - K)⁺` (call) or `(K - K e^{A_T})⁺` (put) where
//! `A_T` is the time average of the log-moneyness over the whole averaging
//! window `[0, T]`. With `a` the average realised so far, `c = t/T` the share
//! of the window still to come and zero rate, `A_T` is normal with
//! ```text
//! m  = a + c (s - a) - σ² t² / (4T)
//! sd = σ t^{3/2} / (T √3)
//! ```
//! so the price is a Black-Scholes formula in `(m, sd)`:
//! ```text
//! F  = K e^{m + sd²/2},   d₂ = m/sd,   d₁ = d₂ + sd
//! C  = F Φ(d₁) - K Φ(d₂)
//! P  = K Φ(-d₂) - F Φ(-d₁)
//! ```
//! Greeks are obtained by the chain rule through `m` and `sd`; only `m`
//! depends on the spot, with `∂m/∂S = c/S`.

use super::formula::{first_vega_turn, ClosedForm};
use super::greeks::{Greeks, COLLAPSE_DEVIATION};
use super::inputs::{Feature, Point};
use crate::error::{validation::*, PricingResult};
use crate::math_utils::{norm_cdf, norm_pdf};

pub(crate) const FEATURES: [Feature; 4] = [
    Feature::LogMoneyness,
    Feature::AverageLogMoneyness,
    Feature::ExpiryTime,
    Feature::Volatility,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsAsian {
    strike: f64,
    call: bool,
    maturity: f64,
}

/// Price and the partial derivatives of the price in `m` and `sd`
struct Moments {
    price: f64,
    /// ∂V/∂m
    by_mean: f64,
    /// ∂²V/∂m²
    by_mean2: f64,
    /// ∂V/∂sd
    by_deviation: f64,
}

impl BsAsian {
    /// `maturity` is the length of the averaging window.
    pub fn new(strike: f64, call: bool, maturity: f64) -> PricingResult<Self> {
        validate_positive("strike", strike)?;
        validate_positive("maturity", maturity)?;
        Ok(BsAsian {
            strike,
            call,
            maturity,
        })
    }

    pub fn is_call(&self) -> bool {
        self.call
    }

    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    fn moments(&self, mean: f64, deviation: f64) -> Moments {
        let k = self.strike;

        if deviation < COLLAPSE_DEVIATION {
            let forward = k * mean.exp();
            let itm = mean >= 0.0;
            let (price, by_mean) = if self.call {
                ((forward - k).max(0.0), if itm { forward } else { 0.0 })
            } else {
                ((k - forward).max(0.0), if itm { 0.0 } else { -forward })
            };
            return Moments {
                price,
                by_mean,
                by_mean2: by_mean,
                by_deviation: 0.0,
            };
        }

        let forward = k * (mean + 0.5 * deviation * deviation).exp();
        let d2 = mean / deviation;
        let d1 = d2 + deviation;
        let curvature = forward * norm_pdf(d1) / deviation;

        let (price, by_mean, by_deviation) = if self.call {
            (
                forward * norm_cdf(d1) - k * norm_cdf(d2),
                forward * norm_cdf(d1),
                forward * deviation * norm_cdf(d1) + k * norm_pdf(d2),
            )
        } else {
            (
                k * norm_cdf(-d2) - forward * norm_cdf(-d1),
                -forward * norm_cdf(-d1),
                -forward * deviation * norm_cdf(-d1) + k * norm_pdf(d2),
            )
        };

        Moments {
            price,
            by_mean,
            by_mean2: by_mean + curvature,
            by_deviation,
        }
    }
}

impl ClosedForm for BsAsian {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    fn validate_point(&self, point: &Point) -> PricingResult<()> {
        point.validate()?;
        validate_log_level("log_moneyness", self.strike, point.log_moneyness)?;
        validate_log_level(
            "average_log_moneyness",
            self.strike,
            point.average_log_moneyness,
        )?;
        validate_at_most("expiry_time", point.time_to_expiry, self.maturity)
    }

    /// The mean of the average falls as volatility grows, which can turn the
    /// call price down; the put gains from both effects and is monotone.
    fn volatility_turning_point(&self, point: &Point, lower: f64, upper: f64) -> f64 {
        if self.call {
            first_vega_turn(self, point, lower, upper)
        } else {
            upper
        }
    }

    fn greeks(&self, point: &Point) -> Greeks {
        let big_t = self.maturity;
        let t = point.time_to_expiry.min(big_t);
        let v = point.volatility;
        let s = point.log_moneyness;
        let a = point.average_log_moneyness;
        let spot = self.strike * s.exp();

        let remaining = t / big_t;
        let root3 = 3.0_f64.sqrt();
        let mean = a + remaining * (s - a) - v * v * t * t / (4.0 * big_t);
        let deviation = v * t.powf(1.5) / (big_t * root3);

        let mean_by_time = (s - a) / big_t - v * v * t / (2.0 * big_t);
        let mean_by_vol = -v * t * t / (2.0 * big_t);
        let deviation_by_time = 1.5 * v * t.sqrt() / (big_t * root3);
        let deviation_by_vol = t.powf(1.5) / (big_t * root3);

        let m = self.moments(mean, deviation);

        Greeks {
            price: m.price,
            delta: remaining * m.by_mean / spot,
            gamma: (remaining * remaining * m.by_mean2 - remaining * m.by_mean) / spot / spot,
            vega: m.by_mean * mean_by_vol + m.by_deviation * deviation_by_vol,
            theta: -(m.by_mean * mean_by_time + m.by_deviation * deviation_by_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::european::BsEuropean;
    use approx::assert_relative_eq;

    #[test]
    fn test_fresh_window_matches_adjusted_european() {
        for &call in &[true, false] {
            let asian = BsAsian::new(1.0, call, 1.0).unwrap();
            let european = BsEuropean::new(1.0, call).unwrap();
            let (v, big_t) = (0.3, 1.0);
            for &s in &[-0.2, 0.0, 0.15] {
                let a = asian.greeks(&Point::new(s, big_t, v)).price;
                let adjusted = Point::new(s - v * v * big_t / 12.0, big_t, v / 3.0_f64.sqrt());
                assert_relative_eq!(a, european.greeks(&adjusted).price, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_expiry_uses_realised_average() {
        let call = BsAsian::new(1.0, true, 0.5).unwrap();
        let p = Point::new(0.3, 0.0, 0.2).with_average(0.1);
        let g = call.greeks(&p);
        assert_eq!(g.price, (1.0 * 0.1_f64.exp() - 1.0).max(0.0));
        assert_eq!(g.delta, 0.0);
    }

    #[test]
    fn test_expiry_time_beyond_window_is_rejected() {
        let call = BsAsian::new(1.0, true, 0.5).unwrap();
        assert!(call.validate_point(&Point::new(0.0, 0.6, 0.2)).is_err());
        assert!(call.validate_point(&Point::new(0.0, 0.5, 0.2)).is_ok());
    }

    #[test]
    fn test_put_call_parity() {
        let call = BsAsian::new(1.0, true, 1.0).unwrap();
        let put = BsAsian::new(1.0, false, 1.0).unwrap();
        let p = Point::new(0.05, 0.4, 0.25).with_average(-0.02);
        let (c, q) = (call.greeks(&p), put.greeks(&p));
        let big_t = 1.0;
        let t = 0.4;
        let mean = -0.02 + (t / big_t) * (0.05 + 0.02) - 0.25 * 0.25 * t * t / (4.0 * big_t);
        let sd = 0.25 * f64::powf(t, 1.5) / (big_t * 3.0_f64.sqrt());
        let forward = (mean + 0.5 * sd * sd).exp();
        assert_relative_eq!(c.price - q.price, forward - 1.0, epsilon = 1e-10);
        assert_relative_eq!(
            c.delta - q.delta,
            (t / big_t) * forward / 0.05_f64.exp(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_greeks_against_finite_difference() {
        for &call in &[true, false] {
            let m = BsAsian::new(1.0, call, 1.0).unwrap();
            let average = 0.03;
            let at = |x: f64, t: f64, v: f64| {
                m.greeks(&Point::new(x.ln(), t, v).with_average(average)).price
            };
            let (spot, t, v): (f64, f64, f64) = (1.02, 0.6, 0.3);
            let g = m.greeks(&Point::new(spot.ln(), t, v).with_average(average));
            let h = 1e-5;
            assert_relative_eq!(
                g.delta,
                (at(spot + h, t, v) - at(spot - h, t, v)) / (2.0 * h),
                max_relative = 1e-6
            );
            assert_relative_eq!(
                g.gamma,
                (at(spot + h, t, v) - 2.0 * at(spot, t, v) + at(spot - h, t, v)) / (h * h),
                max_relative = 1e-3
            );
            let e = 1e-6;
            assert_relative_eq!(
                g.vega,
                (at(spot, t, v + e) - at(spot, t, v - e)) / (2.0 * e),
                max_relative = 1e-5
            );
            assert_relative_eq!(
                g.theta,
                -(at(spot, t + e, v) - at(spot, t - e, v)) / (2.0 * e),
                max_relative = 1e-5
            );
        }
    }
}

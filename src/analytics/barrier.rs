// src/analytics/barrier.rs
//! Down-and-out European barrier call
//!
//! # Method of images
//!
//! At zero rate the discounted price of any payoff `g(S_T)` that vanishes
//! below a down barrier `H` and is knocked out when the spot reaches `H` is
//! ```text
//! V(S) = f(S) - (S/H) f(H²/S)
//! ```
//! where `f` prices `g` without the barrier. For the call,
//! ```text
//! g(S_T) = (S_T - K)⁺ 1{S_T > H}
//! f      = C(S; K)                           if H ≤ K
//! f      = C(S; H) + (H - K) B(S; H)         if H > K
//! ```
//! with `C` the vanilla call and `B` the unit binary call. Differentiating the
//! image term (`u = H²/S`):
//! ```text
//! Δ = f'(S) - f(u)/H + (H/S) f'(u)
//! Γ = f''(S) - (H/S)³ f''(u)
//! ```
//! Vega and theta follow the price formula term by term.

use super::european::BsEuropean;
use super::european_binary::BsEuropeanBinary;
use super::formula::{first_vega_turn, ClosedForm};
use super::greeks::{Greeks, COLLAPSE_DEVIATION};
use super::inputs::{Feature, Point};
use crate::error::{validation::*, PricingError, PricingResult};

pub(crate) const FEATURES: [Feature; 4] = [
    Feature::LogMoneyness,
    Feature::MinLogMoneyness,
    Feature::ExpiryTime,
    Feature::Volatility,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsBarrier {
    strike: f64,
    barrier: f64,
    /// Vanilla call struck at `max(K, H)`
    vanilla: BsEuropean,
    /// Unit binary call struck at `H`
    binary: BsEuropeanBinary,
}

impl BsBarrier {
    /// Down-and-out call; `call = false` is rejected.
    pub fn new(strike: f64, barrier: f64, call: bool) -> PricingResult<Self> {
        if !call {
            return Err(PricingError::InvalidConfiguration {
                field: "call".to_string(),
                reason: "put is not supported for barrier options".to_string(),
            });
        }
        validate_positive("strike", strike)?;
        validate_positive("barrier", barrier)?;
        Ok(BsBarrier {
            strike,
            barrier,
            vanilla: BsEuropean::new(strike.max(barrier), true)?,
            binary: BsEuropeanBinary::new(barrier, true)?,
        })
    }

    pub fn barrier(&self) -> f64 {
        self.barrier
    }

    /// Greeks of the knock-out payoff without the barrier, at an arbitrary spot
    fn unbarriered(&self, spot: f64, point: &Point) -> Greeks {
        let (k, h) = (self.strike, self.barrier);
        let at = Point::new(
            (spot / self.vanilla.strike()).ln(),
            point.time_to_expiry,
            point.volatility,
        );
        let vanilla = self.vanilla.greeks(&at);
        if h <= k {
            return vanilla;
        }

        let binary = self.binary.greeks(&at).scaled(h - k);
        Greeks {
            price: vanilla.price + binary.price,
            delta: vanilla.delta + binary.delta,
            gamma: vanilla.gamma + binary.gamma,
            vega: vanilla.vega + binary.vega,
            theta: vanilla.theta + binary.theta,
        }
    }
}

impl ClosedForm for BsBarrier {
    fn features(&self) -> &'static [Feature] {
        &FEATURES
    }

    fn strike(&self) -> f64 {
        self.strike
    }

    /// More volatility makes a knock-out likelier, so the price rises and
    /// then falls in volatility.
    fn volatility_turning_point(&self, point: &Point, lower: f64, upper: f64) -> f64 {
        first_vega_turn(self, point, lower, upper)
    }

    /// Worth nothing once the running min has reached the barrier.
    fn greeks(&self, point: &Point) -> Greeks {
        let (k, h) = (self.strike, self.barrier);
        let spot = k * point.log_moneyness.exp();

        if k * point.running_min().exp() <= h {
            return Greeks::default();
        }
        if point.total_deviation() < COLLAPSE_DEVIATION {
            let itm = point.log_moneyness >= 0.0;
            return Greeks::intrinsic((spot - k).max(0.0), if itm { 1.0 } else { 0.0 });
        }

        let direct = self.unbarriered(spot, point);
        let image = self.unbarriered(h * h / spot, point);
        let ratio = spot / h;

        Greeks {
            price: direct.price - ratio * image.price,
            delta: direct.delta - image.price / h + image.delta / ratio,
            gamma: direct.gamma - image.gamma / ratio.powi(3),
            vega: direct.vega - ratio * image.vega,
            theta: direct.theta - ratio * image.theta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(m: &BsBarrier, spot: f64, t: f64, v: f64) -> Greeks {
        m.greeks(&Point::new((spot / m.strike()).ln(), t, v))
    }

    #[test]
    fn test_put_is_rejected() {
        assert!(BsBarrier::new(1.0, 0.9, false).is_err());
        assert!(BsBarrier::new(1.0, 0.0, true).is_err());
    }

    #[test]
    fn test_far_barrier_matches_vanilla() {
        let barrier = BsBarrier::new(1.0, 1e-3, true).unwrap();
        let vanilla = BsEuropean::default();
        let p = Point::new(0.05, 1.0, 0.2);
        assert_relative_eq!(barrier.greeks(&p).price, vanilla.greeks(&p).price, epsilon = 1e-12);
        assert_relative_eq!(barrier.greeks(&p).delta, vanilla.greeks(&p).delta, epsilon = 1e-9);
    }

    #[test]
    fn test_vanishes_at_barrier() {
        for &h in &[0.9, 1.1] {
            let m = BsBarrier::new(1.0, h, true).unwrap();
            let near = at(&m, h * (1.0 + 1e-10), 0.5, 0.2);
            assert!(near.price.abs() < 1e-8);
            assert_eq!(at(&m, h * 0.999, 0.5, 0.2).price, 0.0);
        }
    }

    #[test]
    fn test_knocked_out_by_running_min() {
        let m = BsBarrier::new(1.0, 0.9, true).unwrap();
        let p = Point::new(0.1, 0.5, 0.2).with_min(f64::ln(0.85));
        assert_eq!(m.greeks(&p), Greeks::default());
    }

    #[test]
    fn test_below_vanilla() {
        let m = BsBarrier::new(1.0, 0.95, true).unwrap();
        let vanilla = BsEuropean::default();
        let p = Point::new(0.02, 1.0, 0.3);
        let knocked = m.greeks(&p).price;
        assert!(knocked > 0.0 && knocked < vanilla.greeks(&p).price);
    }

    #[test]
    fn test_greeks_against_finite_difference() {
        for &h in &[0.9, 1.05] {
            let m = BsBarrier::new(1.0, h, true).unwrap();
            let (spot, t, v) = (1.1, 0.5, 0.25);
            let g = at(&m, spot, t, v);
            let d = 1e-5;
            let price = |x: f64, t: f64, v: f64| at(&m, x, t, v).price;
            assert_relative_eq!(
                g.delta,
                (price(spot + d, t, v) - price(spot - d, t, v)) / (2.0 * d),
                max_relative = 1e-6
            );
            assert_relative_eq!(
                g.gamma,
                (price(spot + d, t, v) - 2.0 * price(spot, t, v) + price(spot - d, t, v)) / (d * d),
                max_relative = 1e-3,
                epsilon = 1e-4
            );
            let e = 1e-6;
            assert_relative_eq!(
                g.vega,
                (price(spot, t, v + e) - price(spot, t, v - e)) / (2.0 * e),
                max_relative = 1e-5
            );
            assert_relative_eq!(
                g.theta,
                -(price(spot, t + e, v) - price(spot, t - e, v)) / (2.0 * e),
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn test_expiry_is_intrinsic() {
        let m = BsBarrier::new(1.0, 0.9, true).unwrap();
        let s = 1.2_f64.ln();
        let g = m.greeks(&Point::new(s, 0.0, 0.2));
        assert_eq!(g.price, (1.0 * s.exp() - 1.0).max(0.0));
    }
}

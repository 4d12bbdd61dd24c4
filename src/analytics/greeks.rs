// src/analytics/greeks.rs
use bitflags::bitflags;
use ndarray::ArrayD;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GreekSet: u32 {
        const NONE  = 0;
        const PRICE = 1 << 0;
        const DELTA = 1 << 1;
        const GAMMA = 1 << 2;
        const VEGA  = 1 << 3;
        const THETA = 1 << 4;
        const ALL   = Self::PRICE.bits()
            | Self::DELTA.bits()
            | Self::GAMMA.bits()
            | Self::VEGA.bits()
            | Self::THETA.bits();
    }
}

/// Below this total deviation `v·√t` a formula collapses to its intrinsic value
pub const COLLAPSE_DEVIATION: f64 = f64::EPSILON;

/// Price and sensitivities of one element
///
/// - `delta`: ∂V/∂S
/// - `gamma`: ∂²V/∂S²
/// - `vega`: ∂V/∂σ
/// - `theta`: −∂V/∂t, the change per unit of calendar time
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

impl Greeks {
    /// Greeks of a payoff with value `price` and slope `delta` and nothing else
    pub fn intrinsic(price: f64, delta: f64) -> Self {
        Greeks {
            price,
            delta,
            ..Default::default()
        }
    }

    pub fn get(&self, which: GreekSet) -> f64 {
        if which == GreekSet::PRICE {
            self.price
        } else if which == GreekSet::DELTA {
            self.delta
        } else if which == GreekSet::GAMMA {
            self.gamma
        } else if which == GreekSet::VEGA {
            self.vega
        } else if which == GreekSet::THETA {
            self.theta
        } else {
            f64::NAN
        }
    }

    pub(crate) fn scaled(self, factor: f64) -> Self {
        Greeks {
            price: self.price * factor,
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            vega: self.vega * factor,
            theta: self.theta * factor,
        }
    }
}

/// Arrays of the greeks requested from a batch evaluation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GreekArrays {
    pub price: Option<ArrayD<f64>>,
    pub delta: Option<ArrayD<f64>>,
    pub gamma: Option<ArrayD<f64>>,
    pub vega: Option<ArrayD<f64>>,
    pub theta: Option<ArrayD<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greek_set_all() {
        assert!(GreekSet::ALL.contains(GreekSet::PRICE | GreekSet::THETA));
        assert_eq!(GreekSet::ALL.bits(), 0b11111);
        assert!(GreekSet::NONE.is_empty());
    }

    #[test]
    fn test_get_single_greek() {
        let g = Greeks {
            price: 1.0,
            delta: 2.0,
            gamma: 3.0,
            vega: 4.0,
            theta: 5.0,
        };
        assert_eq!(g.get(GreekSet::GAMMA), 3.0);
        assert!(g.get(GreekSet::PRICE | GreekSet::DELTA).is_nan());
    }
}

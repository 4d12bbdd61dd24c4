// src/analytics/formula.rs
//! Formula dispatch and batched evaluation
//!
//! Each option family implements [`ClosedForm`] for a single element. The
//! closed [`BlackScholes`] enum selects the family by explicit `match` and
//! lifts the per-element formulas to arrays: it gathers the columns the
//! family needs from an [`Inputs`], broadcasts them, validates every element
//! and evaluates them in parallel with Rayon.
//!
//! Output arrays have the broadcast shape of the inputs, so inputs of shape
//! `(N, M, 1)` give outputs of shape `(N, M, 1)`.

use super::american_binary::BsAmericanBinary;
use super::asian::BsAsian;
use super::barrier::BsBarrier;
use super::european::BsEuropean;
use super::european_binary::BsEuropeanBinary;
use super::greeks::{GreekArrays, GreekSet, Greeks};
use super::inputs::{Feature, Inputs, Point};
use super::lookback::BsLookback;
use crate::error::{validation::validate_log_level, PricingError, PricingResult};
use crate::solvers::bisect::{bisect_scalar, BisectConfig};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use rayon::prelude::*;

/// Closed-form price and greeks of one option family
pub trait ClosedForm {
    /// Input columns in the order a feature tensor lists them
    fn features(&self) -> &'static [Feature];

    fn strike(&self) -> f64;

    /// Price and greeks at one point. The point is assumed valid.
    fn greeks(&self, point: &Point) -> Greeks;

    /// Reject points the formulas cannot evaluate, including log-moneyness
    /// for which the spot `K·eˢ` underflows to zero or overflows.
    fn validate_point(&self, point: &Point) -> PricingResult<()> {
        point.validate()?;
        validate_log_level("log_moneyness", self.strike(), point.log_moneyness)
    }

    /// Volatility at which the price first turns in volatility when searched
    /// upwards from `lower`, or `upper` if it is monotone on `[lower, upper]`.
    /// Implied volatility is solved below this point.
    fn volatility_turning_point(&self, _point: &Point, _lower: f64, upper: f64) -> f64 {
        upper
    }
}

/// Black-Scholes formula of one of the supported option families
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlackScholes {
    European(BsEuropean),
    EuropeanBinary(BsEuropeanBinary),
    AmericanBinary(BsAmericanBinary),
    Barrier(BsBarrier),
    Lookback(BsLookback),
    Asian(BsAsian),
}

macro_rules! dispatch {
    ($self:expr, $formula:ident => $body:expr) => {
        match $self {
            BlackScholes::European($formula) => $body,
            BlackScholes::EuropeanBinary($formula) => $body,
            BlackScholes::AmericanBinary($formula) => $body,
            BlackScholes::Barrier($formula) => $body,
            BlackScholes::Lookback($formula) => $body,
            BlackScholes::Asian($formula) => $body,
        }
    };
}

impl BlackScholes {
    pub fn european(strike: f64, call: bool) -> PricingResult<Self> {
        BsEuropean::new(strike, call).map(BlackScholes::European)
    }

    pub fn european_binary(strike: f64, call: bool) -> PricingResult<Self> {
        BsEuropeanBinary::new(strike, call).map(BlackScholes::EuropeanBinary)
    }

    pub fn american_binary(strike: f64, call: bool) -> PricingResult<Self> {
        BsAmericanBinary::new(strike, call).map(BlackScholes::AmericanBinary)
    }

    pub fn barrier(strike: f64, barrier: f64, call: bool) -> PricingResult<Self> {
        BsBarrier::new(strike, barrier, call).map(BlackScholes::Barrier)
    }

    pub fn lookback(strike: f64, call: bool) -> PricingResult<Self> {
        BsLookback::new(strike, call).map(BlackScholes::Lookback)
    }

    pub fn asian(strike: f64, call: bool, maturity: f64) -> PricingResult<Self> {
        BsAsian::new(strike, call, maturity).map(BlackScholes::Asian)
    }

    pub fn features(&self) -> Vec<Feature> {
        self.feature_slice().to_vec()
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.feature_slice().iter().map(Feature::name).collect()
    }

    pub fn strike(&self) -> f64 {
        dispatch!(self, f => f.strike())
    }

    /// Length of the averaging window of an Asian formula
    pub fn averaging_window(&self) -> Option<f64> {
        match self {
            BlackScholes::Asian(asian) => Some(asian.maturity()),
            _ => None,
        }
    }

    pub(crate) fn feature_slice(&self) -> &'static [Feature] {
        dispatch!(self, f => f.features())
    }

    pub(crate) fn validate_point(&self, point: &Point) -> PricingResult<()> {
        dispatch!(self, f => f.validate_point(point))
    }

    pub(crate) fn greeks_unchecked(&self, point: &Point) -> Greeks {
        dispatch!(self, f => f.greeks(point))
    }

    pub(crate) fn volatility_turning_point(&self, point: &Point, lower: f64, upper: f64) -> f64 {
        dispatch!(self, f => f.volatility_turning_point(point, lower, upper))
    }

    /// Price and greeks of a single element
    pub fn greeks_at(&self, point: &Point) -> PricingResult<Greeks> {
        self.validate_point(point)?;
        Ok(self.greeks_unchecked(point))
    }

    /// Evaluate the greeks selected by `which` in one pass over the inputs.
    pub fn evaluate(&self, inputs: &Inputs, which: GreekSet) -> PricingResult<GreekArrays> {
        let gathered = inputs.gather(self.feature_slice(), &[])?;
        let greeks = self.evaluate_points(&gathered.points)?;
        let shape = gathered.shape;

        let collect = |flag: GreekSet| -> PricingResult<Option<ArrayD<f64>>> {
            if !which.contains(flag) {
                return Ok(None);
            }
            let values = greeks.iter().map(|g| g.get(flag)).collect();
            to_array(&shape, values).map(Some)
        };

        Ok(GreekArrays {
            price: collect(GreekSet::PRICE)?,
            delta: collect(GreekSet::DELTA)?,
            gamma: collect(GreekSet::GAMMA)?,
            vega: collect(GreekSet::VEGA)?,
            theta: collect(GreekSet::THETA)?,
        })
    }

    pub fn price(&self, inputs: &Inputs) -> PricingResult<ArrayD<f64>> {
        self.single(inputs, GreekSet::PRICE)
    }

    pub fn delta(&self, inputs: &Inputs) -> PricingResult<ArrayD<f64>> {
        self.single(inputs, GreekSet::DELTA)
    }

    pub fn gamma(&self, inputs: &Inputs) -> PricingResult<ArrayD<f64>> {
        self.single(inputs, GreekSet::GAMMA)
    }

    pub fn vega(&self, inputs: &Inputs) -> PricingResult<ArrayD<f64>> {
        self.single(inputs, GreekSet::VEGA)
    }

    pub fn theta(&self, inputs: &Inputs) -> PricingResult<ArrayD<f64>> {
        self.single(inputs, GreekSet::THETA)
    }

    /// Delta of a feature tensor: `(…, H_in)` with the columns of
    /// [`features`](Self::features) along the last axis gives `(…, 1)`.
    pub fn forward(&self, x: ArrayViewD<f64>) -> PricingResult<ArrayD<f64>> {
        let inputs = Inputs::from_feature_tensor(self.feature_slice(), x)?;
        let delta = self.delta(&inputs)?;
        let last = delta.ndim();
        Ok(delta.insert_axis(Axis(last)))
    }

    fn single(&self, inputs: &Inputs, which: GreekSet) -> PricingResult<ArrayD<f64>> {
        let gathered = inputs.gather(self.feature_slice(), &[])?;
        let values = self
            .evaluate_points(&gathered.points)?
            .into_iter()
            .map(|g| g.get(which))
            .collect();
        to_array(&gathered.shape, values)
    }

    fn evaluate_points(&self, points: &[Point]) -> PricingResult<Vec<Greeks>> {
        points.par_iter().try_for_each(|p| self.validate_point(p))?;
        Ok(points.par_iter().map(|p| self.greeks_unchecked(p)).collect())
    }
}

/// Grid points per search for a turn in vega
const TURN_GRID: usize = 128;
/// Vega below this size carries no sign
const VEGA_FLOOR: f64 = 1e-14;

/// First volatility in `[lower, upper]` where the vega of `formula` changes
/// sign, or `upper` when it keeps one sign.
///
/// Vega is scanned on a geometric grid and the sign change refined by
/// bisection. Grid points where vega vanishes to rounding are skipped, so a
/// price that is flat at low volatility takes the sign of its first move.
pub(crate) fn first_vega_turn<F>(formula: &F, point: &Point, lower: f64, upper: f64) -> f64
where
    F: ClosedForm + ?Sized,
{
    let vega = |v: f64| formula.greeks(&point.with_volatility(v)).vega;
    let sign = |v: f64| {
        let g = vega(v);
        if g.abs() <= VEGA_FLOOR {
            0.0
        } else {
            g.signum()
        }
    };

    let start = lower.max(upper * 1e-12);
    let ratio = (upper / start).powf(1.0 / TURN_GRID as f64);
    let mut direction = sign(start);
    let mut last_signed = start;

    for i in 1..=TURN_GRID {
        let v = if i == TURN_GRID {
            upper
        } else {
            start * ratio.powi(i as i32)
        };
        let here = sign(v);
        if here == 0.0 {
            continue;
        }
        if direction == 0.0 {
            direction = here;
        } else if here != direction {
            let config = BisectConfig {
                precision: 1e-12 * v,
                max_iterations: 200,
            };
            return bisect_scalar(&vega, 0.0, last_signed, v, &config).unwrap_or(v);
        }
        last_signed = v;
    }
    upper
}

pub(crate) fn to_array(shape: &[usize], values: Vec<f64>) -> PricingResult<ArrayD<f64>> {
    let found = vec![values.len()];
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| PricingError::ShapeMismatch {
        expected: shape.to_vec(),
        found,
    })
}

impl From<BsEuropean> for BlackScholes {
    fn from(formula: BsEuropean) -> Self {
        BlackScholes::European(formula)
    }
}

impl From<BsEuropeanBinary> for BlackScholes {
    fn from(formula: BsEuropeanBinary) -> Self {
        BlackScholes::EuropeanBinary(formula)
    }
}

impl From<BsAmericanBinary> for BlackScholes {
    fn from(formula: BsAmericanBinary) -> Self {
        BlackScholes::AmericanBinary(formula)
    }
}

impl From<BsBarrier> for BlackScholes {
    fn from(formula: BsBarrier) -> Self {
        BlackScholes::Barrier(formula)
    }
}

impl From<BsLookback> for BlackScholes {
    fn from(formula: BsLookback) -> Self {
        BlackScholes::Lookback(formula)
    }
}

impl From<BsAsian> for BlackScholes {
    fn from(formula: BsAsian) -> Self {
        BlackScholes::Asian(formula)
    }
}

// src/analytics/inputs.rs
//! Normalised pricing coordinates
//!
//! Every formula is written in terms of
//! ```text
//! s = ln(S/K)     log-moneyness
//! t               time to expiry
//! v               volatility
//! ```
//! plus, for path-dependent payoffs, one running path state expressed in the
//! same log-moneyness units (running max, running min or running geometric
//! average). Callers pass these as named array columns; a formula picks the
//! columns listed by its `features()`, broadcasts them to a common shape and
//! evaluates one [`Point`] per element.

use crate::error::{validation::*, PricingError, PricingResult};
use ndarray::{ArrayView, ArrayViewD, Axis, Dimension, IxDyn};
use std::fmt;

/// Named input coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    LogMoneyness,
    MaxLogMoneyness,
    MinLogMoneyness,
    AverageLogMoneyness,
    ExpiryTime,
    Volatility,
    PrevHedge,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::LogMoneyness => "log_moneyness",
            Feature::MaxLogMoneyness => "max_log_moneyness",
            Feature::MinLogMoneyness => "min_log_moneyness",
            Feature::AverageLogMoneyness => "average_log_moneyness",
            Feature::ExpiryTime => "expiry_time",
            Feature::Volatility => "volatility",
            Feature::PrevHedge => "prev_hedge",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        match name {
            "log_moneyness" => Some(Feature::LogMoneyness),
            "max_log_moneyness" => Some(Feature::MaxLogMoneyness),
            "min_log_moneyness" => Some(Feature::MinLogMoneyness),
            "average_log_moneyness" => Some(Feature::AverageLogMoneyness),
            "expiry_time" => Some(Feature::ExpiryTime),
            "volatility" => Some(Feature::Volatility),
            "prev_hedge" => Some(Feature::PrevHedge),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinates of a single element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub log_moneyness: f64,
    pub max_log_moneyness: f64,
    pub min_log_moneyness: f64,
    pub average_log_moneyness: f64,
    pub time_to_expiry: f64,
    pub volatility: f64,
}

impl Point {
    /// Point whose path states all equal the current log-moneyness
    pub fn new(log_moneyness: f64, time_to_expiry: f64, volatility: f64) -> Self {
        Point {
            log_moneyness,
            max_log_moneyness: log_moneyness,
            min_log_moneyness: log_moneyness,
            average_log_moneyness: log_moneyness,
            time_to_expiry,
            volatility,
        }
    }

    pub fn with_max(mut self, max_log_moneyness: f64) -> Self {
        self.max_log_moneyness = max_log_moneyness;
        self
    }

    pub fn with_min(mut self, min_log_moneyness: f64) -> Self {
        self.min_log_moneyness = min_log_moneyness;
        self
    }

    pub fn with_average(mut self, average_log_moneyness: f64) -> Self {
        self.average_log_moneyness = average_log_moneyness;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Set the coordinate named by `feature`; `prev_hedge` is not part of a point
    pub fn set(&mut self, feature: Feature, value: f64) {
        match feature {
            Feature::LogMoneyness => self.log_moneyness = value,
            Feature::MaxLogMoneyness => self.max_log_moneyness = value,
            Feature::MinLogMoneyness => self.min_log_moneyness = value,
            Feature::AverageLogMoneyness => self.average_log_moneyness = value,
            Feature::ExpiryTime => self.time_to_expiry = value,
            Feature::Volatility => self.volatility = value,
            Feature::PrevHedge => {}
        }
    }

    /// Total standard deviation of log returns to expiry, `v·√t`
    pub fn total_deviation(&self) -> f64 {
        self.volatility * self.time_to_expiry.sqrt()
    }

    /// Running max, never below the current log-moneyness
    pub fn running_max(&self) -> f64 {
        self.max_log_moneyness.max(self.log_moneyness)
    }

    /// Running min, never above the current log-moneyness
    pub fn running_min(&self) -> f64 {
        self.min_log_moneyness.min(self.log_moneyness)
    }

    pub fn validate(&self) -> PricingResult<()> {
        validate_finite("log_moneyness", self.log_moneyness)?;
        validate_finite("max_log_moneyness", self.max_log_moneyness)?;
        validate_finite("min_log_moneyness", self.min_log_moneyness)?;
        validate_finite("average_log_moneyness", self.average_log_moneyness)?;
        validate_non_negative("expiry_time", self.time_to_expiry)?;
        validate_non_negative("volatility", self.volatility)?;
        Ok(())
    }
}

/// Named array columns supplied by a caller
#[derive(Clone, Debug, Default)]
pub struct Inputs<'a> {
    columns: Vec<(Feature, ArrayViewD<'a, f64>)>,
}

/// Columns gathered for one formula, broadcast and flattened
#[derive(Clone, Debug)]
pub(crate) struct Gathered {
    pub shape: Vec<usize>,
    pub points: Vec<Point>,
    pub prev_hedge: Vec<f64>,
}

impl<'a> Inputs<'a> {
    pub fn new() -> Self {
        Inputs {
            columns: Vec::new(),
        }
    }

    /// Add or replace the column for `feature`
    pub fn with<D: Dimension>(mut self, feature: Feature, values: ArrayView<'a, f64, D>) -> Self {
        let values = values.into_dyn();
        match self.columns.iter_mut().find(|(f, _)| *f == feature) {
            Some(slot) => slot.1 = values,
            None => self.columns.push((feature, values)),
        }
        self
    }

    /// Split a `(…, H_in)` tensor along its last axis into the named columns
    pub fn from_feature_tensor(
        features: &[Feature],
        x: ArrayViewD<'a, f64>,
    ) -> PricingResult<Self> {
        let last = match x.ndim() {
            0 => {
                return Err(PricingError::ShapeMismatch {
                    expected: vec![features.len()],
                    found: Vec::new(),
                })
            }
            n => n - 1,
        };
        if x.len_of(Axis(last)) != features.len() {
            let mut expected = x.shape().to_vec();
            expected[last] = features.len();
            return Err(PricingError::ShapeMismatch {
                expected,
                found: x.shape().to_vec(),
            });
        }

        let mut inputs = Inputs::new();
        for (i, feature) in features.iter().enumerate() {
            inputs = inputs.with(*feature, x.clone().index_axis_move(Axis(last), i));
        }
        Ok(inputs)
    }

    pub fn get(&self, feature: Feature) -> Option<&ArrayViewD<'a, f64>> {
        self.columns
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, values)| values)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.get(feature).is_some()
    }

    fn require(&self, feature: Feature) -> PricingResult<&ArrayViewD<'a, f64>> {
        self.get(feature).ok_or_else(|| PricingError::InvalidConfiguration {
            field: feature.name().to_string(),
            reason: "required input is missing".to_string(),
        })
    }

    /// Broadcast the listed columns (plus any `extra` shapes) and flatten them
    /// into points in logical (row-major) order.
    pub(crate) fn gather(
        &self,
        features: &[Feature],
        extra: &[&[usize]],
    ) -> PricingResult<Gathered> {
        let columns = features
            .iter()
            .map(|&f| self.require(f).map(|values| (f, values)))
            .collect::<PricingResult<Vec<_>>>()?;

        let mut shapes: Vec<&[usize]> = columns.iter().map(|(_, v)| v.shape()).collect();
        shapes.extend_from_slice(extra);
        let shape = broadcast_shape(&shapes)?;
        let len: usize = shape.iter().product();

        let log_moneyness = broadcast_to(self.require(Feature::LogMoneyness)?, &shape)?;
        let mut points: Vec<Point> = log_moneyness
            .iter()
            .map(|&s| Point::new(s, 0.0, 0.0))
            .collect();
        let mut prev_hedge = Vec::new();

        for (feature, values) in columns {
            let values = broadcast_to(values, &shape)?;
            match feature {
                Feature::LogMoneyness => {}
                Feature::PrevHedge => prev_hedge = values.iter().copied().collect(),
                _ => points
                    .iter_mut()
                    .zip(values.iter())
                    .for_each(|(p, &x)| p.set(feature, x)),
            }
        }
        debug_assert_eq!(points.len(), len);

        Ok(Gathered {
            shape,
            points,
            prev_hedge,
        })
    }
}

fn broadcast_to<'v>(
    values: &'v ArrayViewD<'_, f64>,
    shape: &[usize],
) -> PricingResult<ArrayViewD<'v, f64>> {
    values
        .broadcast(IxDyn(shape))
        .ok_or_else(|| PricingError::ShapeMismatch {
            expected: shape.to_vec(),
            found: values.shape().to_vec(),
        })
}

/// Common shape of several arrays under NumPy broadcasting rules
pub fn broadcast_shape(shapes: &[&[usize]]) -> PricingResult<Vec<usize>> {
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; ndim];

    for shape in shapes {
        let offset = ndim - shape.len();
        for (axis, &len) in shape.iter().enumerate() {
            let slot = &mut out[offset + axis];
            if *slot == 1 {
                *slot = len;
            } else if len != 1 && len != *slot {
                return Err(PricingError::ShapeMismatch {
                    expected: out.clone(),
                    found: shape.to_vec(),
                });
            }
        }
    }
    Ok(out)
}

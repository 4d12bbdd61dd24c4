// src/analytics/mod.rs
//! Closed-form Black-Scholes analytics at zero interest rate

pub mod american_binary;
pub mod asian;
pub mod barrier;
pub mod european;
pub mod european_binary;
pub mod formula;
pub mod greeks;
pub mod implied_vol;
pub mod inputs;
pub mod lookback;

pub use formula::{BlackScholes, ClosedForm};
pub use greeks::{GreekArrays, GreekSet, Greeks};
pub use implied_vol::ImpliedVolConfig;
pub use inputs::{Feature, Inputs, Point};

//! # fast-hedge: Closed-Form Pricing and Hedging for Derivatives Research
//!
//! A Rust library of Black-Scholes analytics at zero interest rate, implied
//! volatility inversion and hedging strategies, with a Monte Carlo harness to
//! measure what a strategy costs on simulated paths.
//!
//! ## Key Features
//!
//! - **Closed-form greeks**: price, delta, gamma, vega and theta for European,
//!   European binary, American binary, barrier, lookback and geometric Asian options
//! - **Array evaluation**: NumPy-style broadcasting over `ndarray` inputs, parallel with Rayon
//! - **Implied volatility**: element-wise bisection over whole arrays
//! - **Hedging**: Black-Scholes delta and the Whalley-Wilmott no-transaction band
//! - **Reproducible simulation**: one seeded generator per path
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_hedge::analytics::{BlackScholes, Feature, Inputs, ImpliedVolConfig};
//! use ndarray::arr1;
//!
//! let call = BlackScholes::european(1.0, true)?;
//!
//! let s = arr1(&[-0.1, 0.0, 0.1]); // log-moneyness ln(S/K)
//! let t = arr1(&[0.5, 0.5, 0.5]);
//! let v = arr1(&[0.2, 0.2, 0.2]);
//! let inputs = Inputs::new()
//!     .with(Feature::LogMoneyness, s.view())
//!     .with(Feature::ExpiryTime, t.view())
//!     .with(Feature::Volatility, v.view());
//!
//! let price = call.price(&inputs)?;
//! let iv = call.implied_volatility(&inputs, price.view(), &ImpliedVolConfig::default())?;
//! assert!(iv.iter().all(|x| (x - 0.2).abs() < 1e-6));
//! # Ok::<(), fast_hedge::PricingError>(())
//! ```
//!
//! ## Mathematical Foundation
//!
//! Every formula is written in normalised coordinates: log-moneyness
//! `s = ln(S/K)`, time to expiry `t` and volatility `σ`, plus a running path
//! state for path-dependent payoffs. Greeks are taken with respect to the
//! spot `S`, volatility and calendar time.

pub mod analytics;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod rng;
pub mod solvers;
pub mod strategies;

pub use analytics::{BlackScholes, Feature, GreekSet, Greeks, Inputs, Point};
pub use error::{PricingError, PricingResult};
pub use strategies::{HedgeStrategy, WhalleyWilmott};

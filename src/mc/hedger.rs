// src/mc/hedger.rs
//! Monte Carlo evaluation of hedging strategies
//!
//! # Hedging P&L
//!
//! A short position in the liability is hedged by trading the underlying on
//! the simulation dates `t₀ < t₁ < … < t_n`. With `hᵢ` the position held over
//! `[tᵢ, tᵢ₊₁]` (starting flat, `h₋₁ = 0`) and proportional cost `c`:
//! ```text
//! P&L = Σ hᵢ (Sᵢ₊₁ - Sᵢ) - c Σ |hᵢ - hᵢ₋₁| Sᵢ - payoff
//! ```
//! The payoff is the liability's closed-form price at zero time to expiry,
//! evaluated on the terminal path state.
//!
//! # Hedging cost
//!
//! The cost of a strategy is the amount of cash that makes its expected P&L
//! zero, `-E[P&L]`. For Black-Scholes delta hedging without transaction
//! costs it converges to the closed-form price as the steps get finer.

use crate::analytics::{BlackScholes, Point};
use crate::error::{validation::*, PricingError, PricingResult};
use crate::mc::paths::{draw_increments, path_from_draws};
use crate::rng::RngFactory;
use crate::strategies::HedgeStrategy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const MAX_PATHS: usize = 100_000_000;
const MAX_STEPS: usize = 1_000_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HedgeConfig {
    pub paths: usize,
    pub steps: usize,
    pub s0: f64,
    pub sigma: f64,
    pub maturity: f64,
    /// Proportional transaction cost of the underlying
    pub cost: f64,
    pub use_antithetic: bool,
}

impl HedgeConfig {
    /// Validate the simulation configuration
    pub fn validate(&self) -> PricingResult<()> {
        validate_count("paths", self.paths, MAX_PATHS)?;
        validate_count("steps", self.steps, MAX_STEPS)?;
        validate_positive("s0", self.s0)?;
        validate_positive("sigma", self.sigma)?;
        validate_positive("maturity", self.maturity)?;
        validate_non_negative("cost", self.cost)?;
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        self.maturity / self.steps as f64
    }
}

impl Default for HedgeConfig {
    fn default() -> Self {
        HedgeConfig {
            paths: 10_000,
            steps: 20,
            s0: 1.0,
            sigma: 0.2,
            maturity: 20.0 / 250.0,
            cost: 0.0,
            use_antithetic: false,
        }
    }
}

/// Path state in log-moneyness units
struct PathState {
    max: f64,
    min: f64,
    average: f64,
    integral: f64,
    elapsed: f64,
}

impl PathState {
    fn start(log_moneyness: f64) -> Self {
        PathState {
            max: log_moneyness,
            min: log_moneyness,
            average: log_moneyness,
            integral: 0.0,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` to a new log-moneyness; the average is the trapezoidal
    /// time average since the start of the path.
    fn advance(&mut self, previous: f64, current: f64, dt: f64) {
        self.max = self.max.max(current);
        self.min = self.min.min(current);
        self.integral += 0.5 * (previous + current) * dt;
        self.elapsed += dt;
        self.average = self.integral / self.elapsed;
    }

    fn point(&self, log_moneyness: f64, time_to_expiry: f64, volatility: f64) -> Point {
        Point::new(log_moneyness, time_to_expiry, volatility)
            .with_max(self.max)
            .with_min(self.min)
            .with_average(self.average)
    }
}

/// Expected hedging cost of `strategy` against a short `liability`.
///
/// Returns `(cost, variance_estimate)` where `variance_estimate` is the
/// sample variance of the P&L divided by the number of paths.
///
/// # Errors
///
/// - `InvalidParameters` / `InvalidConfiguration` for an invalid `cfg`
/// - `InvalidConfiguration` if an Asian liability's averaging window differs
///   from the simulated maturity
/// - `NumericalInstability` if any path P&L is not finite
pub fn hedge_cost<S>(
    liability: &BlackScholes,
    strategy: &S,
    cfg: &HedgeConfig,
    rngs: &RngFactory,
) -> PricingResult<(f64, f64)>
where
    S: HedgeStrategy + ?Sized,
{
    cfg.validate()?;
    if let Some(window) = liability.averaging_window() {
        if (window - cfg.maturity).abs() > 1e-12 * cfg.maturity {
            return Err(PricingError::InvalidConfiguration {
                field: "maturity".to_string(),
                reason: format!(
                    "simulated maturity {} differs from the averaging window {}",
                    cfg.maturity, window
                ),
            });
        }
    }

    info!(
        paths = cfg.paths,
        steps = cfg.steps,
        cost = cfg.cost,
        antithetic = cfg.use_antithetic,
        "simulating hedge"
    );

    let pnls = (0..cfg.paths)
        .into_par_iter()
        .map(|i| -> PricingResult<f64> {
            let mut rng = rngs.create_std_rng(i as u64);
            let draws = draw_increments(&mut rng, cfg.steps);

            let prices = path_from_draws(cfg.s0, cfg.sigma, cfg.dt(), &draws, 1.0);
            let pnl = path_pnl(&prices, liability, strategy, cfg)?;
            if !cfg.use_antithetic {
                return Ok(pnl);
            }
            let mirrored = path_from_draws(cfg.s0, cfg.sigma, cfg.dt(), &draws, -1.0);
            Ok(0.5 * (pnl + path_pnl(&mirrored, liability, strategy, cfg)?))
        })
        .collect::<PricingResult<Vec<f64>>>()?;

    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let sample_variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0);
    let variance_of_estimate = sample_variance / n;

    if !mean.is_finite() || !variance_of_estimate.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "hedge_cost".to_string(),
            reason: format!("mean P&L {} with variance {}", mean, variance_of_estimate),
        });
    }

    debug!(cost = -mean, variance_of_estimate, "hedge simulation finished");

    Ok((-mean, variance_of_estimate))
}

/// Hedging P&L of a short `liability` along one spot path
fn path_pnl<S>(
    prices: &[f64],
    liability: &BlackScholes,
    strategy: &S,
    cfg: &HedgeConfig,
) -> PricingResult<f64>
where
    S: HedgeStrategy + ?Sized,
{
    let strike = liability.strike();
    let dt = cfg.dt();
    let window = liability.averaging_window().unwrap_or(cfg.maturity);
    let log_moneyness: Vec<f64> = prices.iter().map(|s| (s / strike).ln()).collect();

    let mut state = PathState::start(log_moneyness[0]);
    let mut prev_hedge = 0.0;
    let mut pnl = 0.0;

    for i in 0..cfg.steps {
        if i > 0 {
            state.advance(log_moneyness[i - 1], log_moneyness[i], dt);
        }
        let time_to_expiry = (cfg.maturity - i as f64 * dt).max(0.0).min(window);
        let point = state.point(log_moneyness[i], time_to_expiry, cfg.sigma);

        let hedge = strategy.hedge_ratio(&point, prev_hedge)?;
        pnl += hedge * (prices[i + 1] - prices[i])
            - cfg.cost * (hedge - prev_hedge).abs() * prices[i];
        prev_hedge = hedge;
    }

    let last = cfg.steps;
    state.advance(log_moneyness[last - 1], log_moneyness[last], dt);
    let payoff = liability
        .greeks_at(&state.point(log_moneyness[last], 0.0, cfg.sigma))?
        .price;
    pnl -= payoff;

    if !pnl.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "hedge_cost".to_string(),
            reason: format!("non-finite path P&L (payoff {})", payoff),
        });
    }
    Ok(pnl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::WhalleyWilmott;

    #[test]
    fn test_config_validation() {
        assert!(HedgeConfig::default().validate().is_ok());
        let cfg = HedgeConfig {
            paths: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(PricingError::InvalidConfiguration { .. })));
        let cfg = HedgeConfig {
            cost: -1e-4,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(PricingError::InvalidParameters { .. })));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let cfg = HedgeConfig {
            cost: 1e-4,
            use_antithetic: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: HedgeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_path_state_tracks_extremes() {
        let mut state = PathState::start(0.0);
        state.advance(0.0, 0.2, 0.5);
        state.advance(0.2, -0.1, 0.5);
        assert_eq!(state.max, 0.2);
        assert_eq!(state.min, -0.1);
        // (0.5·(0 + 0.2) + 0.5·(0.2 - 0.1)) · 0.5 / 1.0
        assert!((state.average - 0.075).abs() < 1e-15);
    }

    #[test]
    fn test_asian_window_must_match_maturity() {
        let cfg = HedgeConfig::default();
        let liability = BlackScholes::asian(1.0, true, 2.0 * cfg.maturity).unwrap();
        let result = hedge_cost(&liability, &liability, &cfg, &RngFactory::default());
        assert!(matches!(result, Err(PricingError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_reproducible() {
        let cfg = HedgeConfig {
            paths: 500,
            cost: 1e-3,
            ..Default::default()
        };
        let liability = BlackScholes::european(1.0, true).unwrap();
        let ww = WhalleyWilmott::new(liability, cfg.cost).unwrap();
        let rngs = RngFactory::new(11);
        let first = hedge_cost(&liability, &ww, &cfg, &rngs).unwrap();
        let second = hedge_cost(&liability, &ww, &cfg, &rngs).unwrap();
        assert_eq!(first, second);
    }

    struct Unhedged;

    impl HedgeStrategy for Unhedged {
        fn features(&self) -> Vec<crate::analytics::Feature> {
            Vec::new()
        }

        fn hedge_ratio(&self, _point: &Point, _prev_hedge: f64) -> PricingResult<f64> {
            Ok(0.0)
        }
    }

    #[test]
    fn test_antithetic_reduces_variance() {
        let liability = BlackScholes::european(1.0, true).unwrap();
        let plain = HedgeConfig {
            paths: 2_000,
            steps: 1,
            ..Default::default()
        };
        let antithetic = HedgeConfig {
            use_antithetic: true,
            ..plain.clone()
        };
        let rngs = RngFactory::new(3);
        let (_, var_plain) = hedge_cost(&liability, &Unhedged, &plain, &rngs).unwrap();
        let (_, var_anti) = hedge_cost(&liability, &Unhedged, &antithetic, &rngs).unwrap();
        assert!(var_anti < var_plain, "{} vs {}", var_anti, var_plain);
    }
}

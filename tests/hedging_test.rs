// tests/hedging_test.rs
use fast_hedge::analytics::{BlackScholes, Feature, Point};
use fast_hedge::mc::{hedge_cost, HedgeConfig};
use fast_hedge::rng::RngFactory;
use fast_hedge::strategies::{HedgeStrategy, WhalleyWilmott};
use ndarray::Array3;

#[test]
fn test_delta_hedge_cost_matches_price() {
    let cfg = HedgeConfig::default();
    let call = BlackScholes::european(1.0, true).unwrap();
    let (cost, variance) = hedge_cost(&call, &call, &cfg, &RngFactory::new(42)).unwrap();

    let price = call.greeks_at(&Point::new(0.0, cfg.maturity, cfg.sigma)).unwrap().price;

    println!("\nHedge cost: {}", cost);
    println!("Closed-form price: {}", price);
    println!("Std error: {}", variance.sqrt());

    assert!((cost - price).abs() < 1e-3, "cost {} vs price {}", cost, price);
}

#[test]
fn test_whalley_wilmott_cheaper_than_delta_under_costs() {
    let cfg = HedgeConfig {
        cost: 1e-3,
        ..Default::default()
    };
    let call = BlackScholes::european(1.0, true).unwrap();
    let ww = WhalleyWilmott::new(call, cfg.cost).unwrap();
    let rngs = RngFactory::new(42);

    let (cost_bs, _) = hedge_cost(&call, &call, &cfg, &rngs).unwrap();
    let (cost_ww, _) = hedge_cost(&call, &ww, &cfg, &rngs).unwrap();

    println!("\nBlack-Scholes cost: {}", cost_bs);
    println!("Whalley-Wilmott cost: {}", cost_ww);

    assert!(cost_ww < cost_bs, "{} vs {}", cost_ww, cost_bs);
}

#[test]
fn test_lookback_delta_hedge() {
    // Discrete monitoring on 20 dates lowers the cost below the continuous price
    let cfg = HedgeConfig {
        paths: 20_000,
        ..Default::default()
    };
    let lookback = BlackScholes::lookback(1.03, true).unwrap();
    let (cost, _) = hedge_cost(&lookback, &lookback, &cfg, &RngFactory::new(42)).unwrap();

    let s = f64::ln(1.0 / 1.03);
    let continuous = lookback.greeks_at(&Point::new(s, cfg.maturity, cfg.sigma)).unwrap().price;

    println!("\nLookback hedge cost: {}", cost);
    println!("Continuous-monitoring price: {}", continuous);

    assert!((cost - 0.0177).abs() < 2e-3, "cost {}", cost);
    assert!(cost < continuous);
}

#[test]
fn test_whalley_wilmott_zero_gamma_is_delta() {
    // Deep in the money at expiry: gamma vanishes and the band collapses
    let call = BlackScholes::european(1.0, true).unwrap();
    let ww = WhalleyWilmott::new(call, 1e-2).unwrap();
    let point = Point::new(0.5, 0.0, 0.2);
    assert_eq!(ww.hedge_ratio(&point, 0.3).unwrap(), 1.0);
}

#[test]
fn test_whalley_wilmott_feature_tensor() {
    let call = BlackScholes::european(1.0, true).unwrap();
    let ww = WhalleyWilmott::new(call, 1e-3).unwrap();
    let features = HedgeStrategy::features(&ww);
    assert_eq!(
        features,
        vec![Feature::LogMoneyness, Feature::ExpiryTime, Feature::Volatility, Feature::PrevHedge]
    );

    // prev_hedge of 5 lies above every band: the target is the upper edge
    let mut x = Array3::<f64>::zeros((4, 6, 4));
    x.slice_mut(ndarray::s![.., .., 1]).fill(0.1);
    x.slice_mut(ndarray::s![.., .., 2]).fill(0.2);
    x.slice_mut(ndarray::s![.., .., 3]).fill(5.0);
    let out = ww.forward(x.view().into_dyn()).unwrap();
    assert_eq!(out.shape(), &[4, 6, 1]);

    let (_, upper) = ww.band(&Point::new(0.0, 0.1, 0.2)).unwrap();
    assert!(out.iter().all(|&h| h == upper));
}

#[test]
fn test_asian_hedge_runs_on_matching_window() {
    let cfg = HedgeConfig {
        paths: 2_000,
        ..Default::default()
    };
    let asian = BlackScholes::asian(1.0, true, cfg.maturity).unwrap();
    let (cost, _) = hedge_cost(&asian, &asian, &cfg, &RngFactory::new(5)).unwrap();

    let price = asian.greeks_at(&Point::new(0.0, cfg.maturity, cfg.sigma)).unwrap().price;
    println!("\nAsian hedge cost: {} vs price {}", cost, price);
    assert!((cost - price).abs() < 2e-3);
}

// tests/bisect_test.rs
use fast_hedge::solvers::{bisect, bisect_scalar, BisectConfig};
use fast_hedge::PricingError;
use ndarray::{Array1, ArrayView1};
use proptest::prelude::*;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn tanhshrink(x: f64) -> f64 {
    x - x.tanh()
}

fn assert_roots<F>(f: F, targets: Array1<f64>, config: &BisectConfig)
where
    F: Fn(f64) -> f64 + Copy,
{
    let roots = bisect(|x: ArrayView1<f64>| x.mapv(f), targets.view(), -6.0, 6.0, config)
        .expect("targets are bracketed");
    for (root, target) in roots.iter().zip(targets.iter()) {
        let error = (f(*root) - target).abs();
        assert!(error < 1e-4, "f({}) = {} vs target {}", root, f(*root), target);
    }
}

#[test]
fn test_bisect_increasing_and_decreasing() {
    let config = BisectConfig::default();
    assert_roots(sigmoid, Array1::linspace(0.1, 0.9, 10), &config);
    assert_roots(|x| -sigmoid(x), -Array1::linspace(0.1, 0.9, 10), &config);

    let capped = BisectConfig {
        max_iterations: 100,
        ..Default::default()
    };
    assert_roots(tanhshrink, Array1::linspace(-0.4, 0.4, 10), &capped);
    assert_roots(|x| -tanhshrink(x), -Array1::linspace(-0.4, 0.4, 10), &capped);
    assert_roots(f64::tanh, Array1::linspace(-0.9, 0.9, 10), &capped);
    assert_roots(|x| -x.tanh(), -Array1::linspace(-0.9, 0.9, 10), &capped);
}

#[test]
fn test_bisect_reversed_bracket() {
    let targets = Array1::linspace(0.1, 0.9, 10);
    let result = bisect(
        |x: ArrayView1<f64>| x.mapv(sigmoid),
        targets.view(),
        6.0,
        -6.0,
        &BisectConfig::default(),
    );
    assert!(matches!(result, Err(PricingError::InvalidConfiguration { .. })));
}

#[test]
fn test_bisect_zero_precision_never_converges() {
    let targets = Array1::linspace(0.1, 0.9, 10);
    let config = BisectConfig {
        precision: 0.0,
        max_iterations: 100,
    };
    let result = bisect(|x: ArrayView1<f64>| x.mapv(sigmoid), targets.view(), -6.0, 6.0, &config);
    match result {
        Err(PricingError::NonConvergence { iterations, .. }) => assert_eq!(iterations, 100),
        other => panic!("expected NonConvergence, got {:?}", other),
    }
}

#[test]
fn test_bisect_scalar_precision() {
    let config = BisectConfig {
        precision: 1e-10,
        ..Default::default()
    };
    let root = bisect_scalar(f64::exp, 2.0, -1.0, 3.0, &config).unwrap();
    assert!((root - std::f64::consts::LN_2).abs() < 1e-10);
}

#[test]
fn test_config_serde_round_trip() {
    let config = BisectConfig {
        precision: 1e-9,
        max_iterations: 500,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: BisectConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}

proptest! {
    #[test]
    fn prop_sigmoid_inverse(target in 0.01f64..0.99) {
        let root = bisect_scalar(sigmoid, target, -6.0, 6.0, &BisectConfig::default()).unwrap();
        // logit is the exact inverse; precision 1e-6 on x
        let exact = (target / (1.0 - target)).ln();
        prop_assert!((root - exact).abs() <= 1e-6);
    }
}

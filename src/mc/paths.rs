// src/mc/paths.rs
//! Spot paths under zero-drift geometric Brownian motion
//!
//! # Exact step
//!
//! At zero rate the spot follows `dS_t = σ S_t dW_t`, whose solution over one
//! step of length `dt` is
//! ```text
//! S_{t+dt} = S_t · exp(-σ²dt/2 + σ√dt · Z),   Z ~ N(0, 1)
//! ```
//! so paths carry no discretisation error at the sampled dates.

use crate::rng;
use rand::Rng;

/// Standard normal draws for one path of `steps` steps
pub fn draw_increments<R: Rng + ?Sized>(rng: &mut R, steps: usize) -> Vec<f64> {
    (0..steps).map(|_| rng::get_normal_draw(rng)).collect()
}

/// Path of `draws.len() + 1` spots starting at `s0`.
///
/// `sign = -1.0` gives the antithetic path of the same draws.
pub fn path_from_draws(s0: f64, sigma: f64, dt: f64, draws: &[f64], sign: f64) -> Vec<f64> {
    let drift = -0.5 * sigma * sigma * dt;
    let diffusion = sigma * dt.sqrt();

    let mut path = Vec::with_capacity(draws.len() + 1);
    let mut current = s0;
    path.push(current);
    for &z in draws {
        current *= (drift + diffusion * sign * z).exp();
        path.push(current);
    }
    path
}

/// Draw and build one path.
pub fn simulate_path<R: Rng + ?Sized>(
    rng: &mut R,
    s0: f64,
    sigma: f64,
    dt: f64,
    steps: usize,
) -> Vec<f64> {
    let draws = draw_increments(rng, steps);
    path_from_draws(s0, sigma, dt, &draws, 1.0)
}

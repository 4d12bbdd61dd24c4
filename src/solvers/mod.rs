// src/solvers/mod.rs
pub mod bisect;

pub use bisect::{bisect, bisect_scalar, bisect_within, BisectConfig};

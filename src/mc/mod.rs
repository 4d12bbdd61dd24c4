// src/mc/mod.rs
pub mod hedger;
pub mod paths;

pub use hedger::{hedge_cost, HedgeConfig};

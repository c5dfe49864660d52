//! Scalar cost of a packing: weighted area and wirelength plus an outline
//! overflow penalty.

mod core;

pub use core::{Cost, CostConfig, CostModel, Norms};

//! Simulated-annealing search over B*-tree topologies.
//!
//! Each step perturbs the current tree, packs it and scores the result with
//! the [`CostModel`](crate::cost::CostModel). Norms and the start temperature
//! come from a short calibration walk before the schedule starts.

mod config;
mod core;
mod moves;

pub use config::{AnnealConfig, MoveWeights};
pub use core::{AnnealOutcome, Annealer};
pub use moves::MovePicker;

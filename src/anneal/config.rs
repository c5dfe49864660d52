use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cost::CostConfig;
use crate::error::{FloorplanError, Result};
use crate::tree::{InitialShape, MoveFamily};

/// Relative odds of picking each move family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveWeights {
    pub rotate: f64,
    pub swap: f64,
    pub relocate: f64,
}

impl Default for MoveWeights {
    fn default() -> Self {
        Self {
            rotate: 1.0,
            swap: 1.0,
            relocate: 2.0,
        }
    }
}

impl MoveWeights {
    pub fn weight(&self, family: MoveFamily) -> f64 {
        match family {
            MoveFamily::Rotate => self.rotate,
            MoveFamily::Swap => self.swap,
            MoveFamily::Relocate => self.relocate,
        }
    }
}

/// Configuration knobs for the annealing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealConfig {
    pub cost: CostConfig,
    pub weights: MoveWeights,
    /// Arrangement of the starting tree.
    pub initial_shape: InitialShape,
    /// Random-walk length used to calibrate norms and the start temperature.
    pub calibration_moves: usize,
    /// Probability of accepting an average uphill move at the start.
    pub initial_acceptance: f64,
    /// Multiplier applied to the temperature after every step.
    pub cooling_rate: f64,
    pub min_temperature: f64,
    /// Moves tried per temperature step, per block.
    pub moves_per_block: usize,
    pub max_steps: usize,
    /// Stop after this many steps without a new best solution.
    pub frozen_steps: usize,
    /// Steps between metric snapshots in the log. Zero disables snapshots.
    pub metrics_interval: usize,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            cost: CostConfig::default(),
            weights: MoveWeights::default(),
            initial_shape: InitialShape::Complete,
            calibration_moves: 200,
            initial_acceptance: 0.95,
            cooling_rate: 0.95,
            min_temperature: 1e-5,
            moves_per_block: 20,
            max_steps: 1_000,
            frozen_steps: 60,
            metrics_interval: 25,
        }
    }
}

impl AnnealConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.cost.alpha = alpha;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_moves_per_block(mut self, moves: usize) -> Self {
        self.moves_per_block = moves;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.cost.validate()?;

        let weights = [self.weights.rotate, self.weights.swap, self.weights.relocate];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FloorplanError::Config(
                "move weights must be non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(FloorplanError::Config(
                "at least one move weight must be positive".to_string(),
            ));
        }
        if !(self.initial_acceptance > 0.0 && self.initial_acceptance < 1.0) {
            return Err(FloorplanError::Config(format!(
                "initial_acceptance must be within (0, 1), got {}",
                self.initial_acceptance
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(FloorplanError::Config(format!(
                "cooling_rate must be within (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !(self.min_temperature > 0.0) {
            return Err(FloorplanError::Config(
                "min_temperature must be positive".to_string(),
            ));
        }
        if self.frozen_steps == 0 {
            return Err(FloorplanError::Config(
                "frozen_steps must be at least 1".to_string(),
            ));
        }
        if self.moves_per_block == 0 {
            return Err(FloorplanError::Config(
                "moves_per_block must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

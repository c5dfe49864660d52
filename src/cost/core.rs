use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{FloorplanError, Result};
use crate::geometry::Coord;
use crate::tree::Placement;

/// Cost weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Area weight in `[0, 1]`; wirelength gets `1 - alpha`.
    pub alpha: f64,
    /// Weight of the normalised area falling outside the outline.
    pub outline_penalty: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            outline_penalty: 2.0,
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(FloorplanError::Config(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if !self.outline_penalty.is_finite() || self.outline_penalty < 0.0 {
            return Err(FloorplanError::Config(format!(
                "outline_penalty must be a non-negative number, got {}",
                self.outline_penalty
            )));
        }
        Ok(())
    }
}

/// Scales that bring area and wirelength into comparable ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Norms {
    pub area: f64,
    pub wirelength: f64,
}

impl Default for Norms {
    fn default() -> Self {
        Self {
            area: 1.0,
            wirelength: 1.0,
        }
    }
}

impl Norms {
    /// Average the samples; zero averages fall back to 1.
    pub fn from_samples(samples: &[Cost]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let count = samples.len() as f64;
        let area = samples.iter().map(|c| c.area as f64).sum::<f64>() / count;
        let wire = samples.iter().map(|c| c.wirelength).sum::<f64>() / count;
        Self {
            area: if area > 0.0 { area } else { 1.0 },
            wirelength: if wire > 0.0 { wire } else { 1.0 },
        }
    }
}

/// Evaluation of one placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cost {
    pub width: Coord,
    pub height: Coord,
    pub area: u128,
    pub wirelength: f64,
    pub fits: bool,
    /// Normalised objective minimised by the search.
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct CostModel {
    config: CostConfig,
    norms: Norms,
}

impl CostModel {
    pub fn new(config: CostConfig) -> Self {
        Self {
            config,
            norms: Norms::default(),
        }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    pub fn norms(&self) -> Norms {
        self.norms
    }

    pub fn set_norms(&mut self, norms: Norms) {
        self.norms = norms;
    }

    pub fn evaluate(&self, circuit: &Circuit, placement: &Placement) -> Cost {
        let extent = placement.extent();
        let cost = Cost {
            width: extent.width,
            height: extent.height,
            area: extent.area(),
            wirelength: circuit.total_hpwl(placement),
            fits: extent.fits_within(circuit.outline),
            value: 0.0,
        };
        self.rescore(cost, circuit)
    }

    /// Recompute `value` from the other fields, e.g. after the norms change.
    pub fn rescore(&self, mut cost: Cost, circuit: &Circuit) -> Cost {
        let alpha = self.config.alpha;
        cost.value = alpha * cost.area as f64 / self.norms.area
            + (1.0 - alpha) * cost.wirelength / self.norms.wirelength;
        if !cost.fits {
            cost.value += self.config.outline_penalty * overflow(cost.width, cost.height, circuit)
                / self.norms.area;
        }
        cost
    }

    /// `alpha * area + (1 - alpha) * wirelength` without normalisation, the
    /// figure written to reports.
    pub fn raw(&self, cost: &Cost) -> f64 {
        self.config.alpha * cost.area as f64 + (1.0 - self.config.alpha) * cost.wirelength
    }
}

/// Bounding-box area lying outside the outline.
fn overflow(width: Coord, height: Coord, circuit: &Circuit) -> f64 {
    let outline = circuit.outline;
    let inside_w = width.min(outline.width) as f64;
    let inside_h = height.min(outline.height) as f64;
    width as f64 * height as f64 - inside_w * inside_h
}

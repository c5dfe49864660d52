//! B*-tree floorplanning.
//!
//! A [`BStarTree`] encodes a compacted, non-overlapping placement of
//! rectangular blocks. Packing the tree along a skyline [`Contour`] yields a
//! [`Placement`]; perturbing it (rotate, swap, relocate) yields neighbouring
//! floorplans. The [`anneal`] module drives those moves with simulated
//! annealing against the [`cost`] model, and [`io`] reads the `.block` /
//! `.nets` inputs and writes the result report.

pub mod anneal;
pub mod circuit;
pub mod cost;
pub mod error;
pub mod geometry;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod tree;

pub use anneal::{AnnealConfig, AnnealOutcome, Annealer, MoveWeights};
pub use circuit::{Block, BlockId, Circuit, Net, Pin, Terminal};
pub use cost::{Cost, CostConfig, CostModel};
pub use error::{FloorplanError, Result};
pub use geometry::{Coord, Rect, Size};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{MetricSnapshot, SearchMetrics};
pub use tree::{BStarTree, Contour, InitialShape, Move, MoveFamily, PlacedBlock, Placement, Side};

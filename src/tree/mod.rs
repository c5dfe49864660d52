//! B*-tree topology, contour packer and perturbation moves.
//!
//! The tree encodes relative placement: a node's left child sits directly to
//! its right, its right child directly above it. [`BStarTree::pack`] turns
//! that into absolute coordinates and [`BStarTree::perturb`] produces
//! neighbouring topologies for the search driver.

pub mod contour;
mod core;
mod pack;
mod perturb;
mod placement;

pub use contour::{Contour, Segment};
pub use core::{BStarTree, InitialShape, Side};
pub use perturb::{Move, MoveFamily};
pub use placement::{PlacedBlock, Placement};

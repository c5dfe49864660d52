//! Circuit records handed to the floorplanner: blocks, fixed terminals and
//! the nets connecting them.
//!
//! These are passive containers. Placement state lives in the
//! [`Placement`](crate::tree::Placement) produced by packing a tree.

mod core;

pub use core::{Block, BlockId, Circuit, Net, Pin, Terminal};

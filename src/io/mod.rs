//! Text formats around the floorplanner: `.block` / `.nets` inputs and the
//! plain-text result report.

mod parse;
mod report;

pub use parse::{load_circuit, parse_blocks, parse_nets};
pub use report::{Report, write_report};

use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use crate::anneal::AnnealOutcome;
use crate::circuit::Circuit;
use crate::error::{FloorplanError, Result};
use crate::geometry::{Coord, Rect};

/// Final floorplan in the order blocks were declared in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub cost: f64,
    pub wirelength: f64,
    pub area: u128,
    pub width: Coord,
    pub height: Coord,
    pub runtime: Duration,
    pub blocks: Vec<(String, Rect)>,
}

impl Report {
    pub fn from_outcome(circuit: &Circuit, outcome: &AnnealOutcome) -> Result<Self> {
        let placement = outcome
            .tree
            .placement()
            .ok_or_else(|| FloorplanError::TreeCorrupted("best tree was never packed".to_string()))?;
        let blocks = circuit
            .blocks
            .iter()
            .map(|block| {
                placement
                    .rect(block.id)
                    .map(|rect| (block.name.clone(), rect))
                    .ok_or(FloorplanError::UnknownBlock(block.id))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cost: outcome.raw_cost,
            wirelength: outcome.cost.wirelength,
            area: outcome.cost.area,
            width: outcome.cost.width,
            height: outcome.cost.height,
            runtime: outcome.elapsed,
            blocks,
        })
    }
}

/// Write the report: cost, wirelength, area, `width height`, runtime in
/// seconds, then `name x1 y1 x2 y2` per block.
pub fn write_report<W: Write>(writer: &mut W, report: &Report) -> Result<()> {
    writeln!(writer, "{}", report.cost)?;
    writeln!(writer, "{}", report.wirelength)?;
    writeln!(writer, "{}", report.area)?;
    writeln!(writer, "{} {}", report.width, report.height)?;
    writeln!(writer, "{}", report.runtime.as_secs_f64())?;
    for (name, rect) in &report.blocks {
        writeln!(writer, "{name} {} {} {} {}", rect.x1, rect.y1, rect.x2, rect.y2)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_summary_then_blocks() {
        let report = Report {
            cost: 20.5,
            wirelength: 5.0,
            area: 36,
            width: 6,
            height: 6,
            runtime: Duration::from_millis(250),
            blocks: vec![
                ("a".to_string(), Rect::new(0, 0, 4, 2)),
                ("b".to_string(), Rect::new(4, 0, 6, 6)),
            ],
        };
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "20.5\n5\n36\n6 6\n0.25\na 0 0 4 2\nb 4 0 6 6\n");
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Coord, Size};
use crate::tree::Placement;

/// Stable block identifier, unique within one run.
pub type BlockId = usize;

/// Fixed-shape rectangular module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub width: Coord,
    pub height: Coord,
}

impl Block {
    pub fn new(id: BlockId, name: impl Into<String>, width: Coord, height: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
        }
    }

    /// Width and height as placed, swapped when `rotated`.
    pub fn dims(&self, rotated: bool) -> (Coord, Coord) {
        if rotated {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    pub fn area(&self) -> u128 {
        self.width as u128 * self.height as u128
    }
}

/// Fixed-position pin. Never moved by packing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    pub name: String,
    pub x: Coord,
    pub y: Coord,
}

impl Terminal {
    pub fn new(name: impl Into<String>, x: Coord, y: Coord) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// Net endpoint: either a block (its centre) or a terminal (by index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pin {
    Block(BlockId),
    Terminal(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub pins: Vec<Pin>,
}

impl Net {
    pub fn new(pins: Vec<Pin>) -> Self {
        Self { pins }
    }

    /// Half-perimeter of the bounding box around every pin centre.
    ///
    /// Block pins missing from `placement` are ignored, so an unpacked tree
    /// yields the terminal-only estimate.
    pub fn hpwl(&self, placement: &Placement, terminals: &[Terminal]) -> f64 {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for pin in &self.pins {
            let point = match *pin {
                Pin::Block(id) => placement.rect(id).map(|rect| rect.center()),
                Pin::Terminal(idx) => terminals.get(idx).map(|t| (t.x as f64, t.y as f64)),
            };
            let Some((x, y)) = point else { continue };
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((lx, ly, hx, hy)) => (lx.min(x), ly.min(y), hx.max(x), hy.max(y)),
            });
        }
        bounds.map_or(0.0, |(lx, ly, hx, hy)| (hx - lx) + (hy - ly))
    }
}

/// Complete floorplanning instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Circuit {
    pub outline: Size,
    pub blocks: Vec<Block>,
    pub terminals: Vec<Terminal>,
    pub nets: Vec<Net>,
    #[serde(skip)]
    pin_names: HashMap<String, Pin>,
}

impl Circuit {
    pub fn new(outline: Size) -> Self {
        Self {
            outline,
            ..Self::default()
        }
    }

    /// Append a block, assigning the next sequential id.
    pub fn add_block(&mut self, name: impl Into<String>, width: Coord, height: Coord) -> BlockId {
        let id = self.blocks.len();
        let block = Block::new(id, name, width, height);
        self.pin_names.insert(block.name.clone(), Pin::Block(id));
        self.blocks.push(block);
        id
    }

    pub fn add_terminal(&mut self, name: impl Into<String>, x: Coord, y: Coord) -> usize {
        let idx = self.terminals.len();
        let terminal = Terminal::new(name, x, y);
        self.pin_names.insert(terminal.name.clone(), Pin::Terminal(idx));
        self.terminals.push(terminal);
        idx
    }

    pub fn add_net(&mut self, net: Net) {
        self.nets.push(net);
    }

    /// Resolve a block or terminal name to a pin.
    pub fn pin(&self, name: &str) -> Option<Pin> {
        self.pin_names.get(name).copied()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        match self.blocks.get(id) {
            Some(block) if block.id == id => Some(block),
            _ => self.blocks.iter().find(|block| block.id == id),
        }
    }

    /// Sum of block areas, a lower bound on any packing's area.
    pub fn block_area(&self) -> u128 {
        self.blocks.iter().map(Block::area).sum()
    }

    pub fn total_hpwl(&self, placement: &Placement) -> f64 {
        self.nets
            .iter()
            .map(|net| net.hpwl(placement, &self.terminals))
            .sum()
    }

    /// Rebuild the name index, needed after deserializing.
    pub fn reindex(&mut self) {
        self.pin_names.clear();
        for block in &self.blocks {
            self.pin_names.insert(block.name.clone(), Pin::Block(block.id));
        }
        for (idx, terminal) in self.terminals.iter().enumerate() {
            self.pin_names.insert(terminal.name.clone(), Pin::Terminal(idx));
        }
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::circuit::BlockId;
use crate::geometry::{Coord, Rect, Size};

/// Where one block ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub id: BlockId,
    pub rotated: bool,
    pub rect: Rect,
}

/// Absolute coordinates produced by packing one specific tree.
///
/// Blocks are stored in packing (pre-)order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    blocks: Vec<PlacedBlock>,
    #[serde(skip)]
    index: HashMap<BlockId, usize>,
    width: Coord,
    height: Coord,
}

impl Placement {
    pub(crate) fn with_capacity(count: usize) -> Self {
        Self {
            blocks: Vec::with_capacity(count),
            index: HashMap::with_capacity(count),
            width: 0,
            height: 0,
        }
    }

    pub(crate) fn push(&mut self, placed: PlacedBlock) {
        self.width = self.width.max(placed.rect.x2);
        self.height = self.height.max(placed.rect.y2);
        self.index.insert(placed.id, self.blocks.len());
        self.blocks.push(placed);
    }

    pub fn get(&self, id: BlockId) -> Option<&PlacedBlock> {
        self.index.get(&id).map(|&idx| &self.blocks[idx])
    }

    pub fn rect(&self, id: BlockId) -> Option<Rect> {
        self.get(id).map(|placed| placed.rect)
    }

    pub fn is_rotated(&self, id: BlockId) -> Option<bool> {
        self.get(id).map(|placed| placed.rotated)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Maximum x2 over all placed blocks.
    pub fn width(&self) -> Coord {
        self.width
    }

    /// Maximum y2 over all placed blocks.
    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn extent(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding-box area of the packing.
    pub fn area(&self) -> u128 {
        self.extent().area()
    }

    pub fn fits(&self, outline: Size) -> bool {
        self.extent().fits_within(outline)
    }

    /// First pair of blocks whose rectangles overlap in area, if any.
    pub fn find_overlap(&self) -> Option<(BlockId, BlockId)> {
        let mut sorted: Vec<&PlacedBlock> = self.blocks.iter().collect();
        sorted.sort_by_key(|placed| placed.rect.x1);
        for (pos, a) in sorted.iter().enumerate() {
            for b in sorted[pos + 1..].iter().take_while(|b| b.rect.x1 < a.rect.x2) {
                if a.rect.overlaps(&b.rect) {
                    return Some((a.id, b.id));
                }
            }
        }
        None
    }
}

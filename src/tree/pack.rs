use std::collections::HashMap;

use crate::circuit::{Block, BlockId};
use crate::error::{FloorplanError, Result};
use crate::geometry::Rect;

use super::contour::Contour;
use super::core::{BStarTree, NodeIdx};
use super::placement::{PlacedBlock, Placement};

/// Id → block resolution. Block lists built by [`Circuit`](crate::Circuit)
/// are dense (`blocks[i].id == i`) and skip the hash map.
enum BlockLookup<'a> {
    Dense(&'a [Block]),
    Sparse(HashMap<BlockId, &'a Block>),
}

impl<'a> BlockLookup<'a> {
    fn new(blocks: &'a [Block]) -> Self {
        if blocks.iter().enumerate().all(|(idx, block)| block.id == idx) {
            Self::Dense(blocks)
        } else {
            Self::Sparse(blocks.iter().map(|block| (block.id, block)).collect())
        }
    }

    fn get(&self, id: BlockId) -> Result<&'a Block> {
        let found = match self {
            Self::Dense(blocks) => blocks.get(id),
            Self::Sparse(map) => map.get(&id).copied(),
        };
        found.ok_or(FloorplanError::UnknownBlock(id))
    }
}

impl BStarTree {
    /// Turn the topology into absolute coordinates.
    ///
    /// Nodes are visited in pre-order so that a node's parent is always
    /// placed first: a left child starts at its parent's right edge, a right
    /// child at its parent's x. Each block drops onto the contour at the
    /// highest point under its span. The result is cached on the tree and
    /// returned.
    ///
    /// Fails only when the tree names a block missing from `blocks`.
    pub fn pack(&mut self, blocks: &[Block]) -> Result<&Placement> {
        self.placement = None;
        let placement = self.pack_into(&BlockLookup::new(blocks))?;
        Ok(self.placement.insert(placement))
    }

    fn pack_into(&self, lookup: &BlockLookup<'_>) -> Result<Placement> {
        let mut placement = Placement::with_capacity(self.nodes.len());
        let mut contour = Contour::with_capacity(self.nodes.len());
        let mut rects = vec![Rect::default(); self.nodes.len()];

        let mut stack: Vec<NodeIdx> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            let block = lookup.get(node.block)?;
            let (width, height) = block.dims(node.rotated);

            let x = match node.parent {
                None => 0,
                Some(parent) if self.nodes[parent].left == Some(idx) => rects[parent].x2,
                Some(parent) => rects[parent].x1,
            };
            let y = contour.max_height(x, x + width);
            contour.raise(x, x + width, y + height);

            let rect = Rect::from_origin(x, y, width, height);
            rects[idx] = rect;
            placement.push(PlacedBlock {
                id: node.block,
                rotated: node.rotated,
                rect,
            });

            stack.extend(node.right);
            stack.extend(node.left);
        }

        Ok(placement)
    }
}

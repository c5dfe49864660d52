use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::circuit::{Block, BlockId};
use crate::error::{FloorplanError, Result};
use crate::geometry::Coord;

use super::placement::Placement;

/// Arena index of a tree node.
pub(crate) type NodeIdx = usize;

/// Child role. `Left` = next block along x, `Right` = block stacked above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// Arrangement used when a tree is first built from a block list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialShape {
    /// Every block is the left child of the previous one (one row).
    #[default]
    Chain,
    /// Complete binary tree in insertion order.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeNode {
    pub block: BlockId,
    pub rotated: bool,
    pub parent: Option<NodeIdx>,
    pub left: Option<NodeIdx>,
    pub right: Option<NodeIdx>,
}

impl TreeNode {
    fn new(block: BlockId) -> Self {
        Self {
            block,
            rotated: false,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<NodeIdx> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut Option<NodeIdx> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// B*-tree over block ids.
///
/// Nodes live in an arena and link to each other by index, so `clone` is a
/// full deep copy that shares nothing with its source. The placement from
/// the last [`pack`](BStarTree::pack) is kept with the tree and dropped by
/// any structural change.
#[derive(Debug, Default)]
pub struct BStarTree {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) root: Option<NodeIdx>,
    pub(crate) slots: HashMap<BlockId, NodeIdx>,
    pub(crate) placement: Option<Placement>,
}

impl Clone for BStarTree {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            slots: self.slots.clone(),
            placement: self.placement.clone(),
        }
    }

    // Reuses the arena allocation; the annealer copies trees on every move.
    fn clone_from(&mut self, source: &Self) {
        self.nodes.clone_from(&source.nodes);
        self.root = source.root;
        self.slots.clone_from(&source.slots);
        self.placement.clone_from(&source.placement);
    }
}

impl BStarTree {
    /// Build a left-child chain in input order.
    pub fn new(blocks: &[Block]) -> Result<Self> {
        Self::with_shape(blocks, InitialShape::Chain)
    }

    pub fn with_shape(blocks: &[Block], shape: InitialShape) -> Result<Self> {
        if let Some(block) = blocks.iter().find(|b| b.width == 0 || b.height == 0) {
            return Err(FloorplanError::DegenerateBlock(block.id));
        }
        Self::from_ids(blocks.iter().map(|block| block.id), shape)
    }

    /// Build from bare ids. Duplicates are rejected before any node exists.
    pub fn from_ids(ids: impl IntoIterator<Item = BlockId>, shape: InitialShape) -> Result<Self> {
        let mut slots = HashMap::new();
        let mut nodes = Vec::new();
        for id in ids {
            if slots.insert(id, nodes.len()).is_some() {
                return Err(FloorplanError::DuplicateBlock(id));
            }
            nodes.push(TreeNode::new(id));
        }

        for idx in 1..nodes.len() {
            let (parent, side) = match shape {
                InitialShape::Chain => (idx - 1, Side::Left),
                InitialShape::Complete if idx % 2 == 1 => ((idx - 1) / 2, Side::Left),
                InitialShape::Complete => ((idx - 1) / 2, Side::Right),
            };
            *nodes[parent].child_mut(side) = Some(idx);
            nodes[idx].parent = Some(parent);
        }

        let root = (!nodes.is_empty()).then_some(0);
        Ok(Self {
            nodes,
            root,
            slots,
            placement: None,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, block: BlockId) -> bool {
        self.slots.contains_key(&block)
    }

    pub fn root(&self) -> Option<BlockId> {
        self.root.map(|idx| self.nodes[idx].block)
    }

    pub fn parent_of(&self, block: BlockId) -> Option<BlockId> {
        let idx = *self.slots.get(&block)?;
        self.nodes[idx].parent.map(|p| self.nodes[p].block)
    }

    pub fn child_of(&self, block: BlockId, side: Side) -> Option<BlockId> {
        let idx = *self.slots.get(&block)?;
        self.nodes[idx].child(side).map(|c| self.nodes[c].block)
    }

    pub fn left_of(&self, block: BlockId) -> Option<BlockId> {
        self.child_of(block, Side::Left)
    }

    pub fn right_of(&self, block: BlockId) -> Option<BlockId> {
        self.child_of(block, Side::Right)
    }

    pub fn is_rotated(&self, block: BlockId) -> Option<bool> {
        self.slots.get(&block).map(|&idx| self.nodes[idx].rotated)
    }

    /// Block ids root first, then the left subtree, then the right subtree.
    pub fn preorder(&self) -> Vec<BlockId> {
        self.preorder_slots()
            .into_iter()
            .map(|idx| self.nodes[idx].block)
            .collect()
    }

    /// True when `descendant` lies strictly below `ancestor`.
    pub fn is_ancestor(&self, ancestor: BlockId, descendant: BlockId) -> bool {
        match (self.slots.get(&ancestor), self.slots.get(&descendant)) {
            (Some(&a), Some(&d)) => self.is_ancestor_slot(a, d),
            _ => false,
        }
    }

    /// Last packed placement, if the tree has not changed since.
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Packed width, zero before the first pack.
    pub fn width(&self) -> Coord {
        self.placement.as_ref().map_or(0, Placement::width)
    }

    /// Packed height, zero before the first pack.
    pub fn height(&self) -> Coord {
        self.placement.as_ref().map_or(0, Placement::height)
    }

    /// Check every structural invariant. A failure is a bug, not bad input.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| Err(FloorplanError::TreeCorrupted(msg));

        if self.slots.len() != self.nodes.len() {
            return corrupt(format!(
                "{} slots for {} nodes",
                self.slots.len(),
                self.nodes.len()
            ));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if self.slots.get(&node.block) != Some(&idx) {
                return corrupt(format!("block {} is not indexed at node {}", node.block, idx));
            }
            for side in Side::BOTH {
                if let Some(child) = node.child(side) {
                    if self.nodes.get(child).and_then(|c| c.parent) != Some(idx) {
                        return corrupt(format!("child of block {} does not point back", node.block));
                    }
                }
            }
            match node.parent {
                None if self.root != Some(idx) => {
                    return corrupt(format!("block {} has no parent but is not the root", node.block));
                }
                Some(_) if self.root == Some(idx) => {
                    return corrupt(format!("root block {} has a parent", node.block));
                }
                Some(p) => {
                    let parent = &self.nodes[p];
                    if (parent.left == Some(idx)) == (parent.right == Some(idx)) {
                        return corrupt(format!(
                            "block {} is not exactly one child of its parent",
                            node.block
                        ));
                    }
                }
                None => {}
            }
        }

        let reached = self.preorder_slots().len();
        if reached != self.nodes.len() {
            return corrupt(format!("{} of {} nodes reachable from root", reached, self.nodes.len()));
        }
        Ok(())
    }

    pub(crate) fn slot(&self, block: BlockId) -> Result<NodeIdx> {
        self.slots
            .get(&block)
            .copied()
            .ok_or(FloorplanError::UnknownBlock(block))
    }

    pub(crate) fn preorder_slots(&self) -> Vec<NodeIdx> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeIdx> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            // Bounded so a corrupted cycle cannot spin forever.
            if order.len() > self.nodes.len() {
                break;
            }
            order.push(idx);
            let node = &self.nodes[idx];
            stack.extend(node.right);
            stack.extend(node.left);
        }
        order
    }

    pub(crate) fn is_ancestor_slot(&self, ancestor: NodeIdx, descendant: NodeIdx) -> bool {
        let mut cursor = self.nodes[descendant].parent;
        while let Some(idx) = cursor {
            if idx == ancestor {
                return true;
            }
            cursor = self.nodes[idx].parent;
        }
        false
    }
}

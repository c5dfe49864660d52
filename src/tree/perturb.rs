//! Neighbourhood moves over a B*-tree.
//!
//! Moves are plain values so the core stays deterministic: the search driver
//! picks them (usually at random) and the tree only checks and applies them.

use serde::{Deserialize, Serialize};

use crate::circuit::BlockId;
use crate::error::{FloorplanError, Result};

use super::core::{BStarTree, NodeIdx, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveFamily {
    Rotate,
    Swap,
    Relocate,
}

impl MoveFamily {
    pub const ALL: [MoveFamily; 3] = [MoveFamily::Rotate, MoveFamily::Swap, MoveFamily::Relocate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotate => "rotate",
            Self::Swap => "swap",
            Self::Relocate => "relocate",
        }
    }
}

/// One structural edit of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Flip the orientation of the node holding `block`.
    Rotate { block: BlockId },
    /// Exchange the blocks held by two nodes. Shape and orientation flags stay.
    Swap { first: BlockId, second: BlockId },
    /// Delete `block` from the tree and re-insert it as the `side` child of
    /// `target`. Whatever occupied that slot becomes the moved node's
    /// `displaced` child.
    Relocate {
        block: BlockId,
        target: BlockId,
        side: Side,
        displaced: Side,
    },
}

impl Move {
    pub fn family(&self) -> MoveFamily {
        match self {
            Self::Rotate { .. } => MoveFamily::Rotate,
            Self::Swap { .. } => MoveFamily::Swap,
            Self::Relocate { .. } => MoveFamily::Relocate,
        }
    }
}

impl BStarTree {
    /// Apply `mv` in place. Every precondition is checked first, so on error
    /// the tree is exactly as it was.
    pub fn apply(&mut self, mv: &Move) -> Result<()> {
        match *mv {
            Move::Rotate { block } => {
                let idx = self.slot(block)?;
                self.nodes[idx].rotated = !self.nodes[idx].rotated;
            }
            Move::Swap { first, second } => {
                if first == second {
                    return Err(FloorplanError::InvalidMove(format!(
                        "cannot swap block {first} with itself"
                    )));
                }
                let a = self.slot(first)?;
                let b = self.slot(second)?;
                self.nodes[a].block = second;
                self.nodes[b].block = first;
                self.slots.insert(first, b);
                self.slots.insert(second, a);
            }
            Move::Relocate {
                block,
                target,
                side,
                displaced,
            } => {
                if block == target {
                    return Err(FloorplanError::InvalidMove(format!(
                        "cannot insert block {block} under itself"
                    )));
                }
                let node = self.slot(block)?;
                let anchor = self.slot(target)?;
                if self.is_ancestor_slot(node, anchor) {
                    return Err(FloorplanError::InvalidMove(format!(
                        "block {target} is a descendant of block {block}"
                    )));
                }
                self.detach(node);
                self.attach(node, anchor, side, displaced);
            }
        }
        self.placement = None;
        Ok(())
    }

    /// Apply `mv` to a private copy. `self` is never modified.
    pub fn perturb(&self, mv: &Move) -> Result<BStarTree> {
        let mut candidate = self.clone();
        candidate.apply(mv)?;
        Ok(candidate)
    }

    /// Like [`perturb`](Self::perturb), but reuses `scratch`'s allocation.
    pub fn perturb_into(&self, mv: &Move, scratch: &mut BStarTree) -> Result<()> {
        scratch.clone_from(self);
        scratch.apply(mv)
    }

    /// One candidate per move, each on its own copy.
    pub fn perturb_all(&self, moves: &[Move]) -> Vec<Result<BStarTree>> {
        moves.iter().map(|mv| self.perturb(mv)).collect()
    }

    /// Every legal move of `family` on the current tree.
    pub fn candidate_moves(&self, family: MoveFamily) -> Vec<Move> {
        let ids = self.preorder();
        match family {
            MoveFamily::Rotate => ids.into_iter().map(|block| Move::Rotate { block }).collect(),
            MoveFamily::Swap => {
                let mut moves = Vec::new();
                for (pos, &first) in ids.iter().enumerate() {
                    for &second in &ids[pos + 1..] {
                        moves.push(Move::Swap { first, second });
                    }
                }
                moves
            }
            MoveFamily::Relocate => {
                let mut moves = Vec::new();
                for &block in &ids {
                    for &target in &ids {
                        if block == target || self.is_ancestor(block, target) {
                            continue;
                        }
                        for side in Side::BOTH {
                            // An empty slot displaces nothing, one variant is enough.
                            let displaced: &[Side] = if self.child_of(target, side).is_some() {
                                &Side::BOTH
                            } else {
                                &[Side::Left]
                            };
                            for &displaced in displaced {
                                moves.push(Move::Relocate {
                                    block,
                                    target,
                                    side,
                                    displaced,
                                });
                            }
                        }
                    }
                }
                moves
            }
        }
    }

    /// Full neighbourhood of one move family, for exhaustive search.
    pub fn neighborhood(&self, family: MoveFamily) -> Vec<BStarTree> {
        self.candidate_moves(family)
            .iter()
            .filter_map(|mv| self.perturb(mv).ok())
            .collect()
    }

    /// Unlink `idx`, keeping every other node in the tree.
    ///
    /// With two children the left child is promoted into the vacated slot
    /// and takes the removed node's right child as its own right child. The
    /// promoted child's former right subtree is hung off the end of that
    /// right-link chain.
    fn detach(&mut self, idx: NodeIdx) {
        let (parent, left, right) = {
            let node = &self.nodes[idx];
            (node.parent, node.left, node.right)
        };

        let replacement = match (left, right) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => Some(only),
            (Some(promoted), Some(sibling)) => {
                let orphan = self.nodes[promoted].right;
                self.nodes[promoted].right = Some(sibling);
                self.nodes[sibling].parent = Some(promoted);
                if let Some(orphan) = orphan {
                    let mut end = sibling;
                    while let Some(next) = self.nodes[end].right {
                        end = next;
                    }
                    self.nodes[end].right = Some(orphan);
                    self.nodes[orphan].parent = Some(end);
                }
                Some(promoted)
            }
        };

        if let Some(child) = replacement {
            self.nodes[child].parent = parent;
        }
        match parent {
            None => self.root = replacement,
            Some(p) => {
                let parent_node = &mut self.nodes[p];
                if parent_node.left == Some(idx) {
                    parent_node.left = replacement;
                } else {
                    parent_node.right = replacement;
                }
            }
        }

        let node = &mut self.nodes[idx];
        node.parent = None;
        node.left = None;
        node.right = None;
    }

    /// Hang detached `idx` as the `side` child of `anchor`.
    fn attach(&mut self, idx: NodeIdx, anchor: NodeIdx, side: Side, displaced: Side) {
        let previous = self.nodes[anchor].child(side);
        *self.nodes[anchor].child_mut(side) = Some(idx);
        self.nodes[idx].parent = Some(anchor);
        if let Some(child) = previous {
            *self.nodes[idx].child_mut(displaced) = Some(child);
            self.nodes[child].parent = Some(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Block;
    use crate::tree::InitialShape;

    fn blocks(count: usize) -> Vec<Block> {
        (0..count)
            .map(|id| Block::new(id, format!("b{id}"), 2 + id as u64, 1 + (id as u64 % 3)))
            .collect()
    }

    fn sorted_ids(tree: &BStarTree) -> Vec<BlockId> {
        let mut ids = tree.preorder();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn rotate_twice_restores_packing() {
        let input = blocks(4);
        let mut tree = BStarTree::with_shape(&input, InitialShape::Complete).unwrap();
        let before = tree.pack(&input).unwrap().clone();

        tree.apply(&Move::Rotate { block: 1 }).unwrap();
        assert_eq!(tree.is_rotated(1), Some(true));
        assert!(tree.placement().is_none());
        tree.apply(&Move::Rotate { block: 1 }).unwrap();
        assert_eq!(tree.is_rotated(1), Some(false));

        assert_eq!(tree.pack(&input).unwrap(), &before);
    }

    #[test]
    fn swap_exchanges_blocks_only() {
        let mut tree = BStarTree::with_shape(&blocks(5), InitialShape::Complete).unwrap();
        tree.apply(&Move::Rotate { block: 3 }).unwrap();
        tree.apply(&Move::Swap { first: 1, second: 3 }).unwrap();

        assert_eq!(tree.left_of(0), Some(3));
        assert_eq!(tree.left_of(3), Some(1));
        assert_eq!(tree.right_of(3), Some(4));
        // The flag belongs to the node, so block 1 now carries it.
        assert_eq!(tree.is_rotated(1), Some(true));
        assert_eq!(tree.is_rotated(3), Some(false));
        tree.validate().unwrap();
    }

    #[test]
    fn swap_rejects_bad_arguments() {
        let mut tree = BStarTree::new(&blocks(3)).unwrap();
        let same = tree.apply(&Move::Swap { first: 2, second: 2 });
        assert!(matches!(same, Err(FloorplanError::InvalidMove(_))));
        let unknown = tree.apply(&Move::Swap { first: 2, second: 9 });
        assert!(matches!(unknown, Err(FloorplanError::UnknownBlock(9))));
        assert_eq!(tree.preorder(), vec![0, 1, 2]);
    }

    #[test]
    fn relocate_leaf_displacing_existing_child() {
        let mut tree = BStarTree::new(&blocks(4)).unwrap();
        tree.apply(&Move::Relocate {
            block: 3,
            target: 1,
            side: Side::Left,
            displaced: Side::Right,
        })
        .unwrap();

        assert_eq!(tree.left_of(1), Some(3));
        assert_eq!(tree.right_of(3), Some(2));
        assert_eq!(tree.left_of(2), None);
        assert_eq!(tree.preorder(), vec![0, 1, 3, 2]);
        tree.validate().unwrap();
    }

    #[test]
    fn relocate_single_child_node_promotes_it() {
        // 0 -left-> 1 -left-> 2 -left-> 3; move 1 above 3.
        let mut tree = BStarTree::new(&blocks(4)).unwrap();
        tree.apply(&Move::Relocate {
            block: 1,
            target: 0,
            side: Side::Right,
            displaced: Side::Left,
        })
        .unwrap();
        assert_eq!(tree.left_of(0), Some(2));
        assert_eq!(tree.right_of(0), Some(1));
        assert_eq!(tree.parent_of(2), Some(0));
        tree.validate().unwrap();
    }

    #[test]
    fn two_child_delete_promotes_left_and_rehangs_its_right_subtree() {
        // Complete tree: 1 has children 3 (7, 8) and 4 (9, 10).
        let mut tree = BStarTree::with_shape(&blocks(15), InitialShape::Complete).unwrap();
        tree.apply(&Move::Relocate {
            block: 1,
            target: 14,
            side: Side::Right,
            displaced: Side::Left,
        })
        .unwrap();

        assert_eq!(tree.left_of(0), Some(3));
        assert_eq!(tree.left_of(3), Some(7));
        assert_eq!(tree.right_of(3), Some(4));
        assert_eq!(tree.right_of(4), Some(10));
        assert_eq!(tree.right_of(10), Some(8));
        assert_eq!(tree.parent_of(8), Some(10));
        assert_eq!(tree.right_of(14), Some(1));
        assert_eq!(tree.left_of(1), None);
        assert_eq!(tree.len(), 15);
        tree.validate().unwrap();
    }

    #[test]
    fn relocate_under_own_subtree_is_rejected_untouched() {
        let mut tree = BStarTree::new(&blocks(4)).unwrap();
        let before = tree.clone();
        let err = tree
            .apply(&Move::Relocate {
                block: 1,
                target: 3,
                side: Side::Right,
                displaced: Side::Left,
            })
            .unwrap_err();
        assert!(matches!(err, FloorplanError::InvalidMove(_)));
        assert_eq!(tree.nodes, before.nodes);

        let itself = tree.apply(&Move::Relocate {
            block: 2,
            target: 2,
            side: Side::Left,
            displaced: Side::Left,
        });
        assert!(matches!(itself, Err(FloorplanError::InvalidMove(_))));
    }

    #[test]
    fn root_cannot_move_below_its_descendants() {
        let mut tree = BStarTree::from_ids([0, 1], InitialShape::Chain).unwrap();
        let err = tree.apply(&Move::Relocate {
            block: 0,
            target: 1,
            side: Side::Left,
            displaced: Side::Left,
        });
        assert!(err.is_err());

        let mut tree = BStarTree::with_shape(&blocks(3), InitialShape::Complete).unwrap();
        tree.apply(&Move::Relocate {
            block: 2,
            target: 1,
            side: Side::Right,
            displaced: Side::Left,
        })
        .unwrap();
        assert_eq!(tree.right_of(0), None);
        assert_eq!(tree.right_of(1), Some(2));
        tree.validate().unwrap();
    }

    #[test]
    fn perturb_leaves_source_untouched() {
        let input = blocks(6);
        let mut source = BStarTree::with_shape(&input, InitialShape::Complete).unwrap();
        let packed = source.pack(&input).unwrap().clone();
        let snapshot = source.nodes.clone();

        for family in MoveFamily::ALL {
            for mut candidate in source.neighborhood(family) {
                candidate.pack(&input).unwrap();
            }
        }

        assert_eq!(source.nodes, snapshot);
        assert_eq!(source.placement(), Some(&packed));
    }

    #[test]
    fn every_neighbour_is_a_valid_tree_over_the_same_ids() {
        let input = blocks(7);
        let tree = BStarTree::with_shape(&input, InitialShape::Complete).unwrap();
        let expected = sorted_ids(&tree);
        for family in MoveFamily::ALL {
            let neighbours = tree.neighborhood(family);
            assert_eq!(neighbours.len(), tree.candidate_moves(family).len());
            for mut candidate in neighbours {
                candidate.validate().unwrap();
                assert_eq!(candidate.len(), tree.len());
                assert_eq!(sorted_ids(&candidate), expected);
                let placement = candidate.pack(&input).unwrap();
                assert_eq!(placement.find_overlap(), None);
            }
        }
    }

    #[test]
    fn candidate_counts() {
        let tree = BStarTree::new(&blocks(4)).unwrap();
        assert_eq!(tree.candidate_moves(MoveFamily::Rotate).len(), 4);
        assert_eq!(tree.candidate_moves(MoveFamily::Swap).len(), 6);
        // Only targets nearer the root are legal in a chain: 6 pairs, each with
        // an occupied left slot (2 variants) and an empty right slot (1).
        let relocations = tree.candidate_moves(MoveFamily::Relocate);
        assert_eq!(relocations.len(), 18);
        assert!(relocations.iter().all(|mv| match *mv {
            Move::Relocate { block, target, .. } => !tree.is_ancestor(block, target),
            _ => false,
        }));
    }

    #[test]
    fn perturb_into_reuses_scratch() {
        let tree = BStarTree::new(&blocks(3)).unwrap();
        let mut scratch = BStarTree::default();
        tree.perturb_into(&Move::Rotate { block: 2 }, &mut scratch)
            .unwrap();
        assert_eq!(scratch.is_rotated(2), Some(true));
        assert_eq!(tree.is_rotated(2), Some(false));

        let results = tree.perturb_all(&[
            Move::Rotate { block: 0 },
            Move::Swap { first: 0, second: 0 },
        ]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}

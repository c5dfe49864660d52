use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::circuit::BlockId;
use crate::error::{FloorplanError, Result};
use crate::tree::{Move, MoveFamily, Side};

use super::config::MoveWeights;

/// Draws random moves over a fixed id set. Moves may still be illegal for
/// the current topology (e.g. a relocation under the block's own subtree);
/// the tree rejects those and the caller draws again.
#[derive(Debug, Clone)]
pub struct MovePicker {
    ids: Vec<BlockId>,
    families: WeightedIndex<f64>,
    can_rotate: bool,
}

impl MovePicker {
    pub fn new(ids: Vec<BlockId>, weights: &MoveWeights) -> Result<Self> {
        let families = WeightedIndex::new(MoveFamily::ALL.map(|family| weights.weight(family)))
            .map_err(|err| FloorplanError::Config(format!("move weights: {err}")))?;
        Ok(Self {
            ids,
            families,
            can_rotate: weights.rotate > 0.0,
        })
    }

    /// A lone block can only be rotated; swaps and relocations need two.
    /// `None` when no move exists at all.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        match self.ids.as_slice() {
            [] => return None,
            [only] => return self.can_rotate.then_some(Move::Rotate { block: *only }),
            _ => {}
        }
        let family = MoveFamily::ALL[self.families.sample(rng)];
        let (first, second) = self.distinct_pair(rng);
        Some(match family {
            MoveFamily::Rotate => Move::Rotate { block: first },
            MoveFamily::Swap => Move::Swap { first, second },
            MoveFamily::Relocate => Move::Relocate {
                block: first,
                target: second,
                side: random_side(rng),
                displaced: random_side(rng),
            },
        })
    }

    fn distinct_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (BlockId, BlockId) {
        let count = self.ids.len();
        let a = rng.gen_range(0..count);
        let mut b = rng.gen_range(0..count - 1);
        if b >= a {
            b += 1;
        }
        (self.ids[a], self.ids[b])
    }
}

fn random_side<R: Rng + ?Sized>(rng: &mut R) -> Side {
    if rng.gen_bool(0.5) { Side::Left } else { Side::Right }
}

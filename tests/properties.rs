use std::collections::BTreeSet;

use bstar_floorplan::anneal::{AnnealConfig, Annealer, MovePicker, MoveWeights};
use bstar_floorplan::io::{Report, parse_blocks, parse_nets, write_report};
use bstar_floorplan::{BStarTree, Block, BlockId, FloorplanError, InitialShape, Move, MoveFamily};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_blocks(rng: &mut StdRng, count: usize) -> Vec<Block> {
    (0..count)
        .map(|id| Block::new(id, format!("b{id}"), rng.gen_range(1..=12), rng.gen_range(1..=12)))
        .collect()
}

fn assert_legal(tree: &mut BStarTree, blocks: &[Block]) {
    tree.validate().unwrap();
    let placement = tree.pack(blocks).unwrap().clone();
    assert_eq!(placement.len(), blocks.len());
    assert_eq!(placement.find_overlap(), None);

    let mut max_x = 0;
    let mut max_y = 0;
    for placed in placement.iter() {
        let block = &blocks[placed.id];
        let (w, h) = block.dims(placed.rotated);
        assert_eq!((placed.rect.width(), placed.rect.height()), (w, h));
        max_x = max_x.max(placed.rect.x2);
        max_y = max_y.max(placed.rect.y2);
    }
    assert_eq!((tree.width(), tree.height()), (max_x, max_y));
    assert_eq!(placement.area(), max_x as u128 * max_y as u128);
    assert!(placement.area() >= blocks.iter().map(Block::area).sum::<u128>());
}

fn id_set(tree: &BStarTree) -> BTreeSet<BlockId> {
    tree.preorder().into_iter().collect()
}

#[test]
fn random_walks_keep_packings_legal() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let blocks = random_blocks(&mut rng, 25);
        let ids: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
        let picker = MovePicker::new(ids.clone(), &MoveWeights::default()).unwrap();
        let shape = if seed % 2 == 0 {
            InitialShape::Chain
        } else {
            InitialShape::Complete
        };
        let mut tree = BStarTree::with_shape(&blocks, shape).unwrap();
        let expected: BTreeSet<BlockId> = ids.into_iter().collect();

        for _ in 0..300 {
            let mv = picker.pick(&mut rng).unwrap();
            let before = tree.clone();
            match tree.perturb(&mv) {
                Ok(next) => {
                    assert_eq!(next.len(), before.len());
                    assert_eq!(id_set(&next), expected);
                    tree = next;
                }
                Err(FloorplanError::InvalidMove(_)) => {
                    assert_eq!(tree.preorder(), before.preorder());
                }
                Err(other) => panic!("unexpected error {other}"),
            }
            assert_legal(&mut tree, &blocks);
        }
    }
}

#[test]
fn perturbing_a_copy_leaves_the_source_packing_alone() {
    let mut rng = StdRng::seed_from_u64(99);
    let blocks = random_blocks(&mut rng, 12);
    let mut source = BStarTree::with_shape(&blocks, InitialShape::Complete).unwrap();
    let before = source.pack(&blocks).unwrap().clone();
    let order = source.preorder();

    for family in MoveFamily::ALL {
        for mut neighbour in source.neighborhood(family) {
            neighbour.pack(&blocks).unwrap();
            assert_eq!(neighbour.len(), source.len());
        }
    }
    assert_eq!(source.preorder(), order);
    assert_eq!(source.placement(), Some(&before));
}

#[test]
fn rotating_twice_restores_the_packing() {
    let mut rng = StdRng::seed_from_u64(4);
    let blocks = random_blocks(&mut rng, 10);
    let mut tree = BStarTree::new(&blocks).unwrap();
    let before = tree.pack(&blocks).unwrap().clone();

    for block in &blocks {
        let rotate = Move::Rotate { block: block.id };
        tree.apply(&rotate).unwrap();
        tree.apply(&rotate).unwrap();
    }
    assert_eq!(tree.pack(&blocks).unwrap(), &before);
}

#[test]
fn relocation_preserves_size_and_ids() {
    let mut rng = StdRng::seed_from_u64(21);
    let blocks = random_blocks(&mut rng, 15);
    let tree = BStarTree::with_shape(&blocks, InitialShape::Complete).unwrap();
    let expected = id_set(&tree);

    let moves = tree.candidate_moves(MoveFamily::Relocate);
    assert!(!moves.is_empty());
    for result in tree.perturb_all(&moves) {
        let mut next = result.unwrap();
        assert_eq!(next.len(), 15);
        assert_eq!(id_set(&next), expected);
        assert_legal(&mut next, &blocks);
    }
}

#[test]
fn empty_input_packs_to_nothing() {
    let mut tree = BStarTree::new(&[]).unwrap();
    let placement = tree.pack(&[]).unwrap();
    assert!(placement.is_empty());
    assert_eq!((tree.width(), tree.height()), (0, 0));
    for family in MoveFamily::ALL {
        assert!(tree.candidate_moves(family).is_empty());
    }
}

const SAMPLE_BLOCKS: &str = "Outline: 30 30
NumBlocks: 6
NumTerminals: 2

cpu 10 8
gpu 8 10
dsp 6 6
sram 12 4
rom 4 9
io 5 5

P1 terminal 0 15
P2 terminal 30 0
";

const SAMPLE_NETS: &str = "NumNets: 4
NetDegree: 3
cpu
gpu
P1
NetDegree: 2
dsp
sram
NetDegree: 3
rom
io
P2
NetDegree: 2
cpu
sram
";

#[test]
fn parse_anneal_report_end_to_end() {
    let mut circuit = parse_blocks(SAMPLE_BLOCKS).unwrap();
    parse_nets(SAMPLE_NETS, &mut circuit).unwrap();

    let config = AnnealConfig::default()
        .with_alpha(0.5)
        .with_max_steps(80)
        .with_moves_per_block(15);
    let mut annealer = Annealer::new(&circuit, config).unwrap();
    let outcome = annealer.run(&mut StdRng::seed_from_u64(2024)).unwrap();

    assert!(outcome.cost.fits, "{:?}", outcome.cost);
    assert!(outcome.cost.width <= 30 && outcome.cost.height <= 30);
    let expected_raw = 0.5 * outcome.cost.area as f64 + 0.5 * outcome.cost.wirelength;
    assert!((outcome.raw_cost - expected_raw).abs() < 1e-6);

    let report = Report::from_outcome(&circuit, &outcome).unwrap();
    let mut out = Vec::new();
    write_report(&mut out, &report).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5 + circuit.blocks.len());
    assert_eq!(lines[2], outcome.cost.area.to_string());
    assert_eq!(
        lines[3],
        format!("{} {}", outcome.cost.width, outcome.cost.height)
    );

    for (line, block) in lines[5..].iter().zip(&circuit.blocks) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields[0], block.name);
        let coords: Vec<u64> = fields[1..].iter().map(|f| f.parse().unwrap()).collect();
        let (w, h) = (coords[2] - coords[0], coords[3] - coords[1]);
        assert!((w, h) == (block.width, block.height) || (w, h) == (block.height, block.width));
    }
}

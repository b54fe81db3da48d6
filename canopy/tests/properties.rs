use canopy::{Address, FieldValue, LeafSchema, LeafValue, StandardMerkleTree};

use quickcheck::{quickcheck, TestResult};

fn schema() -> LeafSchema {
    LeafSchema::parse(&["address", "uint64"]).unwrap()
}

fn leaf(seed: (u8, u64)) -> LeafValue {
    vec![
        FieldValue::Address(Address([seed.0; 20])),
        FieldValue::uint(seed.1),
    ]
}

quickcheck! {
    fn root_invariant_under_rotation(seeds: Vec<(u8, u64)>, rot: usize) -> TestResult {
        if seeds.is_empty() {
            return TestResult::discard();
        }
        let values: Vec<LeafValue> = seeds.iter().copied().map(leaf).collect();
        let tree = StandardMerkleTree::build(values.clone(), schema()).unwrap();

        let mut rotated = values;
        let len = rotated.len();
        rotated.rotate_left(rot % len);
        let tree2 = StandardMerkleTree::build(rotated, schema()).unwrap();

        TestResult::from_bool(tree.root() == tree2.root())
    }

    fn every_leaf_proves(seeds: Vec<(u8, u64)>) -> TestResult {
        if seeds.is_empty() {
            return TestResult::discard();
        }
        let values: Vec<LeafValue> = seeds.iter().copied().map(leaf).collect();
        let tree = StandardMerkleTree::build(values, schema()).unwrap();

        let ok = (0..tree.leaf_count()).all(|index| {
            let proof = tree.proof(index).unwrap();
            tree.verify(index, &proof).unwrap()
        });
        TestResult::from_bool(ok)
    }

    fn flipped_sibling_byte_never_proves(seeds: Vec<(u8, u64)>, index: usize, byte: usize) -> TestResult {
        if seeds.len() < 2 {
            return TestResult::discard();
        }
        let values: Vec<LeafValue> = seeds.iter().copied().map(leaf).collect();
        let tree = StandardMerkleTree::build(values, schema()).unwrap();

        let index = index % tree.leaf_count();
        let mut proof = tree.proof(index).unwrap();
        if proof.siblings.is_empty() {
            return TestResult::discard();
        }
        let sibling = byte % proof.siblings.len();
        proof.siblings[sibling][byte % 32] ^= 1;

        TestResult::from_bool(!tree.verify(index, &proof).unwrap())
    }

    fn multiproof_agrees_with_single_proofs(seeds: Vec<(u8, u64)>, mask: u64) -> TestResult {
        if seeds.is_empty() {
            return TestResult::discard();
        }
        let values: Vec<LeafValue> = seeds.iter().copied().map(leaf).collect();
        let tree = StandardMerkleTree::build(values, schema()).unwrap();

        let indices: Vec<usize> = (0..tree.leaf_count().min(64))
            .filter(|i| mask & (1 << i) != 0)
            .collect();
        if indices.is_empty() {
            return TestResult::discard();
        }

        let proof = tree.multi_proof(&indices).unwrap();
        let chosen: Vec<LeafValue> = indices
            .iter()
            .map(|&i| tree.value(i).unwrap().clone())
            .collect();

        let joint =
            StandardMerkleTree::verify_multi(&schema(), &chosen, &proof, tree.root()).unwrap();
        let individual = indices.iter().all(|&i| {
            let p = tree.proof(i).unwrap();
            tree.verify(i, &p).unwrap()
        });
        TestResult::from_bool(joint && individual)
    }
}

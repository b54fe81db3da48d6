//! Proving and verifying inclusion of a single leaf.

use crate::hasher::NodeHasher;
use crate::tree::{parent, sibling, Node, Tree};

use alloc::vec::Vec;

/// A proof of inclusion for a single leaf.
///
/// The siblings are ordered from the leaf's level up to (but excluding) the root.
/// No left/right markers travel with them: each fold step re-sorts the pair before
/// hashing, so position information is unnecessary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathProof {
    /// Sibling nodes encountered walking from the leaf position to the root.
    pub siblings: Vec<Node>,
}

/// The requested rank does not correspond to a stored leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOutOfRange;

/// Extract the proof for the leaf with the given sorted rank.
pub fn path_proof(tree: &Tree, rank: usize) -> Result<PathProof, RankOutOfRange> {
    if rank >= tree.leaf_count() {
        return Err(RankOutOfRange);
    }

    let mut siblings = Vec::new();
    let mut i = tree.leaf_slot(rank);
    while let (Some(s), Some(p)) = (sibling(i), parent(i)) {
        siblings.push(tree.node(s));
        i = p;
    }

    Ok(PathProof { siblings })
}

/// Fold a leaf node up a sibling path, producing the root candidate.
///
/// Every step performs exactly one sorted-pair hash, so the cost of the fold does
/// not depend on where (or whether) a mismatch occurs.
pub fn process_path<H: NodeHasher>(leaf: Node, siblings: &[Node]) -> Node {
    siblings
        .iter()
        .fold(leaf, |acc, s| H::hash_internal(&acc, s))
}

/// Verify a path proof against an expected root.
///
/// A mismatch is a normal negative result, not an error.
pub fn verify_path<H: NodeHasher>(leaf: Node, proof: &PathProof, root: Node) -> bool {
    process_path::<H>(leaf, &proof.siblings) == root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Blake3Hasher;

    // Builds the three-leaf tree
    //
    //        root
    //        /  \
    //      i1    l3
    //     /  \
    //    l2  l1
    fn three_leaf_tree() -> (Tree, [Node; 3], Node) {
        let l1 = [1; 32];
        let l2 = [2; 32];
        let l3 = [3; 32];
        let (tree, _) = Tree::build::<Blake3Hasher>(&[l1, l2, l3]).unwrap();
        let root = tree.root();
        (tree, [l1, l2, l3], root)
    }

    #[test]
    fn proof_roundtrip_all_leaves() {
        let (tree, leaves, root) = three_leaf_tree();
        for (rank, leaf) in leaves.iter().enumerate() {
            let proof = path_proof(&tree, rank).unwrap();
            assert!(verify_path::<Blake3Hasher>(*leaf, &proof, root));
        }
    }

    #[test]
    fn proof_structure() {
        let (tree, leaves, _) = three_leaf_tree();
        let [l1, l2, l3] = leaves;

        // rank 0 sits deepest: its siblings are the other deep leaf, then the
        // shallow leaf's level.
        let proof = path_proof(&tree, 0).unwrap();
        assert_eq!(proof.siblings, vec![l2, l3]);

        let proof = path_proof(&tree, 2).unwrap();
        assert_eq!(
            proof.siblings,
            vec![Blake3Hasher::hash_internal(&l1, &l2)]
        );
    }

    #[test]
    fn corrupted_sibling_fails() {
        let (tree, leaves, root) = three_leaf_tree();
        let mut proof = path_proof(&tree, 1).unwrap();
        proof.siblings[0][7] ^= 0x10;
        assert!(!verify_path::<Blake3Hasher>(leaves[1], &proof, root));
    }

    #[test]
    fn corrupted_leaf_fails() {
        let (tree, leaves, root) = three_leaf_tree();
        let proof = path_proof(&tree, 1).unwrap();
        let mut leaf = leaves[1];
        leaf[0] ^= 1;
        assert!(!verify_path::<Blake3Hasher>(leaf, &proof, root));
    }

    #[test]
    fn rank_out_of_range() {
        let (tree, _, _) = three_leaf_tree();
        assert_eq!(path_proof(&tree, 3), Err(RankOutOfRange));
    }

    #[test]
    fn single_leaf_proof_is_empty() {
        let leaf = [9; 32];
        let (tree, _) = Tree::build::<Blake3Hasher>(&[leaf]).unwrap();
        let proof = path_proof(&tree, 0).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(verify_path::<Blake3Hasher>(leaf, &proof, tree.root()));
    }
}

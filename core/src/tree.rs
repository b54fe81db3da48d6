//! This module defines the schema of a standard merkle tree over a fixed leaf set,
//! generalized over a 256 bit hash function.
//!
//! All nodes are 256 bits. There are two kinds of nodes.
//!   1. Internal nodes, which each have two children. The value of an internal node
//!      is given by hashing the concatenation of the two child nodes, smaller child
//!      first by byte order.
//!   2. Leaf nodes, which have zero children. The value of a leaf node is the double
//!      hash of the canonical encoding of the underlying value.
//!
//! Double-hashed leaves and sorted-pair internal nodes together make the schema safe
//! against second-preimage forgery: a leaf digest never shares a preimage shape with
//! an internal node, and an internal digest does not depend on which child was
//! discovered on which side.
//!
//! The tree is complete and stored as a flat array of `2n - 1` nodes for `n` leaves.
//! The root sits at index 0, the children of node `i` sit at `2i + 1` and `2i + 2`,
//! and the leaves fill the tail of the array in reverse sorted order. This layout
//! tolerates any `n >= 1` directly, with no fabricated padding leaves.

use crate::hasher::NodeHasher;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// A node in the tree. In this schema, it is always 256 bits and is either a leaf
/// hash or the hash of two 256-bit children.
pub type Node = [u8; 32];

/// The root node of a tree, wrapped for hex display.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Root(pub Node);

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root(0x{})", hex::encode(self.0))
    }
}

/// The index of the left child of the node at index `i`.
pub fn left_child(i: usize) -> usize {
    2 * i + 1
}

/// The index of the right child of the node at index `i`.
pub fn right_child(i: usize) -> usize {
    2 * i + 2
}

/// The index of the parent of the node at index `i`, or `None` for the root.
pub fn parent(i: usize) -> Option<usize> {
    if i == 0 {
        None
    } else {
        Some((i - 1) / 2)
    }
}

/// The index of the sibling of the node at index `i`, or `None` for the root.
/// Every non-root node of a complete tree has a sibling.
pub fn sibling(i: usize) -> Option<usize> {
    if i == 0 {
        None
    } else if i % 2 == 0 {
        Some(i - 1)
    } else {
        Some(i + 1)
    }
}

/// A tree cannot be built over zero leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTree;

/// A node array whose length is not `2n - 1` for some `n >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidNodeCount;

/// A built merkle tree: the flat node array plus its leaf count.
///
/// A tree is immutable once built. All queries borrow it, so a single tree may be
/// shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    leaves: usize,
}

impl Tree {
    /// Build a tree over the given leaf hashes.
    ///
    /// The hashes are sorted bytewise ascending before placement, which is what
    /// makes the root independent of the input order. The returned vector maps each
    /// sorted rank to the position the leaf occupied in the input, so callers can
    /// recover where their records ended up.
    pub fn build<H: NodeHasher>(leaf_hashes: &[Node]) -> Result<(Self, Vec<usize>), EmptyTree> {
        if leaf_hashes.is_empty() {
            return Err(EmptyTree);
        }

        let n = leaf_hashes.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| leaf_hashes[a].cmp(&leaf_hashes[b]));

        let mut nodes = vec![[0u8; 32]; 2 * n - 1];
        for (rank, &src) in order.iter().enumerate() {
            nodes[2 * n - 2 - rank] = leaf_hashes[src];
        }
        for i in (0..n - 1).rev() {
            nodes[i] = H::hash_internal(&nodes[left_child(i)], &nodes[right_child(i)]);
        }

        Ok((Tree { nodes, leaves: n }, order))
    }

    /// Reassemble a tree from a raw node array, e.g. one read back from a snapshot.
    ///
    /// Only the length invariant is checked here; callers holding untrusted data
    /// should recompute the internal nodes with [`Tree::verify_integrity`].
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, InvalidNodeCount> {
        if nodes.is_empty() || nodes.len() % 2 == 0 {
            return Err(InvalidNodeCount);
        }
        let leaves = (nodes.len() + 1) / 2;
        Ok(Tree { nodes, leaves })
    }

    /// The root node.
    pub fn root(&self) -> Node {
        self.nodes[0]
    }

    /// The number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// The total number of nodes, `2n - 1`.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The full node array, root first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node at the given array index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out-of-bounds.
    pub fn node(&self, i: usize) -> Node {
        self.nodes[i]
    }

    /// The array index holding the leaf with the given sorted rank.
    /// Rank 0 is the smallest leaf hash; it lives at the end of the array.
    ///
    /// # Panics
    ///
    /// Panics if the rank is not below the leaf count.
    pub fn leaf_slot(&self, rank: usize) -> usize {
        assert!(rank < self.leaves);
        self.nodes.len() - 1 - rank
    }

    /// The sorted rank of the leaf at the given array index.
    ///
    /// # Panics
    ///
    /// Panics if the index is not a leaf slot.
    pub fn rank_of(&self, i: usize) -> usize {
        assert!(self.is_leaf_slot(i));
        self.nodes.len() - 1 - i
    }

    /// Whether the given array index holds a leaf.
    pub fn is_leaf_slot(&self, i: usize) -> bool {
        i >= self.leaves - 1 && i < self.nodes.len()
    }

    /// Recompute every internal node from its children and compare. `true` means the
    /// array is internally consistent; leaf hashes are taken as given.
    pub fn verify_integrity<H: NodeHasher>(&self) -> bool {
        (0..self.leaves.saturating_sub(1)).all(|i| {
            self.nodes[i] == H::hash_internal(&self.nodes[left_child(i)], &self.nodes[right_child(i)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Blake3Hasher;

    #[test]
    fn index_arithmetic() {
        assert_eq!(left_child(0), 1);
        assert_eq!(right_child(0), 2);
        assert_eq!(parent(0), None);
        assert_eq!(sibling(0), None);

        for i in 1..100usize {
            let p = parent(i).unwrap();
            assert!(left_child(p) == i || right_child(p) == i);
            let s = sibling(i).unwrap();
            assert_eq!(parent(s), Some(p));
            assert_ne!(s, i);
        }
    }

    #[test]
    fn build_empty() {
        assert_eq!(Tree::build::<Blake3Hasher>(&[]), Err(EmptyTree));
    }

    #[test]
    fn build_single_leaf() {
        let leaf = [7; 32];
        let (tree, order) = Tree::build::<Blake3Hasher>(&[leaf]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), leaf);
        assert_eq!(order, vec![0]);
        assert!(tree.is_leaf_slot(0));
    }

    #[test]
    fn build_sorts_leaves() {
        let l1 = [1; 32];
        let l2 = [2; 32];
        let l3 = [3; 32];

        let (tree, order) = Tree::build::<Blake3Hasher>(&[l3, l1, l2]).unwrap();

        // rank 0 is the smallest hash and sits at the end of the array.
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(tree.node(4), l1);
        assert_eq!(tree.node(3), l2);
        assert_eq!(tree.node(2), l3);

        let i1 = Blake3Hasher::hash_internal(&l1, &l2);
        let root = Blake3Hasher::hash_internal(&i1, &l3);
        assert_eq!(tree.node(1), i1);
        assert_eq!(tree.root(), root);
    }

    #[test]
    fn root_invariant_under_permutation() {
        let leaves = [[5; 32], [9; 32], [1; 32], [14; 32], [3; 32]];
        let (tree, _) = Tree::build::<Blake3Hasher>(&leaves).unwrap();

        let mut rotated = leaves;
        rotated.rotate_left(2);
        let (tree2, _) = Tree::build::<Blake3Hasher>(&rotated).unwrap();

        assert_eq!(tree.root(), tree2.root());
    }

    #[test]
    fn from_nodes_rejects_even_lengths() {
        assert_eq!(Tree::from_nodes(vec![]), Err(InvalidNodeCount));
        assert_eq!(Tree::from_nodes(vec![[0; 32]; 4]), Err(InvalidNodeCount));

        let tree = Tree::from_nodes(vec![[0; 32]; 5]).unwrap();
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn integrity_check_catches_tampering() {
        let leaves = [[1; 32], [2; 32], [3; 32], [4; 32]];
        let (tree, _) = Tree::build::<Blake3Hasher>(&leaves).unwrap();
        assert!(tree.verify_integrity::<Blake3Hasher>());

        let mut nodes = tree.nodes().to_vec();
        nodes[1][0] ^= 1;
        let tampered = Tree::from_nodes(nodes).unwrap();
        assert!(!tampered.verify_integrity::<Blake3Hasher>());
    }

    #[test]
    fn root_displays_as_hex() {
        let root = Root([0xab; 32]);
        let expected = format!("0x{}", "ab".repeat(32));
        assert_eq!(root.to_string(), expected);
    }
}

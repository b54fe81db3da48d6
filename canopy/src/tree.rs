//! The built tree: value bookkeeping and proofs addressed by input index.

use crate::encode::{FieldValue, LeafSchema, LeafValue};
use crate::error::Error;
use canopy_core::hasher::NodeHasher;
use canopy_core::multi_proof::{self, MultiProof, MultiProofError};
use canopy_core::proof::{self, PathProof};
use canopy_core::tree::{Node, Root, Tree};

use std::marker::PhantomData;

#[cfg(feature = "keccak-hasher")]
use canopy_core::hasher::KeccakHasher;

/// One input value and the tree position its leaf hash landed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexedValue {
    pub value: LeafValue,
    pub tree_index: usize,
}

/// A standard merkle tree built once from a fixed list of typed values.
///
/// Input order is preserved for addressing (proofs are requested by the index a
/// value had in the build input) while the root is independent of it. The tree
/// is immutable and holds no interior mutability, so shared references may cross
/// threads freely.
#[derive(Debug)]
pub struct MerkleTree<H: NodeHasher> {
    tree: Tree,
    schema: LeafSchema,
    values: Vec<IndexedValue>,
    duplicates: Vec<(usize, usize)>,
    _hasher: PhantomData<H>,
}

/// The tree flavor of the original system: keccak-256 throughout.
#[cfg(feature = "keccak-hasher")]
pub type StandardMerkleTree = MerkleTree<KeccakHasher>;

impl<H: NodeHasher> MerkleTree<H> {
    /// Build a tree over the given values.
    ///
    /// Every value must match the schema; any encoding failure aborts the whole
    /// build. Values whose encodings collide into the same leaf hash are legal,
    /// both keep their own position, and are reported by [`MerkleTree::duplicates`]
    /// so accidental double-listing does not pass silently.
    pub fn build(values: Vec<LeafValue>, schema: LeafSchema) -> Result<Self, Error> {
        let mut hashes = Vec::with_capacity(values.len());
        for value in &values {
            hashes.push(schema.leaf_hash::<H>(value)?);
        }

        let (tree, order) = Tree::build::<H>(&hashes)?;

        let mut values: Vec<IndexedValue> = values
            .into_iter()
            .map(|value| IndexedValue {
                value,
                tree_index: 0,
            })
            .collect();
        for (rank, &input) in order.iter().enumerate() {
            values[input].tree_index = tree.leaf_slot(rank);
        }

        // adjacent ranks with equal hashes are colliding inputs
        let mut duplicates = Vec::new();
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if hashes[a] == hashes[b] {
                duplicates.push((a.min(b), a.max(b)));
            }
        }

        Ok(MerkleTree {
            tree,
            schema,
            values,
            duplicates,
            _hasher: PhantomData,
        })
    }

    pub(crate) fn from_parts(
        tree: Tree,
        schema: LeafSchema,
        values: Vec<IndexedValue>,
        duplicates: Vec<(usize, usize)>,
    ) -> Self {
        MerkleTree {
            tree,
            schema,
            values,
            duplicates,
            _hasher: PhantomData,
        }
    }

    /// The root node.
    pub fn root(&self) -> Node {
        self.tree.root()
    }

    /// The root as a `0x`-prefixed hex string.
    pub fn root_hex(&self) -> String {
        Root(self.tree.root()).to_string()
    }

    /// The number of stored values.
    pub fn leaf_count(&self) -> usize {
        self.values.len()
    }

    /// The schema every stored value conforms to.
    pub fn schema(&self) -> &LeafSchema {
        &self.schema
    }

    /// The underlying node array, root first.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Ordered iteration over the original input values.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &LeafValue)> {
        self.values.iter().enumerate().map(|(i, v)| (i, &v.value))
    }

    pub(crate) fn indexed(&self) -> &[IndexedValue] {
        &self.values
    }

    /// Input-index pairs whose values encoded to the same leaf hash. Empty for a
    /// tree without duplicates.
    pub fn duplicates(&self) -> &[(usize, usize)] {
        &self.duplicates
    }

    /// The input index of the first value equal to the given one, if any.
    pub fn lookup(&self, value: &[FieldValue]) -> Option<usize> {
        self.values.iter().position(|v| v.value == value)
    }

    /// The value at the given input index.
    pub fn value(&self, index: usize) -> Result<&LeafValue, Error> {
        self.values
            .get(index)
            .map(|v| &v.value)
            .ok_or(Error::IndexOutOfRange(index))
    }

    /// The tree position of the value at the given input index.
    pub fn tree_index(&self, index: usize) -> Result<usize, Error> {
        self.values
            .get(index)
            .map(|v| v.tree_index)
            .ok_or(Error::IndexOutOfRange(index))
    }

    /// The leaf hash of the value at the given input index, read from the tree
    /// without re-encoding.
    pub fn leaf_hash(&self, index: usize) -> Result<Node, Error> {
        Ok(self.tree.node(self.tree_index(index)?))
    }

    fn rank(&self, index: usize) -> Result<usize, Error> {
        Ok(self.tree.rank_of(self.tree_index(index)?))
    }

    /// The proof for the value at the given input index.
    pub fn proof(&self, index: usize) -> Result<PathProof, Error> {
        let rank = self.rank(index)?;
        // the rank came from our own bookkeeping
        proof::path_proof(&self.tree, rank).map_err(|_| Error::IndexOutOfRange(index))
    }

    /// A multiproof covering the values at the given input indices jointly.
    pub fn multi_proof(&self, indices: &[usize]) -> Result<MultiProof, Error> {
        let mut ranks = Vec::with_capacity(indices.len());
        for &index in indices {
            ranks.push(self.rank(index)?);
        }
        multi_proof::multi_proof(&self.tree, &ranks).map_err(|e| match e {
            MultiProofError::EmptyRequest => Error::EmptyRequest,
            MultiProofError::DuplicateRank => Error::DuplicateRequest,
            // ranks were derived from validated input indices
            MultiProofError::RankOutOfRange => Error::IndexOutOfRange(self.values.len()),
        })
    }

    /// Verify a proof for the stored value at the given input index.
    pub fn verify(&self, index: usize, proof: &PathProof) -> Result<bool, Error> {
        let leaf = self.leaf_hash(index)?;
        Ok(proof::verify_path::<H>(leaf, proof, self.root()))
    }

    /// Stateless single-leaf verification: needs only the schema, the claimed
    /// value, the proof, and the expected root, with no reference to the tree.
    ///
    /// A mismatching proof yields `Ok(false)`; `Err` is reserved for values that
    /// cannot be encoded at all.
    pub fn verify_value(
        schema: &LeafSchema,
        value: &[FieldValue],
        proof: &PathProof,
        root: Node,
    ) -> Result<bool, Error> {
        let leaf = schema.leaf_hash::<H>(value)?;
        Ok(proof::verify_path::<H>(leaf, proof, root))
    }

    /// Stateless multiproof verification over the claimed values.
    pub fn verify_multi(
        schema: &LeafSchema,
        values: &[LeafValue],
        proof: &MultiProof,
        root: Node,
    ) -> Result<bool, Error> {
        let mut leaves = Vec::with_capacity(values.len());
        for value in values {
            leaves.push(schema.leaf_hash::<H>(value)?);
        }
        Ok(multi_proof::verify_multi::<H>(&leaves, proof, root)?)
    }

    /// Recompute every leaf hash from its stored value and every internal node
    /// from its children. Intended for full integrity checks of untrusted
    /// snapshots; [`MerkleTree::load`] performs only structural checks.
    pub fn validate(&self) -> Result<(), Error> {
        for indexed in &self.values {
            let expected = self.schema.leaf_hash::<H>(&indexed.value)?;
            if self.tree.node(indexed.tree_index) != expected {
                return Err(Error::CorruptDump("stored leaf hash does not match value"));
            }
        }
        if !self.tree.verify_integrity::<H>() {
            return Err(Error::CorruptDump("internal node does not match children"));
        }
        Ok(())
    }
}

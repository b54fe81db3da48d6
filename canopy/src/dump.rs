//! Serializable snapshots of a built tree.
//!
//! A dump is a point-in-time export of everything needed to answer future proof
//! and verification queries: the format tag, the leaf-encoding schema, the flat
//! node array, and the value-to-position mapping. Loading reconstructs an
//! equivalent tree without re-deriving leaf hashes from the raw values.

use crate::encode::{FieldValue, LeafSchema, LeafValue};
use crate::error::Error;
use crate::tree::{IndexedValue, MerkleTree};
use canopy_core::hasher::NodeHasher;
use canopy_core::tree::{Node, Tree};

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Format tag written into every dump produced by this crate.
pub const DUMP_FORMAT: &str = "canopy-v1";

/// A serializable snapshot of a built tree.
///
/// The layout is a plain data record so it survives any serde text format; the
/// crate ships JSON helpers since that is the interchange format of the original
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump {
    /// Format version tag.
    pub format: String,
    /// Field-kind schema in declared order, e.g. `["address", "uint256"]`.
    pub leaf_encoding: Vec<String>,
    /// The flat node array, root first, `0x`-prefixed hex.
    pub tree: Vec<String>,
    /// Raw values with the tree position of their leaf hash, in input order.
    pub values: Vec<DumpEntry>,
}

/// One value of a [`TreeDump`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpEntry {
    /// String form of each field, in schema order.
    pub value: Vec<String>,
    /// Index into `tree` where this value's leaf hash lives.
    pub tree_index: usize,
}

impl TreeDump {
    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|_| Error::CorruptDump("unserializable dump"))
    }

    /// Parse from JSON text. Only the text layer is checked here; structural
    /// validation happens in [`MerkleTree::load`].
    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|_| Error::CorruptDump("malformed JSON text"))
    }
}

fn decode_node(s: &str) -> Result<Node, Error> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| Error::CorruptDump("node digest is not hex"))?;
    if bytes.len() != 32 {
        return Err(Error::CorruptDump("node digest has the wrong width"));
    }
    let mut node = [0u8; 32];
    node.copy_from_slice(&bytes);
    Ok(node)
}

impl<H: NodeHasher> MerkleTree<H> {
    /// Export a snapshot sufficient to answer all future proof queries.
    pub fn dump(&self) -> TreeDump {
        TreeDump {
            format: DUMP_FORMAT.into(),
            leaf_encoding: self.schema().kinds().iter().map(|k| k.to_string()).collect(),
            tree: self
                .tree()
                .nodes()
                .iter()
                .map(|n| format!("0x{}", hex::encode(n)))
                .collect(),
            values: self
                .indexed()
                .iter()
                .map(|indexed| DumpEntry {
                    value: indexed.value.iter().map(FieldValue::to_string_repr).collect(),
                    tree_index: indexed.tree_index,
                })
                .collect(),
        }
    }

    /// Reconstruct a tree from a snapshot.
    ///
    /// Fails with [`Error::UnsupportedFormat`] on an unrecognized format tag and
    /// with [`Error::CorruptDump`] when the record is internally inconsistent:
    /// a node array that is not `2n - 1` long, a value count that does not match
    /// the leaf count, or a position mapping that strays outside the leaf slots
    /// or maps two values onto one slot. Leaf hashes are *not* re-derived from
    /// the raw values here; callers holding untrusted data should follow up with
    /// [`MerkleTree::validate`].
    pub fn load(dump: &TreeDump) -> Result<Self, Error> {
        if dump.format != DUMP_FORMAT {
            return Err(Error::UnsupportedFormat(dump.format.clone()));
        }

        let kinds = dump
            .leaf_encoding
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::CorruptDump("unrecognized leaf-encoding entry"))?;
        let schema = LeafSchema::new(kinds);

        let nodes = dump
            .tree
            .iter()
            .map(|s| decode_node(s))
            .collect::<Result<Vec<_>, _>>()?;
        let tree =
            Tree::from_nodes(nodes).map_err(|_| Error::CorruptDump("node count is not 2n - 1"))?;

        let n = tree.leaf_count();
        if dump.values.len() != n {
            return Err(Error::CorruptDump("value count does not match leaf count"));
        }

        let mut mapped = bitvec![0; n];
        let mut values = Vec::with_capacity(n);
        for entry in &dump.values {
            if !tree.is_leaf_slot(entry.tree_index) {
                return Err(Error::CorruptDump("tree index is not a leaf slot"));
            }
            let rank = tree.rank_of(entry.tree_index);
            if mapped[rank] {
                return Err(Error::CorruptDump("two values map onto one leaf slot"));
            }
            mapped.set(rank, true);

            if entry.value.len() != schema.kinds().len() {
                return Err(Error::CorruptDump("value arity does not match schema"));
            }
            let fields = schema
                .kinds()
                .iter()
                .zip(&entry.value)
                .map(|(&kind, s)| FieldValue::parse(kind, s))
                .collect::<Result<LeafValue, _>>()
                .map_err(|_| Error::CorruptDump("malformed field value"))?;

            values.push(IndexedValue {
                value: fields,
                tree_index: entry.tree_index,
            });
        }

        // every value mapped onto a distinct leaf slot, and the counts match, so
        // the mapping is a bijection; recover the duplicate report from adjacent
        // equal leaves in the sorted tail
        let mut rank_to_input = vec![0usize; n];
        for (input, indexed) in values.iter().enumerate() {
            rank_to_input[tree.rank_of(indexed.tree_index)] = input;
        }
        let mut duplicates = Vec::new();
        for rank in 1..n {
            if tree.node(tree.leaf_slot(rank - 1)) == tree.node(tree.leaf_slot(rank)) {
                let (a, b) = (rank_to_input[rank - 1], rank_to_input[rank]);
                duplicates.push((a.min(b), a.max(b)));
            }
        }

        Ok(MerkleTree::from_parts(tree, schema, values, duplicates))
    }
}

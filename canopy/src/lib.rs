//! Canopy: a standard merkle tree over typed leaf values.
//!
//! A tree is built once from a fixed list of typed records and is immutable
//! thereafter. Each record encodes canonically and is hashed twice into a
//! 32-byte leaf; leaves are sorted and assembled into a flat-array complete
//! binary tree whose internal nodes hash their children in canonical byte
//! order. The resulting root is independent of the input order, and proofs
//! carry no positional side information.
//!
//! ```
//! use canopy::{FieldValue, LeafSchema, StandardMerkleTree};
//!
//! let schema = LeafSchema::parse(&["address", "uint256"]).unwrap();
//! let values = vec![
//!     vec![
//!         FieldValue::address("0x1111111111111111111111111111111111111111").unwrap(),
//!         FieldValue::uint(1u64),
//!     ],
//!     vec![
//!         FieldValue::address("0x2222222222222222222222222222222222222222").unwrap(),
//!         FieldValue::uint(2u64),
//!     ],
//! ];
//!
//! let tree = StandardMerkleTree::build(values, schema).unwrap();
//! let proof = tree.proof(0).unwrap();
//! assert!(tree.verify(0, &proof).unwrap());
//! println!("root: {}", tree.root_hex());
//! ```

pub use canopy_core::hasher;
pub use canopy_core::multi_proof::MultiProof;
pub use canopy_core::proof::PathProof;
pub use canopy_core::tree::{Node, Root};

mod dump;
mod encode;
mod error;
mod tree;

pub use dump::{DumpEntry, TreeDump, DUMP_FORMAT};
pub use encode::{Address, EncodingError, FieldKind, FieldValue, LeafSchema, LeafValue};
pub use error::Error;
pub use tree::MerkleTree;

#[cfg(feature = "keccak-hasher")]
pub use tree::StandardMerkleTree;

//! Error taxonomy of the public API.
//!
//! Construction-time failures abort the whole build; there is no partial tree.
//! Query-time failures are local to the query and leave the tree intact. A
//! verification mismatch is never an error: it is the expected negative-path
//! boolean result.

use crate::encode::EncodingError;
use canopy_core::multi_proof::MultiProofVerificationError;
use canopy_core::tree::EmptyTree;

use std::fmt;

/// Errors surfaced by tree construction, queries, and snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A leaf value could not be canonically encoded.
    Encoding(EncodingError),
    /// A tree cannot be built over zero leaves.
    EmptyTree,
    /// A multiproof was requested for an empty leaf set.
    EmptyRequest,
    /// A multiproof request repeated the same leaf.
    DuplicateRequest,
    /// The given input index does not correspond to a stored leaf.
    IndexOutOfRange(usize),
    /// A proof was structurally broken. This is distinct from a proof that
    /// merely fails to match the root, which verification reports as `false`.
    MalformedProof(MultiProofVerificationError),
    /// A snapshot carried an unrecognized format tag.
    UnsupportedFormat(String),
    /// A snapshot failed an internal consistency check.
    CorruptDump(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Encoding(e) => write!(f, "leaf encoding failed: {}", e),
            Error::EmptyTree => write!(f, "cannot build a tree over zero leaves"),
            Error::EmptyRequest => write!(f, "multiproof requested for an empty leaf set"),
            Error::DuplicateRequest => write!(f, "multiproof request repeats a leaf"),
            Error::IndexOutOfRange(i) => write!(f, "no leaf at input index {}", i),
            Error::MalformedProof(e) => write!(f, "structurally broken proof: {:?}", e),
            Error::UnsupportedFormat(tag) => write!(f, "unrecognized dump format {:?}", tag),
            Error::CorruptDump(reason) => write!(f, "corrupt dump: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EncodingError> for Error {
    fn from(e: EncodingError) -> Self {
        Error::Encoding(e)
    }
}

impl From<EmptyTree> for Error {
    fn from(_: EmptyTree) -> Self {
        Error::EmptyTree
    }
}

impl From<MultiProofVerificationError> for Error {
    fn from(e: MultiProofVerificationError) -> Self {
        Error::MalformedProof(e)
    }
}

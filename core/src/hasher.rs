//! Hashers (feature-gated) and utilities for implementing them.

use crate::tree::Node;

/// A tree node hash function specialized for this schema.
///
/// A node hasher must domain-separate leaf and internal nodes. Here that is done
/// structurally rather than by bit-labeling: a leaf is the hash of a single hash,
/// while an internal node is the hash of 64 bytes of child material. An attacker
/// can therefore never present the two children of an internal node as if they
/// were the encoding of a leaf.
pub trait NodeHasher {
    /// Hash an encoded leaf value. The encoding is hashed twice; the outer hash is
    /// the leaf node.
    fn hash_leaf(encoded: &[u8]) -> Node;

    /// Hash an internal node from its two children. The children are combined in
    /// canonical byte order, so the digest does not depend on which child sits on
    /// which side.
    fn hash_internal(a: &Node, b: &Node) -> Node;
}

/// A simple trait for representing binary hash functions.
pub trait BinaryHash {
    /// Given a bit-string, produce a 32-byte hash.
    fn hash(input: &[u8]) -> [u8; 32];

    /// An optional specialization of `hash` where there are two 32-byte inputs, left
    /// and right.
    fn hash2_32_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut buf = [0u8; 64];
        buf[0..32].copy_from_slice(left);
        buf[32..64].copy_from_slice(right);
        Self::hash(&buf)
    }
}

/// A node hasher constructed from a simple binary hasher.
///
/// This implements a [`NodeHasher`] which double-hashes leaf encodings and sorts
/// sibling digests before hashing, per the tree schema.
///
/// The binary hash wrapped by this structure must behave approximately like a
/// random oracle over the space 2^256, i.e. all 256 bit outputs are valid and
/// inputs are uniformly distributed.
///
/// Functions like Keccak/Sha2/Blake3/Groestl all meet these criteria.
#[derive(Debug)]
pub struct BinaryHasher<H>(core::marker::PhantomData<H>);

impl<H: BinaryHash> NodeHasher for BinaryHasher<H> {
    fn hash_leaf(encoded: &[u8]) -> Node {
        H::hash(&H::hash(encoded))
    }

    fn hash_internal(a: &Node, b: &Node) -> Node {
        if a <= b {
            H::hash2_32_concat(a, b)
        } else {
            H::hash2_32_concat(b, a)
        }
    }
}

/// Blanket implementation for all implementations of `Digest`
impl<H: digest::Digest<OutputSize = digest::typenum::U32> + Send + Sync> BinaryHash for H {
    fn hash(input: &[u8]) -> [u8; 32] {
        H::digest(input).into()
    }
}

#[cfg(feature = "keccak-hasher")]
pub use keccak::KeccakHasher;

/// A node hasher making use of keccak-256.
#[cfg(feature = "keccak-hasher")]
pub mod keccak {
    use super::{BinaryHash, BinaryHasher};
    use sha3::{Digest, Keccak256};

    /// A [`BinaryHash`] implementation for Keccak-256.
    #[derive(Debug)]
    pub struct KeccakBinaryHasher;

    /// A wrapper around keccak-256 for use in Canopy.
    pub type KeccakHasher = BinaryHasher<KeccakBinaryHasher>;

    impl BinaryHash for KeccakBinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            let mut hasher = Keccak256::new();
            hasher.update(value);
            hasher.finalize().into()
        }

        fn hash2_32_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
            let mut hasher = Keccak256::new();
            hasher.update(left);
            hasher.update(right);
            hasher.finalize().into()
        }
    }
}

#[cfg(any(feature = "blake3-hasher", test))]
pub use blake3::Blake3Hasher;

/// A node hasher making use of blake3.
#[cfg(any(feature = "blake3-hasher", test))]
pub mod blake3 {
    use super::{BinaryHash, BinaryHasher};

    /// A [`BinaryHash`] implementation for Blake3.
    #[derive(Debug)]
    pub struct Blake3BinaryHasher;

    /// A wrapper around Blake3 for use in Canopy.
    pub type Blake3Hasher = BinaryHasher<Blake3BinaryHasher>;

    impl BinaryHash for Blake3BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            blake3::hash(value).into()
        }

        fn hash2_32_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
            let mut hasher = blake3::Hasher::new();
            hasher.update(left);
            hasher.update(right);
            hasher.finalize().into()
        }
    }
}

#[cfg(feature = "sha2-hasher")]
pub use sha2::Sha2Hasher;

/// A node hasher making use of sha2-256.
#[cfg(feature = "sha2-hasher")]
pub mod sha2 {
    use super::{BinaryHash, BinaryHasher};
    use sha2::{Digest, Sha256};

    /// A [`BinaryHash`] implementation for Sha2.
    #[derive(Debug)]
    pub struct Sha2BinaryHasher;

    /// A wrapper around sha2-256 for use in Canopy.
    pub type Sha2Hasher = BinaryHasher<Sha2BinaryHasher>;

    impl BinaryHash for Sha2BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(value);
            hasher.finalize().into()
        }

        fn hash2_32_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(left);
            hasher.update(right);
            hasher.finalize().into()
        }
    }
}

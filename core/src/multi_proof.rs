//! Generate a multiproof covering several leaves at once.
//!
//! A multiproof carries the minimum sibling material needed to reconstruct the
//! root from the requested leaves jointly. Wherever two requested leaves (or
//! nodes derived from them) are siblings, no material is emitted at all; a flag
//! sequence records, per hashing step, whether the second input was already
//! known (`true`) or must be consumed from the sibling list (`false`). Total
//! proof material is `O(k * log(n / k))` for `k` requested leaves, against
//! `O(k * log n)` for `k` standalone path proofs.

use crate::hasher::NodeHasher;
use crate::tree::{parent, sibling, Node, Tree};

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// A compacted proof of several leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiProof {
    /// Sibling nodes not derivable from the requested leaves, in consumption order.
    pub siblings: Vec<Node>,
    /// One flag per hashing step of the replay: `true` means both inputs were
    /// already known, `false` means the next sibling must be consumed.
    pub flags: Vec<bool>,
}

/// Errors in multiproof extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiProofError {
    /// No leaves were requested.
    EmptyRequest,
    /// A requested rank does not correspond to a stored leaf.
    RankOutOfRange,
    /// The same rank was requested more than once.
    DuplicateRank,
}

/// Extract a multiproof covering the leaves with the given sorted ranks.
///
/// Emission order is a pure function of the tree shape and the requested set:
/// positions are processed deepest-first (descending array index), and each
/// computed parent re-enters the work queue behind its level. Verification can
/// therefore replay the exact order without side information.
pub fn multi_proof(tree: &Tree, ranks: &[usize]) -> Result<MultiProof, MultiProofError> {
    if ranks.is_empty() {
        return Err(MultiProofError::EmptyRequest);
    }

    let mut positions: Vec<usize> = Vec::with_capacity(ranks.len());
    for &rank in ranks {
        if rank >= tree.leaf_count() {
            return Err(MultiProofError::RankOutOfRange);
        }
        positions.push(tree.leaf_slot(rank));
    }
    positions.sort_unstable_by(|a, b| b.cmp(a));
    if positions.windows(2).any(|w| w[0] == w[1]) {
        return Err(MultiProofError::DuplicateRank);
    }

    let mut queue: VecDeque<usize> = positions.into();
    let mut siblings = Vec::new();
    let mut flags = Vec::new();

    // Walk the known set toward the root. At each step the deepest known node is
    // paired: either its sibling is the next known node (flag = true) or the
    // sibling must be supplied (flag = false). Either way the parent becomes known.
    while let Some(&front) = queue.front() {
        if front == 0 {
            break;
        }
        queue.pop_front();

        // non-root nodes of a complete tree always have a sibling and a parent
        let (s, p) = match (sibling(front), parent(front)) {
            (Some(s), Some(p)) => (s, p),
            _ => break,
        };

        if queue.front() == Some(&s) {
            flags.push(true);
            queue.pop_front();
        } else {
            flags.push(false);
            siblings.push(tree.node(s));
        }
        queue.push_back(p);
    }

    Ok(MultiProof { siblings, flags })
}

/// Errors in multiproof verification.
///
/// These cover structural defects only. A proof that replays cleanly but folds to
/// a different root is reported as a `false` verification result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiProofVerificationError {
    /// Flag count inconsistent with the number of leaves and siblings.
    FlagCountMismatch,
    /// The flag sequence requested more nodes than were available.
    NodeUnderflow,
}

/// Replay a multiproof bottom-up from the given leaf hashes, producing the root
/// candidate.
///
/// The leaves are re-sorted ascending before the replay. Leaves are stored in
/// sorted order, so ascending hash order reproduces exactly the deepest-first
/// emission order of [`multi_proof`]. The declared ordering travels with the
/// leaf hashes themselves rather than with the proof.
pub fn process_multi<H: NodeHasher>(
    leaves: &[Node],
    proof: &MultiProof,
) -> Result<Node, MultiProofVerificationError> {
    // every step consumes two nodes and produces one, and exactly one node
    // (the root) must remain
    if proof.flags.len() + 1 != leaves.len() + proof.siblings.len() {
        return Err(MultiProofVerificationError::FlagCountMismatch);
    }

    let mut sorted = leaves.to_vec();
    sorted.sort_unstable();

    let mut stack: VecDeque<Node> = sorted.into();
    let mut siblings = proof.siblings.iter();

    for &flag in &proof.flags {
        let a = stack
            .pop_front()
            .ok_or(MultiProofVerificationError::NodeUnderflow)?;
        let b = if flag {
            stack
                .pop_front()
                .ok_or(MultiProofVerificationError::NodeUnderflow)?
        } else {
            *siblings
                .next()
                .ok_or(MultiProofVerificationError::NodeUnderflow)?
        };
        stack.push_back(H::hash_internal(&a, &b));
    }

    match stack.pop_front() {
        Some(node) => Ok(node),
        // no flags and no leaves: the proof must carry the root itself
        None => siblings
            .next()
            .copied()
            .ok_or(MultiProofVerificationError::NodeUnderflow),
    }
}

/// Verify a multiproof against an expected root.
///
/// A mismatch is a normal negative result; `Err` is reserved for structurally
/// broken proofs.
pub fn verify_multi<H: NodeHasher>(
    leaves: &[Node],
    proof: &MultiProof,
    root: Node,
) -> Result<bool, MultiProofVerificationError> {
    Ok(process_multi::<H>(leaves, proof)? == root)
}

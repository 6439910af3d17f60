//! Merkle inclusion trees over vote commitments.
//!
//! Leaves and interior nodes are hashed with distinct prefixes, and each pair
//! is hashed smallest first, so a proof is just the list of siblings from
//! leaf to root.

use data_encoding::HEXLOWER_PERMISSIVE;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

mod election;
mod proof;
mod tree;

pub use election::{build_tree_for_election, prove_inclusion_for_election, prove_many_for_election};
pub use proof::{verify_many, Proof};
pub use tree::MerkleTree;

pub type Digest = [u8; 32];

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Cannot build a Merkle tree with no commitments")]
    Empty,
    #[error("Commitment '{0}' is not valid hex")]
    MalformedCommitment(String),
}

/// Hash of one commitment, given as raw bytes.
pub fn hash_leaf(commitment: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(commitment);
    hasher.finalize().into()
}

/// Hash of two sibling nodes, in byte-wise order.
pub fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// Decode a hex string as used for commitments and proof nodes.
pub(crate) fn decode_hex(s: &str) -> Option<Vec<u8>> {
    HEXLOWER_PERMISSIVE.decode(s.as_bytes()).ok()
}

/// Decode a hex-encoded node hash.
pub(crate) fn decode_digest(s: &str) -> Option<Digest> {
    decode_hex(s)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_hash_is_symmetric() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &a));
    }

    #[test]
    fn leaves_and_nodes_are_domain_separated() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut concatenated = lo.to_vec();
        concatenated.extend_from_slice(&hi);
        assert_ne!(hash_leaf(&concatenated), hash_pair(&a, &b));
    }

    #[test]
    fn digests_must_be_32_bytes() {
        assert!(decode_digest(&"ab".repeat(32)).is_some());
        assert!(decode_digest(&"ab".repeat(31)).is_none());
        assert!(decode_digest("not hex").is_none());
    }
}

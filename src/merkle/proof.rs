use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::{decode_digest, decode_hex, hash_leaf, hash_pair};

/// An inclusion proof for one commitment.
///
/// Self-contained: anyone holding it can check it against a published root
/// without access to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// The hex-encoded commitment being proven.
    pub leaf: String,
    /// Hex-encoded sibling hashes, ordered from the leaf upwards.
    pub proof: Vec<String>,
    /// Hex-encoded root the proof leads to.
    pub root: String,
}

impl Proof {
    /// Does this proof lead from its leaf to its root?
    ///
    /// Any malformed field makes the proof invalid.
    pub fn verify(&self) -> bool {
        let (Some(leaf), Some(root)) = (decode_hex(&self.leaf), decode_digest(&self.root)) else {
            return false;
        };

        let mut node = hash_leaf(&leaf);
        for sibling in &self.proof {
            let Some(sibling) = decode_digest(sibling) else {
                return false;
            };
            node = hash_pair(&node, &sibling);
        }

        node[..].ct_eq(&root[..]).into()
    }
}

/// Verify each proof independently, preserving order.
pub fn verify_many(proofs: &[Proof]) -> Vec<bool> {
    proofs.iter().map(Proof::verify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::merkle::MerkleTree;

    fn tree_and_proof() -> (MerkleTree, Proof) {
        let leaves: Vec<_> = (1..=5).map(|i| format!("{i:064x}")).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let proof = tree.prove(&leaves[2]).unwrap();
        (tree, proof)
    }

    #[test]
    fn valid_proof_verifies() {
        let (tree, proof) = tree_and_proof();
        assert_eq!(proof.root, tree.root_hex());
        assert!(proof.verify());
    }

    #[test]
    fn altered_fields_fail() {
        let (_, proof) = tree_and_proof();

        let mut wrong_leaf = proof.clone();
        wrong_leaf.leaf = format!("{:064x}", 99);
        assert!(!wrong_leaf.verify());

        let mut wrong_root = proof.clone();
        wrong_root.root = "00".repeat(32);
        assert!(!wrong_root.verify());

        let mut missing_step = proof.clone();
        missing_step.proof.pop();
        assert!(!missing_step.verify());
    }

    #[test]
    fn malformed_hex_fails() {
        let (_, proof) = tree_and_proof();

        let mut bad_leaf = proof.clone();
        bad_leaf.leaf = "xyz".to_string();
        assert!(!bad_leaf.verify());

        let mut bad_sibling = proof.clone();
        bad_sibling.proof[0] = "abc".to_string();
        assert!(!bad_sibling.verify());

        let mut short_root = proof;
        short_root.root.truncate(62);
        assert!(!short_root.verify());
    }

    #[test]
    fn batch_does_not_short_circuit() {
        let (_, good) = tree_and_proof();
        let mut bad = good.clone();
        bad.root = "ff".repeat(32);
        assert_eq!(
            verify_many(&[bad.clone(), good.clone(), bad, good]),
            vec![false, true, false, true]
        );
        assert!(verify_many(&[]).is_empty());
    }

    #[test]
    fn proof_json_shape() {
        let (_, proof) = tree_and_proof();
        let value = rocket::serde::json::serde_json::to_value(&proof).unwrap();
        assert!(value["leaf"].is_string());
        assert!(value["proof"].is_array());
        assert!(value["root"].is_string());
    }
}

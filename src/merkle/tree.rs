use data_encoding::HEXLOWER;
use log::debug;

use super::{decode_hex, hash_leaf, hash_pair, Digest, Proof, TreeError};

/// A binary Merkle tree with every layer retained, so proofs are cheap.
///
/// Leaf hashes are sorted and de-duplicated before layering: the same set of
/// commitments always gives the same root, whatever order they arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` holds the leaf hashes; the last layer holds only the root.
    layers: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree over hex-encoded commitments.
    pub fn build<I, S>(commitments: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut leaves = commitments
            .into_iter()
            .map(|commitment| {
                let commitment = commitment.as_ref();
                decode_hex(commitment)
                    .map(|bytes| hash_leaf(&bytes))
                    .ok_or_else(|| TreeError::MalformedCommitment(commitment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if leaves.is_empty() {
            return Err(TreeError::Empty);
        }
        leaves.sort_unstable();
        leaves.dedup();

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            // An odd node out is promoted to the next layer unchanged.
            let next = layer
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    [a] => *a,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }
        debug!(
            "Built Merkle tree with {} leaves and {} layers",
            layers[0].len(),
            layers.len()
        );

        Ok(Self { layers })
    }

    pub fn root(&self) -> Digest {
        // Non-empty by construction.
        self.layers[self.layers.len() - 1][0]
    }

    pub fn root_hex(&self) -> String {
        HEXLOWER.encode(&self.root())
    }

    /// Number of distinct leaves.
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Prove that a commitment is in this tree, or `None` if it is not.
    pub fn prove(&self, commitment: &str) -> Option<Proof> {
        let leaf = hash_leaf(&decode_hex(commitment)?);
        let mut index = self.layers[0].binary_search(&leaf).ok()?;

        let mut siblings = Vec::with_capacity(self.layers.len() - 1);
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(index ^ 1) {
                siblings.push(HEXLOWER.encode(sibling));
            }
            index /= 2;
        }

        Some(Proof {
            leaf: commitment.to_string(),
            proof: siblings,
            root: self.root_hex(),
        })
    }

    /// Prove each commitment independently.
    pub fn prove_many<S: AsRef<str>>(&self, commitments: &[S]) -> Vec<Option<Proof>> {
        commitments
            .iter()
            .map(|commitment| self.prove(commitment.as_ref()))
            .collect()
    }
}

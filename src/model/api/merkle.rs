use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{db::MerkleRootRecord, mongodb::Id};

/// The published summary of an election's Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub election_id: Id,
    /// Hex-encoded root hash.
    pub root: String,
    pub leaf_count: u64,
    pub computed_at: DateTime<Utc>,
}

impl TreeSummary {
    pub fn new(election_id: Id, record: MerkleRootRecord) -> Self {
        Self {
            election_id,
            root: record.root,
            leaf_count: record.leaf_count,
            computed_at: record.computed_at,
        }
    }
}

/// Outcome of checking one proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub valid: bool,
}

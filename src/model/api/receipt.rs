use serde::{Deserialize, Serialize};

use crate::model::{common::VoteType, mongodb::Id};

/// A receipt for one cast vote, returned to the voter exactly once.
///
/// The nonce is not kept anywhere on the server; together with the vote
/// content it lets the voter recompute and look up their commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub ballot_id: Id,
    pub vote_type: VoteType,
    pub candidate_id: Option<Id>,
    /// Hex-encoded commitment, as stored and as included in the Merkle tree.
    pub vote_hash: String,
    /// Hex-encoded nonce.
    pub nonce: String,
}

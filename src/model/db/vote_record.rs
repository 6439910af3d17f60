use serde::{Deserialize, Serialize};

use crate::model::{common::VoteType, mongodb::Id};

/// A persisted, anonymised vote.
///
/// Must never carry a voter reference or a cast timestamp: nothing here may
/// be joinable back to an [`EligibleVoter`](super::EligibleVoter). This
/// includes the ID, which is [`Id::untimed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(rename = "_id")]
    pub id: Id,
    /// Foreign Key election ID, denormalised from the ballot for scoping.
    pub election_id: Id,
    /// Foreign Key ballot ID.
    pub ballot_id: Id,
    pub candidate_id: Option<Id>,
    pub vote_type: VoteType,
    /// Hex-encoded commitment over the vote and its nonce.
    pub vote_hash: String,
}

impl VoteRecord {
    pub fn new(
        election_id: Id,
        ballot_id: Id,
        candidate_id: Option<Id>,
        vote_type: VoteType,
        vote_hash: String,
    ) -> Self {
        Self {
            id: Id::untimed(),
            election_id,
            ballot_id,
            candidate_id,
            vote_type,
            vote_hash,
        }
    }
}

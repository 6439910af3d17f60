use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{BallotType, VoteType},
    db::{Ballot, Candidate},
    mongodb::Id,
};

/// A vote that the voter wishes to cast on one ballot.
///
/// This is untrusted input; it only becomes castable once it has passed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedVote {
    pub ballot_id: Id,
    pub vote_type: VoteType,
    #[serde(default)]
    pub candidate_id: Option<Id>,
}

impl ProposedVote {
    pub fn new(ballot_id: Id, vote_type: VoteType, candidate_id: impl Into<Option<Id>>) -> Self {
        Self {
            ballot_id,
            vote_type,
            candidate_id: candidate_id.into(),
        }
    }
}

/// A ballot as presented to a voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotDescription {
    pub id: Id,
    pub election_id: Id,
    pub title: String,
    #[serde(flatten)]
    pub ballot_type: BallotType,
    pub created_at: DateTime<Utc>,
    pub candidates: Vec<Candidate>,
}

impl From<Ballot> for BallotDescription {
    fn from(ballot: Ballot) -> Self {
        Self {
            id: ballot.id,
            election_id: ballot.election_id,
            title: ballot.title,
            ballot_type: ballot.ballot_type,
            created_at: ballot.created_at,
            candidates: ballot.candidates,
        }
    }
}

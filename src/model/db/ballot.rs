use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{BallotCategory, BallotType},
    mongodb::Id,
};

/// A candidate standing on a particular ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Optional candidate statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, statement: Option<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            statement,
        }
    }
}

/// A ballot from the database. Candidates are owned by, and stored within,
/// their ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "_id")]
    pub id: Id,
    /// Foreign Key election ID.
    pub election_id: Id,
    /// Ballot title shown to voters.
    pub title: String,
    pub ballot_type: BallotType,
    /// Creation time, which orders ballots within their category.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Candidates in display order. Usually empty for referendums.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Ballot {
    pub fn new(
        election_id: Id,
        title: impl Into<String>,
        ballot_type: BallotType,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            id: Id::new(),
            election_id,
            title: title.into(),
            ballot_type,
            created_at: Utc::now(),
            candidates,
        }
    }

    pub fn category(&self) -> BallotCategory {
        self.ballot_type.category()
    }

    /// Look up a candidate on this ballot.
    pub fn candidate(&self, candidate_id: Id) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Ballot categories, declared in the order ballots are presented to voters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallotCategory {
    Executive,
    Director,
    Referendum,
}

/// The type of a ballot. Director ballots are restricted to a single college.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallotType {
    Executive,
    Director { college: String },
    Referendum,
}

impl BallotType {
    pub fn category(&self) -> BallotCategory {
        match self {
            Self::Executive => BallotCategory::Executive,
            Self::Director { .. } => BallotCategory::Director,
            Self::Referendum => BallotCategory::Referendum,
        }
    }

    /// The college this ballot is restricted to, if any.
    pub fn college(&self) -> Option<&str> {
        match self {
            Self::Director { college } => Some(college),
            _ => None,
        }
    }

    /// Can a voter from the given college vote on a ballot of this type?
    pub fn admits(&self, voter_college: &str) -> bool {
        self.college()
            .map_or(true, |college| college == voter_college)
    }
}

/// The kind of vote being cast. Which kinds are legal depends on the ballot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Yes,
    No,
    Abstain,
    Candidate,
    Approve,
    Oppose,
}

impl VoteType {
    pub const ALL: [VoteType; 6] = [
        Self::Yes,
        Self::No,
        Self::Abstain,
        Self::Candidate,
        Self::Approve,
        Self::Oppose,
    ];

    /// Canonical name, as used on the wire and in vote hashes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Abstain => "ABSTAIN",
            Self::Candidate => "CANDIDATE",
            Self::Approve => "APPROVE",
            Self::Oppose => "OPPOSE",
        }
    }
}

impl Display for VoteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

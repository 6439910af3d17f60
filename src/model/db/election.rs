use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{common::BallotCategory, mongodb::Id};

/// An election window that does not open before it closes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Election must start before it ends (start {start_time}, end {end_time})")]
pub struct InvalidWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Minimum participation, as a percentage of eligible voters, for each
/// ballot category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quorum {
    pub executive: u8,
    pub director: u8,
    pub referendum: u8,
}

impl Quorum {
    pub fn threshold(&self, category: BallotCategory) -> u8 {
        match category {
            BallotCategory::Executive => self.executive,
            BallotCategory::Director => self.director,
            BallotCategory::Referendum => self.referendum,
        }
    }
}

/// The most recently computed Merkle root over an election's commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleRootRecord {
    /// Hex-encoded root hash.
    pub root: String,
    /// Number of distinct leaves the root covers.
    pub leaf_count: u64,
    /// When the tree was built.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub computed_at: DateTime<Utc>,
}

/// Core election data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election name.
    pub name: String,
    /// Voting opens at this instant (inclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Voting closes at this instant (exclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Inactive elections accept no votes regardless of the window.
    pub active: bool,
    /// Participation thresholds, consumed by results tooling.
    pub quorum: Quorum,
    /// Last computed Merkle root, if any.
    #[serde(default)]
    pub merkle_root: Option<MerkleRootRecord>,
}

impl ElectionCore {
    /// Create a new, active election.
    pub fn new(
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        quorum: Quorum,
    ) -> Result<Self, InvalidWindow> {
        if start_time >= end_time {
            return Err(InvalidWindow {
                start_time,
                end_time,
            });
        }

        Ok(Self {
            name,
            start_time,
            end_time,
            active: true,
            quorum,
            merkle_root: None,
        })
    }

    /// Has voting closed?
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Election {
    pub fn new(election: ElectionCore) -> Self {
        Self {
            id: Id::new(),
            election,
        }
    }
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn window_must_be_ordered() {
        let now = Utc::now();
        let err = ElectionCore::new("Backwards".to_string(), now, now, Quorum::default())
            .unwrap_err();
        assert_eq!(err.start_time, now);

        let later = now + Duration::minutes(1);
        assert!(ElectionCore::new("Backwards".to_string(), later, now, Quorum::default()).is_err());
        assert!(ElectionCore::new("Forwards".to_string(), now, later, Quorum::default()).is_ok());
    }

    #[test]
    fn end_time_is_exclusive() {
        let election = Election::open_example();
        assert!(!election.has_ended(election.end_time - Duration::seconds(1)));
        assert!(election.has_ended(election.end_time));
    }

    #[test]
    fn quorum_by_category() {
        let election = Election::open_example();
        assert_eq!(election.quorum.threshold(BallotCategory::Executive), 10);
        assert_eq!(election.quorum.threshold(BallotCategory::Director), 20);
        assert_eq!(election.quorum.threshold(BallotCategory::Referendum), 50);
    }
}

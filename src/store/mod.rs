//! Persistence for elections, voters and anonymised vote records.
//!
//! Everything above this module talks to a [`VoteStore`]; production uses
//! [`MongoStore`], tests and local development use [`MemoryStore`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::{
    bson::{de::Error as DeError, ser::Error as SerError},
    error::Error as DbError,
};
use thiserror::Error;

use crate::model::{
    db::{Ballot, Election, EligibleVoter, MerkleRootRecord, VoteRecord},
    mongodb::Id,
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// The store as held in Rocket managed state.
pub type SharedStore = Arc<dyn VoteStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The voter's `has_voted` flag was already set when we tried to claim it.
    #[error("Voter {0} has already voted")]
    AlreadyVoted(Id),
    #[error("Vote hash already recorded")]
    DuplicateHash,
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Serialization(#[from] SerError),
    /// A stored or aggregated document did not have the expected shape.
    #[error(transparent)]
    Deserialization(#[from] DeError),
}

/// Eligible voter totals for one election.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterCounts {
    pub total: u64,
    pub by_college: HashMap<String, u64>,
}

impl VoterCounts {
    pub fn in_college(&self, college: &str) -> u64 {
        self.by_college.get(college).copied().unwrap_or(0)
    }
}

#[rocket::async_trait]
pub trait VoteStore: Send + Sync {
    async fn election(&self, election_id: Id) -> Result<Option<Election>, StoreError>;

    /// All ballots of an election, in no particular order.
    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>, StoreError>;

    /// Look up a voter by normalised email.
    async fn eligible_voter(
        &self,
        election_id: Id,
        email: &str,
    ) -> Result<Option<EligibleVoter>, StoreError>;

    /// Atomically mark the voter as having voted and insert their records.
    ///
    /// Succeeds only if `has_voted` was false; otherwise nothing is written
    /// and [`StoreError::AlreadyVoted`] is returned.
    async fn commit_votes(
        &self,
        voter_id: Id,
        records: Vec<VoteRecord>,
        voted_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Every committed vote hash of an election.
    async fn vote_hashes(&self, election_id: Id) -> Result<Vec<String>, StoreError>;

    async fn vote_records(&self, election_id: Id) -> Result<Vec<VoteRecord>, StoreError>;

    async fn voter_counts(&self, election_id: Id) -> Result<VoterCounts, StoreError>;

    /// Overwrite the election's last computed Merkle root.
    async fn record_merkle_root(
        &self,
        election_id: Id,
        record: MerkleRootRecord,
    ) -> Result<(), StoreError>;
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use rocket::tokio::sync::Mutex;

use super::{SharedStore, StoreError, VoteStore, VoterCounts};
use crate::model::{
    db::{Ballot, Election, EligibleVoter, MerkleRootRecord, VoteRecord},
    mongodb::Id,
};

#[derive(Default)]
struct State {
    elections: HashMap<Id, Election>,
    ballots: HashMap<Id, Ballot>,
    voters: HashMap<Id, EligibleVoter>,
    records: Vec<VoteRecord>,
}

/// A [`VoteStore`] held entirely in memory.
///
/// Cloning gives another handle on the same data. Every operation runs under
/// a single lock, which makes the vote commit trivially atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// This store as managed state.
    pub fn shared(&self) -> SharedStore {
        Arc::new(self.clone())
    }

    pub async fn insert_election(&self, election: Election) {
        let mut state = self.state.lock().await;
        state.elections.insert(election.id, election);
    }

    pub async fn insert_ballot(&self, ballot: Ballot) {
        let mut state = self.state.lock().await;
        state.ballots.insert(ballot.id, ballot);
    }

    pub async fn insert_voter(&self, voter: EligibleVoter) {
        let mut state = self.state.lock().await;
        state.voters.insert(voter.id, voter);
    }

    /// Current state of a voter, by ID.
    pub async fn voter(&self, voter_id: Id) -> Option<EligibleVoter> {
        self.state.lock().await.voters.get(&voter_id).cloned()
    }

    /// Total number of vote records across all elections.
    pub async fn record_count(&self) -> usize {
        self.state.lock().await.records.len()
    }
}

#[rocket::async_trait]
impl VoteStore for MemoryStore {
    async fn election(&self, election_id: Id) -> Result<Option<Election>, StoreError> {
        Ok(self.state.lock().await.elections.get(&election_id).cloned())
    }

    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .ballots
            .values()
            .filter(|ballot| ballot.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn eligible_voter(
        &self,
        election_id: Id,
        email: &str,
    ) -> Result<Option<EligibleVoter>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .voters
            .values()
            .find(|voter| voter.election_id == election_id && voter.email == email)
            .cloned())
    }

    async fn commit_votes(
        &self,
        voter_id: Id,
        records: Vec<VoteRecord>,
        voted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        // Check everything before writing anything.
        match state.voters.get(&voter_id) {
            Some(voter) if voter.has_voted => return Err(StoreError::AlreadyVoted(voter_id)),
            Some(_) => {}
            None => return Err(StoreError::NotFound(format!("Voter with ID '{voter_id}'"))),
        }
        let duplicate = records.iter().enumerate().any(|(i, record)| {
            state.records.iter().any(|r| r.vote_hash == record.vote_hash)
                || records[..i].iter().any(|r| r.vote_hash == record.vote_hash)
        });
        if duplicate {
            return Err(StoreError::DuplicateHash);
        }

        if let Some(voter) = state.voters.get_mut(&voter_id) {
            voter.has_voted = true;
            voter.voted_at = Some(voted_at);
        }
        debug!("Committed {} vote records", records.len());
        state.records.extend(records);
        Ok(())
    }

    async fn vote_hashes(&self, election_id: Id) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.election_id == election_id)
            .map(|record| record.vote_hash.clone())
            .collect())
    }

    async fn vote_records(&self, election_id: Id) -> Result<Vec<VoteRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn voter_counts(&self, election_id: Id) -> Result<VoterCounts, StoreError> {
        let state = self.state.lock().await;
        let mut counts = VoterCounts::default();
        for voter in state.voters.values() {
            if voter.election_id == election_id {
                counts.total += 1;
                *counts.by_college.entry(voter.college.clone()).or_default() += 1;
            }
        }
        Ok(counts)
    }

    async fn record_merkle_root(
        &self,
        election_id: Id,
        record: MerkleRootRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let election = state
            .elections
            .get_mut(&election_id)
            .ok_or_else(|| StoreError::NotFound(format!("Election with ID '{election_id}'")))?;
        election.merkle_root = Some(record);
        Ok(())
    }
}

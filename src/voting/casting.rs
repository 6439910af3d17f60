use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::OsRng;

use super::{validation, Nonce, Rejection, VoteHasher};
use crate::error::Result;
use crate::model::{
    api::{ballot::ProposedVote, receipt::Receipt},
    db::{normalise_email, Ballot, Election, EligibleVoter, VoteRecord},
    mongodb::Id,
};
use crate::store::{StoreError, VoteStore};

/// Load an election and the requesting voter, and check the voter may vote
/// in it now.
pub async fn check_eligibility(
    store: &dyn VoteStore,
    election_id: Id,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(Election, EligibleVoter)> {
    let election = store
        .election(election_id)
        .await?
        .ok_or(Rejection::ElectionNotFound(election_id))?;
    let voter = store
        .eligible_voter(election_id, &normalise_email(email))
        .await?;
    let voter = validation::check_eligibility(&election, voter.as_ref(), now)?.clone();
    Ok((election, voter))
}

/// The ballots a voter may see, in presentation order.
pub async fn get_eligible_ballots(
    store: &dyn VoteStore,
    election_id: Id,
    email: &str,
) -> Result<Vec<Ballot>> {
    if store.election(election_id).await?.is_none() {
        return Err(Rejection::ElectionNotFound(election_id).into());
    }
    let voter = store
        .eligible_voter(election_id, &normalise_email(email))
        .await?
        .ok_or(Rejection::NotEligible(election_id))?;
    let ballots = store.ballots(election_id).await?;
    Ok(validation::eligible_ballots(ballots, &voter.college))
}

/// A validated, hashed submission that has not yet been written.
///
/// Holding one proves nothing about the voter's current state: the commit is
/// where the one-vote rule is enforced.
#[derive(Debug)]
pub struct BallotCast {
    election_id: Id,
    voter_id: Id,
    records: Vec<VoteRecord>,
    receipts: Vec<Receipt>,
}

impl BallotCast {
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Persist the records and mark the voter, all or nothing.
    ///
    /// Returns the receipts on success. If the voter has voted since this cast
    /// was prepared, nothing is written and the cast is rejected.
    pub async fn commit(self, store: &dyn VoteStore, now: DateTime<Utc>) -> Result<Vec<Receipt>> {
        let count = self.records.len();
        match store.commit_votes(self.voter_id, self.records, now).await {
            Ok(()) => {}
            Err(StoreError::AlreadyVoted(_)) => {
                debug!("Lost vote commit race in election {}", self.election_id);
                return Err(Rejection::AlreadyVoted(self.election_id).into());
            }
            Err(err) => return Err(err.into()),
        }
        info!("Cast {count} votes in election {}", self.election_id);
        Ok(self.receipts)
    }
}

/// Validate a submission and hash every vote, without writing anything.
pub async fn prepare_cast(
    store: &dyn VoteStore,
    hasher: &VoteHasher,
    election_id: Id,
    email: &str,
    votes: &[ProposedVote],
    now: DateTime<Utc>,
) -> Result<BallotCast> {
    let (election, voter) = check_eligibility(store, election_id, email, now).await?;
    let ballots = store.ballots(election_id).await?;
    let valid = validation::validate_votes(&election, &ballots, &voter, votes)?;

    let mut records = Vec::with_capacity(valid.len());
    let mut receipts = Vec::with_capacity(valid.len());
    for vote in valid {
        let nonce = Nonce::random(&mut OsRng);
        let vote_hash = hasher.hash(vote.ballot_id(), vote.candidate_id(), vote.vote_type(), &nonce);
        records.push(VoteRecord::new(
            election_id,
            vote.ballot_id(),
            vote.candidate_id(),
            vote.vote_type(),
            vote_hash.clone(),
        ));
        receipts.push(Receipt {
            ballot_id: vote.ballot_id(),
            vote_type: vote.vote_type(),
            candidate_id: vote.candidate_id(),
            vote_hash,
            nonce: nonce.to_hex(),
        });
    }

    Ok(BallotCast {
        election_id,
        voter_id: voter.id,
        records,
        receipts,
    })
}

/// Validate, hash and atomically record a voter's full submission.
pub async fn cast_votes(
    store: &dyn VoteStore,
    hasher: &VoteHasher,
    election_id: Id,
    email: &str,
    votes: &[ProposedVote],
) -> Result<Vec<Receipt>> {
    let now = Utc::now();
    prepare_cast(store, hasher, election_id, email, votes, now)
        .await?
        .commit(store, now)
        .await
}

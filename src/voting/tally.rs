use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use super::{validation::sort_for_presentation, Rejection};
use crate::error::{Error, Result};
use crate::model::{
    common::{BallotType, VoteType},
    db::{Ballot, Election, VoteRecord},
    mongodb::Id,
};
use crate::store::{VoteStore, VoterCounts};

/// How many times one (vote type, candidate) pair was cast on a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub vote_type: VoteType,
    pub candidate_id: Option<Id>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallotTally {
    pub ballot_id: Id,
    pub title: String,
    #[serde(flatten)]
    pub ballot_type: BallotType,
    pub counts: Vec<VoteCount>,
    /// Every vote on this ballot, abstentions included.
    pub votes_cast: u64,
    /// Voters entitled to vote on this ballot.
    pub eligible_voters: u64,
    /// Percentage of eligible voters who voted.
    pub turnout: f64,
    /// Required turnout percentage for this ballot's category.
    pub quorum: u8,
    pub quorum_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionResults {
    pub election_id: Id,
    pub name: String,
    pub ballots: Vec<BallotTally>,
}

/// Count an election's records, ballot by ballot.
pub fn tally(
    election: &Election,
    mut ballots: Vec<Ballot>,
    records: &[VoteRecord],
    voters: &VoterCounts,
) -> ElectionResults {
    sort_for_presentation(&mut ballots);

    let mut counts: BTreeMap<Id, BTreeMap<(VoteType, Option<Id>), u64>> = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.ballot_id)
            .or_default()
            .entry((record.vote_type, record.candidate_id))
            .or_default() += 1;
    }

    let ballots = ballots
        .into_iter()
        .map(|ballot| {
            let ballot_counts = counts.remove(&ballot.id).unwrap_or_default();
            let votes_cast = ballot_counts.values().sum::<u64>();
            let eligible_voters = match ballot.ballot_type.college() {
                Some(college) => voters.in_college(college),
                None => voters.total,
            };
            let turnout = if eligible_voters == 0 {
                0.0
            } else {
                votes_cast as f64 * 100.0 / eligible_voters as f64
            };
            let quorum = election.quorum.threshold(ballot.category());
            // Integer comparison, so a threshold is met exactly at the boundary.
            // No electorate means no quorum.
            let quorum_met =
                eligible_voters > 0 && votes_cast * 100 >= u64::from(quorum) * eligible_voters;

            BallotTally {
                ballot_id: ballot.id,
                title: ballot.title,
                ballot_type: ballot.ballot_type,
                counts: ballot_counts
                    .into_iter()
                    .map(|((vote_type, candidate_id), count)| VoteCount {
                        vote_type,
                        candidate_id,
                        count,
                    })
                    .collect(),
                votes_cast,
                eligible_voters,
                turnout,
                quorum,
                quorum_met,
            }
        })
        .collect();

    ElectionResults {
        election_id: election.id,
        name: election.name.clone(),
        ballots,
    }
}

/// Results of an election, available once voting has closed.
pub async fn tally_election(
    store: &dyn VoteStore,
    election_id: Id,
    now: DateTime<Utc>,
) -> Result<ElectionResults> {
    let election = store
        .election(election_id)
        .await?
        .ok_or(Rejection::ElectionNotFound(election_id))?;
    if !election.has_ended(now) {
        return Err(Error::ResultsNotAvailable {
            election_id,
            end_time: election.end_time,
        });
    }

    let ballots = store.ballots(election_id).await?;
    let records = store.vote_records(election_id).await?;
    let voters = store.voter_counts(election_id).await?;
    info!(
        "Tallied {} records over {} ballots for election {election_id}",
        records.len(),
        ballots.len()
    );
    Ok(tally(&election, ballots, &records, &voters))
}

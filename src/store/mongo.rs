use chrono::{DateTime, Utc};
use log::{debug, warn};
use mongodb::{
    bson::{doc, from_document, to_bson, DateTime as BsonDateTime, Document},
    options::{Acknowledgment, ReadConcern, SessionOptions, TransactionOptions, WriteConcern},
    Client, ClientSession, Database,
};
use rocket::futures::TryStreamExt;
use serde::Deserialize;

use super::{StoreError, VoteStore, VoterCounts};
use crate::model::{
    db::{Ballot, Election, EligibleVoter, MerkleRootRecord, VoteRecord},
    mongodb::{is_duplicate_key_error, is_write_conflict, Coll, Id},
};

/// A [`VoteStore`] backed by a MongoDB replica set.
///
/// Vote commits run in a multi-document transaction, so the server must be a
/// replica set member.
pub struct MongoStore {
    client: Client,
    elections: Coll<Election>,
    ballots: Coll<Ballot>,
    voters: Coll<EligibleVoter>,
    records: Coll<VoteRecord>,
}

impl MongoStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self {
            client,
            elections: Coll::from_db(&db),
            ballots: Coll::from_db(&db),
            voters: Coll::from_db(&db),
            records: Coll::from_db(&db),
        }
    }

    /// Claim the voter and insert their records inside the given transaction.
    ///
    /// On error the caller is responsible for aborting.
    async fn commit_in_session(
        &self,
        session: &mut ClientSession,
        voter_id: Id,
        records: &[VoteRecord],
        voted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Compare-and-set on `has_voted`.
        let filter = doc! {
            "_id": voter_id,
            "has_voted": false,
        };
        let update = doc! {
            "$set": {
                "has_voted": true,
                "voted_at": BsonDateTime::from_chrono(voted_at),
            }
        };
        let claimed = match self
            .voters
            .update_one_with_session(filter, update, None, session)
            .await
        {
            Ok(result) => result.modified_count == 1,
            Err(err) if is_write_conflict(&err) => false,
            Err(err) => return Err(err.into()),
        };
        if !claimed {
            return Err(StoreError::AlreadyVoted(voter_id));
        }

        if !records.is_empty() {
            match self
                .records
                .insert_many_with_session(records, None, session)
                .await
            {
                Ok(_) => {}
                Err(err) if is_duplicate_key_error(&err) => return Err(StoreError::DuplicateHash),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

#[derive(Deserialize)]
struct CollegeCount {
    #[serde(rename = "_id")]
    college: String,
    count: u64,
}

/// Fold `$group`-by-college results into totals.
///
/// A group that does not decode, e.g. voters with no college, is an error
/// rather than being left out of the electorate.
fn college_counts(groups: Vec<Document>) -> Result<VoterCounts, StoreError> {
    let mut counts = VoterCounts::default();
    for group in groups {
        let group: CollegeCount = from_document(group)?;
        counts.total += group.count;
        counts.by_college.insert(group.college, group.count);
    }
    Ok(counts)
}

#[rocket::async_trait]
impl VoteStore for MongoStore {
    async fn election(&self, election_id: Id) -> Result<Option<Election>, StoreError> {
        Ok(self.elections.find_one(election_id.as_doc(), None).await?)
    }

    async fn ballots(&self, election_id: Id) -> Result<Vec<Ballot>, StoreError> {
        let filter = doc! { "election_id": election_id };
        Ok(self.ballots.find(filter, None).await?.try_collect().await?)
    }

    async fn eligible_voter(
        &self,
        election_id: Id,
        email: &str,
    ) -> Result<Option<EligibleVoter>, StoreError> {
        let filter = doc! {
            "election_id": election_id,
            "email": email,
        };
        Ok(self.voters.find_one(filter, None).await?)
    }

    async fn commit_votes(
        &self,
        voter_id: Id,
        records: Vec<VoteRecord>,
        voted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut session = self.client.start_session(None).await?;
        let options = TransactionOptions::builder()
            .read_concern(ReadConcern::snapshot())
            .write_concern(WriteConcern::builder().w(Acknowledgment::Majority).build())
            .build();
        session.start_transaction(options).await?;

        if let Err(err) = self
            .commit_in_session(&mut session, voter_id, &records, voted_at)
            .await
        {
            debug!("Aborting vote commit: {err}");
            session.abort_transaction().await?;
            return Err(err);
        }

        match session.commit_transaction().await {
            Ok(()) => Ok(()),
            Err(err) if is_write_conflict(&err) => {
                warn!("Vote commit lost a write conflict");
                Err(StoreError::AlreadyVoted(voter_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn vote_hashes(&self, election_id: Id) -> Result<Vec<String>, StoreError> {
        Ok(self
            .vote_records(election_id)
            .await?
            .into_iter()
            .map(|record| record.vote_hash)
            .collect())
    }

    async fn vote_records(&self, election_id: Id) -> Result<Vec<VoteRecord>, StoreError> {
        // Read from a snapshot so a concurrent commit is seen entirely or not at all.
        let session_options = SessionOptions::builder().snapshot(true).build();
        let mut session = self.client.start_session(Some(session_options)).await?;

        let filter = doc! { "election_id": election_id };
        let mut cursor = self
            .records
            .find_with_session(filter, None, &mut session)
            .await?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next(&mut session).await {
            records.push(record?);
        }
        Ok(records)
    }

    async fn voter_counts(&self, election_id: Id) -> Result<VoterCounts, StoreError> {
        let pipeline = [
            doc! { "$match": { "election_id": election_id } },
            doc! { "$group": { "_id": "$college", "count": { "$sum": 1 } } },
        ];
        let groups: Vec<Document> = self
            .voters
            .aggregate(pipeline, None)
            .await?
            .try_collect()
            .await?;
        college_counts(groups)
    }

    async fn record_merkle_root(
        &self,
        election_id: Id,
        record: MerkleRootRecord,
    ) -> Result<(), StoreError> {
        let update = doc! {
            "$set": { "merkle_root": to_bson(&record)? }
        };
        let result = self
            .elections
            .update_one(election_id.as_doc(), update, None)
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(format!("Election with ID '{election_id}'")));
        }
        Ok(())
    }
}

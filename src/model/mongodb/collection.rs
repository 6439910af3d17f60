use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{Ballot, Election, EligibleVoter, VoteRecord};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

impl MongoCollection for Ballot {
    const NAME: &'static str = "ballots";
}

impl MongoCollection for EligibleVoter {
    const NAME: &'static str = "eligible_voters";
}

impl MongoCollection for VoteRecord {
    const NAME: &'static str = "vote_records";
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // One eligibility record per voter per election.
    let voter_index = IndexModel::builder()
        .keys(doc! {"election_id": 1, "email": 1})
        .options(unique.clone())
        .build();
    Coll::<EligibleVoter>::from_db(db)
        .create_index(voter_index, None)
        .await?;

    // Ballot listing is by election, in creation order.
    let ballot_index = IndexModel::builder()
        .keys(doc! {"election_id": 1, "created_at": 1})
        .build();
    Coll::<Ballot>::from_db(db)
        .create_index(ballot_index, None)
        .await?;

    // Commitments are scoped by election and must never repeat.
    let record_index = IndexModel::builder()
        .keys(doc! {"election_id": 1})
        .build();
    let hash_index = IndexModel::builder()
        .keys(doc! {"vote_hash": 1})
        .options(unique)
        .build();
    Coll::<VoteRecord>::from_db(db)
        .create_indexes([record_index, hash_index], None)
        .await?;

    Ok(())
}

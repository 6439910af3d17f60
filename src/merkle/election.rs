use chrono::Utc;
use log::info;

use super::{MerkleTree, Proof};
use crate::error::Result;
use crate::model::{db::MerkleRootRecord, mongodb::Id};
use crate::store::VoteStore;
use crate::voting::Rejection;

/// Build the tree over every committed vote in an election.
async fn load_tree(store: &dyn VoteStore, election_id: Id) -> Result<MerkleTree> {
    if store.election(election_id).await?.is_none() {
        return Err(Rejection::ElectionNotFound(election_id).into());
    }
    let hashes = store.vote_hashes(election_id).await?;
    Ok(MerkleTree::build(&hashes)?)
}

/// Build an election's tree and record its root on the election.
pub async fn build_tree_for_election(
    store: &dyn VoteStore,
    election_id: Id,
) -> Result<(MerkleTree, MerkleRootRecord)> {
    let tree = load_tree(store, election_id).await?;
    let record = MerkleRootRecord {
        root: tree.root_hex(),
        leaf_count: tree.leaf_count() as u64,
        computed_at: Utc::now(),
    };
    store
        .record_merkle_root(election_id, record.clone())
        .await?;
    info!(
        "Recorded Merkle root over {} commitments for election {election_id}",
        record.leaf_count
    );
    Ok((tree, record))
}

/// Prove one commitment against the election's current tree.
pub async fn prove_inclusion_for_election(
    store: &dyn VoteStore,
    election_id: Id,
    commitment: &str,
) -> Result<Option<Proof>> {
    Ok(load_tree(store, election_id).await?.prove(commitment))
}

/// Prove many commitments against one snapshot of the election's tree.
pub async fn prove_many_for_election(
    store: &dyn VoteStore,
    election_id: Id,
    commitments: &[String],
) -> Result<Vec<Option<Proof>>> {
    Ok(load_tree(store, election_id).await?.prove_many(commitments))
}

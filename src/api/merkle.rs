use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::merkle::{self, Proof};
use crate::model::{
    api::merkle::{TreeSummary, Verification},
    mongodb::Id,
};
use crate::store::SharedStore;

pub fn routes() -> Vec<Route> {
    routes![tree, proof, proofs, verify, verify_batch]
}

/// Rebuild the election's tree and publish its root.
#[get("/elections/<election_id>/merkle")]
async fn tree(election_id: Id, store: &State<SharedStore>) -> Result<Json<TreeSummary>> {
    let (_, record) = merkle::build_tree_for_election(store.inner().as_ref(), election_id).await?;
    Ok(Json(TreeSummary::new(election_id, record)))
}

#[get("/elections/<election_id>/merkle/proof/<vote_hash>")]
async fn proof(
    election_id: Id,
    vote_hash: &str,
    store: &State<SharedStore>,
) -> Result<Json<Proof>> {
    merkle::prove_inclusion_for_election(store.inner().as_ref(), election_id, vote_hash)
        .await?
        .map(Json)
        .ok_or_else(|| Error::ProofNotFound(vote_hash.to_string()))
}

/// Proofs for many commitments at once; `null` where a commitment is absent.
#[post("/elections/<election_id>/merkle/proofs", data = "<vote_hashes>", format = "json")]
async fn proofs(
    election_id: Id,
    vote_hashes: Json<Vec<String>>,
    store: &State<SharedStore>,
) -> Result<Json<Vec<Option<Proof>>>> {
    let proofs =
        merkle::prove_many_for_election(store.inner().as_ref(), election_id, &vote_hashes).await?;
    Ok(Json(proofs))
}

#[post("/merkle/verify", data = "<proof>", format = "json")]
fn verify(proof: Json<Proof>) -> Json<Verification> {
    Json(Verification {
        valid: proof.verify(),
    })
}

#[post("/merkle/verify/batch", data = "<proofs>", format = "json")]
fn verify_batch(proofs: Json<Vec<Proof>>) -> Json<Vec<Verification>> {
    let results = merkle::verify_many(&proofs)
        .into_iter()
        .map(|valid| Verification { valid })
        .collect();
    Json(results)
}

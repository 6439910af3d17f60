use chrono::Utc;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::mongodb::Id;
use crate::store::SharedStore;
use crate::voting::{tally_election, ElectionResults};

pub fn routes() -> Vec<Route> {
    routes![results]
}

#[get("/elections/<election_id>/results")]
async fn results(election_id: Id, store: &State<SharedStore>) -> Result<Json<ElectionResults>> {
    let results = tally_election(store.inner().as_ref(), election_id, Utc::now()).await?;
    Ok(Json(results))
}

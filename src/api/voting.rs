use chrono::Utc;
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        ballot::{BallotDescription, ProposedVote},
        receipt::Receipt,
        voter::EligibilityStatus,
    },
    mongodb::Id,
};
use crate::store::SharedStore;
use crate::voting::{self, VoteHasher};

pub fn routes() -> Vec<Route> {
    routes![eligibility, eligible_ballots, cast_votes]
}

#[get("/elections/<election_id>/eligibility")]
async fn eligibility(
    token: AuthToken,
    election_id: Id,
    store: &State<SharedStore>,
) -> Result<Json<EligibilityStatus>> {
    let (_, voter) =
        voting::check_eligibility(store.inner().as_ref(), election_id, token.email(), Utc::now())
            .await?;
    Ok(Json(EligibilityStatus::eligible(&voter)))
}

#[get("/elections/<election_id>/ballots")]
async fn eligible_ballots(
    token: AuthToken,
    election_id: Id,
    store: &State<SharedStore>,
) -> Result<Json<Vec<BallotDescription>>> {
    let ballots =
        voting::get_eligible_ballots(store.inner().as_ref(), election_id, token.email()).await?;
    Ok(Json(ballots.into_iter().map(Into::into).collect()))
}

#[post("/elections/<election_id>/votes", data = "<votes>", format = "json")]
async fn cast_votes(
    token: AuthToken,
    election_id: Id,
    votes: Json<Vec<ProposedVote>>,
    store: &State<SharedStore>,
    hasher: &State<VoteHasher>,
) -> Result<(Status, Json<Vec<Receipt>>)> {
    let receipts = voting::cast_votes(
        store.inner().as_ref(),
        hasher,
        election_id,
        token.email(),
        &votes,
    )
    .await?;
    Ok((Status::Created, Json(receipts)))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json, Value},
    };

    use super::*;

    use crate::api::examples::{auth_cookie, seed};
    use crate::model::{common::VoteType, db::Election};
    use crate::store::MemoryStore;

    #[backend_test]
    async fn eligible_voter_is_confirmed(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::open_example(), &["alice@example.com"]).await;

        let response = client
            .get(uri!(eligibility(seeded.election.id)))
            .cookie(auth_cookie(&client, "Alice@Example.com"))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let status: EligibilityStatus = response.into_json().await.unwrap();
        assert!(status.eligible);
        assert_eq!(status.college, "Science");
    }

    #[backend_test]
    async fn missing_token_is_unauthorized(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::open_example(), &["alice@example.com"]).await;

        let response = client
            .get(uri!(eligibility(seeded.election.id)))
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[backend_test]
    async fn ineligibility_has_a_kind(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::future_example(), &["alice@example.com"]).await;

        let response = client
            .get(uri!(eligibility(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "ELECTION_NOT_STARTED");

        let response = client
            .get(uri!(eligibility(Id::new())))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "ELECTION_NOT_FOUND");
    }

    #[backend_test]
    async fn ballots_are_filtered_and_ordered(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::open_example(), &["alice@example.com"]).await;

        let response = client
            .get(uri!(eligible_ballots(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let ballots: Vec<BallotDescription> = response.into_json().await.unwrap();
        let ids: Vec<_> = ballots.iter().map(|b| b.id).collect();
        assert_eq!(
            ids,
            vec![seeded.executive.id, seeded.director.id, seeded.referendum.id]
        );
    }

    #[backend_test]
    async fn cast_then_recast(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::open_example(), &["alice@example.com"]).await;
        let votes = vec![
            ProposedVote::new(seeded.referendum.id, VoteType::Yes, None),
            ProposedVote::new(
                seeded.executive.id,
                VoteType::Candidate,
                seeded.executive.candidates[0].id,
            ),
        ];

        let response = client
            .post(uri!(cast_votes(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .header(ContentType::JSON)
            .body(json!(votes).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        let receipts: Vec<Receipt> = response.into_json().await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(store.record_count().await, 2);

        let response = client
            .post(uri!(cast_votes(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .header(ContentType::JSON)
            .body(json!(votes).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "ALREADY_VOTED");
        assert_eq!(store.record_count().await, 2);
    }

    #[backend_test]
    async fn shape_errors_are_unprocessable(client: Client, store: MemoryStore) {
        let seeded = seed(&store, Election::open_example(), &["alice@example.com"]).await;
        let votes = json!([{
            "ballot_id": seeded.other_director.id,
            "vote_type": "CANDIDATE",
            "candidate_id": seeded.other_director.candidates[0].id,
        }]);

        let response = client
            .post(uri!(cast_votes(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .header(ContentType::JSON)
            .body(votes.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "INVALID_COLLEGE");

        let response = client
            .post(uri!(cast_votes(seeded.election.id)))
            .cookie(auth_cookie(&client, "alice@example.com"))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&Vec::<ProposedVote>::new()).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "EMPTY_SUBMISSION");
        assert_eq!(store.record_count().await, 0);
    }
}

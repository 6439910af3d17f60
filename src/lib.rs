#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use log::warn;
use rocket::{figment::Figment, Build, Rocket};
use serde::Deserialize;

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;
use crate::store::{MemoryStore, SharedStore};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod merkle;
pub mod model;
pub mod store;
pub mod voting;

/// Which [`VoteStore`](store::VoteStore) the server runs on.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoreKind {
    #[default]
    Mongodb,
    /// Non-persistent, for local development.
    Memory,
}

/// Build the server from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    let rocket = rocket::build();
    let kind = rocket
        .figment()
        .extract_inner::<StoreKind>("store")
        .unwrap_or_default();

    match kind {
        StoreKind::Mongodb => with_routes(rocket).attach(DatabaseFairing),
        StoreKind::Memory => {
            warn!("Using the in-memory store, nothing will survive a restart");
            with_routes(rocket).manage(MemoryStore::new().shared())
        }
    }
}

/// Build the server with the given config over an existing store.
pub fn rocket_for_store(figment: Figment, store: SharedStore) -> Rocket<Build> {
    with_routes(rocket::custom(figment)).manage(store)
}

fn with_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
}

/// Config for tests: the default profile plus known secrets.
#[cfg(test)]
pub(crate) fn test_figment() -> Figment {
    use crate::config::examples::{EXAMPLE_JWT_SECRET, EXAMPLE_VOTE_HASH_SECRET};

    rocket::Config::figment()
        .merge(("vote_hash_secret", EXAMPLE_VOTE_HASH_SECRET))
        .merge(("jwt_secret", EXAMPLE_JWT_SECRET))
        .merge(("auth_ttl", 3600))
        .merge(("log_level", "off"))
}

use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod merkle;
mod results;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(voting::routes());
    routes.extend(merkle::routes());
    routes.extend(results::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Errors raised by Rocket itself, e.g. failed guards or malformed bodies,
/// get the same JSON shape as our own.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<ErrorBody> {
    let error = match status.code {
        400 => "BAD_REQUEST",
        401 => "UNAUTHORIZED",
        404 => "NOT_FOUND",
        422 => "UNPROCESSABLE_ENTITY",
        _ if status.code >= 500 => "INTERNAL_ERROR",
        _ => "REQUEST_FAILED",
    };
    Json(ErrorBody {
        error,
        message: status.reason_lossy().to_string(),
    })
}

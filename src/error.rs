use chrono::{DateTime, Utc};
use jsonwebtoken::errors::Error as JwtError;
use log::{debug, error};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    merkle::TreeError,
    model::mongodb::Id,
    store::StoreError,
    voting::{Rejection, RejectionKind},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("No inclusion proof for commitment '{0}'")]
    ProofNotFound(String),
    #[error("Results for election '{election_id}' are available from {end_time}")]
    ResultsNotAvailable {
        election_id: Id,
        end_time: DateTime<Utc>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl Error {
    /// Stable, machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(rejection) => rejection.kind().as_str(),
            Self::Tree(TreeError::Empty) => "EMPTY_TREE",
            Self::Tree(TreeError::MalformedCommitment(_)) => "MALFORMED_COMMITMENT",
            Self::ProofNotFound(_) => "PROOF_NOT_FOUND",
            Self::ResultsNotAvailable { .. } => "RESULTS_NOT_AVAILABLE",
            Self::Store(_) => "STORE_ERROR",
            Self::Jwt(_) | Self::Unauthorized(_) => "UNAUTHORIZED",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Rejected(rejection) => match rejection.kind() {
                RejectionKind::ElectionNotFound
                | RejectionKind::BallotNotFound
                | RejectionKind::CandidateNotFound => Status::NotFound,
                RejectionKind::AlreadyVoted => Status::Conflict,
                RejectionKind::ElectionInactive
                | RejectionKind::NotEligible
                | RejectionKind::ElectionNotStarted
                | RejectionKind::ElectionEnded
                | RejectionKind::InvalidCollege => Status::Forbidden,
                RejectionKind::EmptySubmission
                | RejectionKind::DuplicateBallot
                | RejectionKind::InvalidVoteType
                | RejectionKind::CandidateRequired
                | RejectionKind::CandidateNotAllowed => Status::UnprocessableEntity,
            },
            Self::Tree(TreeError::Empty) | Self::ProofNotFound(_) => Status::NotFound,
            Self::Tree(TreeError::MalformedCommitment(_)) | Self::Store(_) => {
                Status::InternalServerError
            }
            Self::ResultsNotAvailable { .. } => Status::Forbidden,
            Self::Jwt(_) | Self::Unauthorized(_) => Status::Unauthorized,
        }
    }

    fn body(&self) -> ErrorBody {
        let message = match self.status().class() {
            // Internal details stay in the logs.
            StatusClass::ServerError => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        ErrorBody {
            error: self.kind(),
            message,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            debug!("Request refused with {}: {self}", self.kind());
        }
        Response::build_from(Json(self.body()).respond_to(req)?)
            .status(status)
            .ok()
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{common::VoteType, mongodb::Id};

/// Why a voter's request was refused before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Election with ID '{0}' not found")]
    ElectionNotFound(Id),
    #[error("Election with ID '{0}' is not active")]
    ElectionInactive(Id),
    #[error("Voter is not eligible to vote in election '{0}'")]
    NotEligible(Id),
    #[error("Voter has already voted in election '{0}'")]
    AlreadyVoted(Id),
    #[error("Election opens at {0}")]
    ElectionNotStarted(DateTime<Utc>),
    #[error("Election closed at {0}")]
    ElectionEnded(DateTime<Utc>),
    #[error("No votes were submitted")]
    EmptySubmission,
    #[error("Ballot '{0}' appears more than once")]
    DuplicateBallot(Id),
    #[error("Ballot '{0}' not found in this election")]
    BallotNotFound(Id),
    #[error("Candidate '{candidate_id}' not found on ballot '{ballot_id}'")]
    CandidateNotFound { ballot_id: Id, candidate_id: Id },
    #[error("Ballot '{ballot_id}' is restricted to college '{college}'")]
    InvalidCollege { ballot_id: Id, college: String },
    #[error("Vote type {vote_type} is not allowed on ballot '{ballot_id}'")]
    InvalidVoteType { ballot_id: Id, vote_type: VoteType },
    #[error("Vote type {vote_type} on ballot '{ballot_id}' requires a candidate")]
    CandidateRequired { ballot_id: Id, vote_type: VoteType },
    #[error("Vote type {vote_type} on ballot '{ballot_id}' must not name a candidate")]
    CandidateNotAllowed { ballot_id: Id, vote_type: VoteType },
}

/// Stable, machine-readable rejection codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    ElectionNotFound,
    ElectionInactive,
    NotEligible,
    AlreadyVoted,
    ElectionNotStarted,
    ElectionEnded,
    EmptySubmission,
    DuplicateBallot,
    BallotNotFound,
    CandidateNotFound,
    InvalidCollege,
    InvalidVoteType,
    CandidateRequired,
    CandidateNotAllowed,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::ElectionNotFound(_) => RejectionKind::ElectionNotFound,
            Self::ElectionInactive(_) => RejectionKind::ElectionInactive,
            Self::NotEligible(_) => RejectionKind::NotEligible,
            Self::AlreadyVoted(_) => RejectionKind::AlreadyVoted,
            Self::ElectionNotStarted(_) => RejectionKind::ElectionNotStarted,
            Self::ElectionEnded(_) => RejectionKind::ElectionEnded,
            Self::EmptySubmission => RejectionKind::EmptySubmission,
            Self::DuplicateBallot(_) => RejectionKind::DuplicateBallot,
            Self::BallotNotFound(_) => RejectionKind::BallotNotFound,
            Self::CandidateNotFound { .. } => RejectionKind::CandidateNotFound,
            Self::InvalidCollege { .. } => RejectionKind::InvalidCollege,
            Self::InvalidVoteType { .. } => RejectionKind::InvalidVoteType,
            Self::CandidateRequired { .. } => RejectionKind::CandidateRequired,
            Self::CandidateNotAllowed { .. } => RejectionKind::CandidateNotAllowed,
        }
    }
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElectionNotFound => "ELECTION_NOT_FOUND",
            Self::ElectionInactive => "ELECTION_INACTIVE",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::ElectionNotStarted => "ELECTION_NOT_STARTED",
            Self::ElectionEnded => "ELECTION_ENDED",
            Self::EmptySubmission => "EMPTY_SUBMISSION",
            Self::DuplicateBallot => "DUPLICATE_BALLOT",
            Self::BallotNotFound => "BALLOT_NOT_FOUND",
            Self::CandidateNotFound => "CANDIDATE_NOT_FOUND",
            Self::InvalidCollege => "INVALID_COLLEGE",
            Self::InvalidVoteType => "INVALID_VOTE_TYPE",
            Self::CandidateRequired => "CANDIDATE_REQUIRED",
            Self::CandidateNotAllowed => "CANDIDATE_NOT_ALLOWED",
        }
    }
}

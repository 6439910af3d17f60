//! Vote validation, commitment and casting, plus results once voting closes.

pub mod casting;
mod hasher;
mod rejection;
pub mod tally;
pub mod validation;

pub use casting::{cast_votes, check_eligibility, get_eligible_ballots, prepare_cast, BallotCast};
pub use hasher::{HasherError, Nonce, VoteHasher, NONCE_LENGTH};
pub use rejection::{Rejection, RejectionKind};
pub use tally::{tally_election, ElectionResults};
pub use validation::ValidVote;

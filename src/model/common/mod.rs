pub mod ballot;

pub use ballot::{BallotCategory, BallotType, VoteType};

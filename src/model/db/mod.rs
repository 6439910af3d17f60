//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings and datetimes in MongoDB's own format.

mod ballot;
pub use ballot::{Ballot, Candidate};

mod election;
pub use election::{Election, ElectionCore, InvalidWindow, MerkleRootRecord, Quorum};

mod voter;
pub use voter::{normalise_email, EligibleVoter};

mod vote_record;
pub use vote_record::VoteRecord;

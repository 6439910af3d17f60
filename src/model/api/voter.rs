use serde::{Deserialize, Serialize};

use crate::model::{db::EligibleVoter, mongodb::Id};

/// Confirmation that a voter may vote in an election right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityStatus {
    pub election_id: Id,
    pub eligible: bool,
    pub college: String,
}

impl EligibilityStatus {
    pub fn eligible(voter: &EligibleVoter) -> Self {
        Self {
            election_id: voter.election_id,
            eligible: true,
            college: voter.college.clone(),
        }
    }
}

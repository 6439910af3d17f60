use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::{optional_bson_datetime, Id};

/// A voter who may vote in one specific election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleVoter {
    #[serde(rename = "_id")]
    pub id: Id,
    /// Foreign Key election ID.
    pub election_id: Id,
    /// Verified email, normalised by [`normalise_email`].
    pub email: String,
    pub college: String,
    /// Sensitive; encrypted at rest by the database layer and never
    /// interpreted here.
    pub student_id: String,
    /// Flips to true exactly once, when the voter's ballots are committed.
    pub has_voted: bool,
    #[serde(default, with = "optional_bson_datetime")]
    pub voted_at: Option<DateTime<Utc>>,
}

impl EligibleVoter {
    pub fn new(election_id: Id, email: &str, college: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            election_id,
            email: normalise_email(email),
            college: college.into(),
            student_id: student_id.into(),
            has_voted: false,
            voted_at: None,
        }
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

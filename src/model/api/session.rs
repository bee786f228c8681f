use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::{subject::SubjectDescription, validation::FieldErrors},
    common::{datetime, status::SessionStatus},
    db::session::VotingSession,
};

/// Request to open a voting session on a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VotingSessionRequest {
    pub subject_code: Option<String>,
    #[serde(with = "datetime::option")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// A validated [`VotingSessionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingSessionSpec {
    pub subject_code: String,
    /// When absent, the configured default lifetime applies.
    pub expiration_date: Option<DateTime<Utc>>,
}

impl VotingSessionRequest {
    pub fn validate(self) -> Result<VotingSessionSpec> {
        let mut errors = FieldErrors::new();
        let subject_code = errors.require("subjectCode", self.subject_code, "Subject code is required.");
        match subject_code {
            Some(subject_code) if errors.is_empty() => Ok(VotingSessionSpec {
                subject_code,
                expiration_date: self.expiration_date,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

/// A voting session as shown to API clients, with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingSessionDescription {
    pub status: SessionStatus,
    pub subject: SubjectDescription,
    #[serde(with = "datetime")]
    pub expiration_date: DateTime<Utc>,
}

impl VotingSessionDescription {
    /// Describe the session as observed at `now`.
    pub fn at(session: &VotingSession, now: DateTime<Utc>) -> Self {
        Self {
            status: session.status_at(now),
            subject: session.subject.subject.clone().into(),
            expiration_date: session.expires_at,
        }
    }
}

/// Yes/no vote counts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub yes: u64,
    pub no: u64,
}

/// A session together with its tallied votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSessionResult {
    pub session: VotingSessionDescription,
    pub result: ResultCounts,
}

impl VotingSessionResult {
    pub fn at(session: &VotingSession, result: ResultCounts, now: DateTime<Utc>) -> Self {
        Self {
            session: VotingSessionDescription::at(session, now),
            result,
        }
    }
}

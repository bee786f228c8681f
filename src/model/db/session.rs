use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::{common::status::SessionStatus, db::subject::Subject, mongodb::Id};

/// Core voting session data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSessionCore {
    /// Snapshot of the subject being voted on. Subjects are immutable, so
    /// this never goes stale.
    pub subject: Subject,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
    /// Whether the results event has been published.
    pub notified: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VotingSessionCore {
    pub fn new(subject: Subject, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject,
            expires_at,
            notified: false,
            created_at: Utc::now(),
        }
    }

    /// The derived status of this session at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        SessionStatus::at(self.expires_at, now)
    }

    /// Whether votes are refused at `now`.
    ///
    /// This is strictly after the expiration, so there is an instant where a
    /// session reports `CLOSED` but would still accept a vote.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whether reading results with the given status should publish the
    /// results event.
    pub fn needs_notification(&self, messaging_enabled: bool, status: SessionStatus) -> bool {
        messaging_enabled && !self.notified && status == SessionStatus::Closed
    }
}

/// A voting session from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSession {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub session: VotingSessionCore,
}

impl VotingSession {
    /// Give the session a fresh ID, ready for insertion.
    pub fn new(session: VotingSessionCore) -> Self {
        Self {
            id: Id::new(),
            session,
        }
    }

    pub fn subject_code_filter(code: &str) -> Document {
        doc! { "subject.code": code }
    }

    /// Filter matching this session only while it is still un-notified, so
    /// the flag flips at most once.
    pub fn unnotified_filter(&self) -> Document {
        doc! { "_id": self.id, "notified": false }
    }

    /// Listing order: latest expiration first.
    pub fn sort_order() -> Document {
        doc! { "expires_at": -1 }
    }
}

impl Deref for VotingSession {
    type Target = VotingSessionCore;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for VotingSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

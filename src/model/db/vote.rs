use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::{
    db::{associate::Associate, session::VotingSession},
    mongodb::Id,
};

/// Core vote data, as stored in the database.
///
/// The CPF and subject code are denormalised from the associate and session
/// so duplicate checks and tallies need no joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    pub associate_id: Id,
    pub session_id: Id,
    pub cpf: String,
    pub subject_code: String,
    /// `true` is yes, `false` is no.
    pub option: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VoteCore {
    pub fn new(associate: &Associate, session: &VotingSession, option: bool) -> Self {
        Self {
            associate_id: associate.id,
            session_id: session.id,
            cpf: associate.cpf.clone(),
            subject_code: session.subject.code.clone(),
            option,
            created_at: Utc::now(),
        }
    }
}

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Vote {
    /// Give the vote a fresh ID, ready for insertion.
    pub fn new(vote: VoteCore) -> Self {
        Self {
            id: Id::new(),
            vote,
        }
    }

    /// Votes cast on the given subject with the given option.
    pub fn option_filter(subject_code: &str, option: bool) -> Document {
        doc! { "subject_code": subject_code, "option": option }
    }

    /// The vote (if any) cast by the given associate on the given subject.
    pub fn ballot_filter(cpf: &str, subject_code: &str) -> Document {
        doc! { "cpf": cpf, "subject_code": subject_code }
    }
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}

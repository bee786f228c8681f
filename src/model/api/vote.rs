use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::api::{
    associate::AssociateDescription, session::VotingSessionDescription, validation::FieldErrors,
};

/// A vote submitted by an associate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteRequest {
    pub cpf: Option<String>,
    pub subject_code: Option<String>,
    pub option: Option<bool>,
}

/// A validated [`VoteRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteSpec {
    pub cpf: String,
    pub subject_code: String,
    pub option: bool,
}

impl VoteRequest {
    pub fn validate(self) -> Result<VoteSpec> {
        let mut errors = FieldErrors::new();
        let cpf = errors.require("cpf", self.cpf, "CPF is required.");
        let subject_code = errors.require("subjectCode", self.subject_code, "Subject code is required.");
        let option = errors.require_some("option", self.option, "Option is required.");
        match (cpf, subject_code, option) {
            (Some(cpf), Some(subject_code), Some(option)) if errors.is_empty() => Ok(VoteSpec {
                cpf,
                subject_code,
                option,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

/// Confirmation of a recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub associate: AssociateDescription,
    pub session: VotingSessionDescription,
}

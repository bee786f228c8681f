use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::validation::FieldErrors,
    db::subject::{Subject, SubjectCore},
};

/// Request to register a new subject. The code is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SubjectRequest {
    /// Check every field and build the subject to store, deriving the code
    /// from the title if none was supplied.
    pub fn validate(self) -> Result<SubjectCore> {
        let mut errors = FieldErrors::new();
        let title = errors.require("title", self.title, "Title is required.");
        let description = errors.require("description", self.description, "Description is required.");
        match (title, description) {
            (Some(title), Some(description)) if errors.is_empty() => {
                Ok(SubjectCore::new(title, description, self.code))
            }
            _ => Err(errors.into_error()),
        }
    }
}

/// A subject as shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDescription {
    pub code: String,
    pub title: String,
    pub description: String,
}

impl From<SubjectCore> for SubjectDescription {
    fn from(subject: SubjectCore) -> Self {
        Self {
            code: subject.code,
            title: subject.title,
            description: subject.description,
        }
    }
}

impl From<Subject> for SubjectDescription {
    fn from(subject: Subject) -> Self {
        subject.subject.into()
    }
}

use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::{common::code::generate_code, mongodb::Id};

/// Core subject (ballot topic) data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCore {
    /// Unique code, derived from the title if not supplied.
    pub code: String,
    pub title: String,
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl SubjectCore {
    /// Create a new subject. A blank `code` is replaced by one derived from the title.
    pub fn new(title: String, description: String, code: Option<String>) -> Self {
        let code = code
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| generate_code(&title));
        Self {
            code,
            title,
            description,
            created_at: Utc::now(),
        }
    }
}

/// A subject from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub subject: SubjectCore,
}

impl Subject {
    /// Give the subject a fresh ID, ready for insertion.
    pub fn new(subject: SubjectCore) -> Self {
        Self {
            id: Id::new(),
            subject,
        }
    }

    pub fn code_filter(code: &str) -> Document {
        doc! { "code": code }
    }

    /// Listing order: newest first.
    pub fn sort_order() -> Document {
        doc! { "created_at": -1 }
    }
}

impl Deref for Subject {
    type Target = SubjectCore;

    fn deref(&self) -> &Self::Target {
        &self.subject
    }
}

impl DerefMut for Subject {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.subject
    }
}

use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core associate (voter) data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociateCore {
    /// Unique natural key.
    pub cpf: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AssociateCore {
    pub fn new(cpf: String, first_name: String, last_name: String) -> Self {
        Self {
            cpf,
            first_name,
            last_name,
            created_at: Utc::now(),
        }
    }
}

/// An associate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Associate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub associate: AssociateCore,
}

impl Associate {
    /// Give the associate a fresh ID, ready for insertion.
    pub fn new(associate: AssociateCore) -> Self {
        Self {
            id: Id::new(),
            associate,
        }
    }

    pub fn cpf_filter(cpf: &str) -> Document {
        doc! { "cpf": cpf }
    }

    /// Listing order: by first name, then last name.
    pub fn sort_order() -> Document {
        doc! { "first_name": 1, "last_name": 1 }
    }
}

impl Deref for Associate {
    type Target = AssociateCore;

    fn deref(&self) -> &Self::Target {
        &self.associate
    }
}

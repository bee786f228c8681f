use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::validation::{is_valid_cpf, FieldErrors},
    db::associate::{Associate, AssociateCore},
};

/// Registration request for a new associate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssociateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cpf: Option<String>,
}

impl AssociateRequest {
    /// Check every field and build the associate to store.
    pub fn validate(self) -> Result<AssociateCore> {
        let mut errors = FieldErrors::new();
        let first_name = errors.require("firstName", self.first_name, "First name is required.");
        let last_name = errors.require("lastName", self.last_name, "Last name is required.");
        let cpf = errors.require("cpf", self.cpf, "CPF is required.");
        if let Some(ref cpf) = cpf {
            if !is_valid_cpf(cpf) {
                errors.push("cpf", "Attribute CPF must have 11 digits.");
            }
        }
        match (cpf, first_name, last_name) {
            (Some(cpf), Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(AssociateCore::new(cpf, first_name, last_name))
            }
            _ => Err(errors.into_error()),
        }
    }
}

/// An associate as shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateDescription {
    pub cpf: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Associate> for AssociateDescription {
    fn from(associate: Associate) -> Self {
        Self {
            cpf: associate.associate.cpf,
            first_name: associate.associate.first_name,
            last_name: associate.associate.last_name,
        }
    }
}

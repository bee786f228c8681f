use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{
    http::{Method, Status, StatusClass},
    response::{self, Responder},
    serde::json::{serde_json::Error as JsonError, Json},
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used to pick the HTTP status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An associate, subject or session does not exist.
    NotFound,
    /// The operation would break a uniqueness rule.
    Conflict,
    /// The request itself is malformed or not permitted.
    Validation,
    /// The voting session has already closed.
    Expired,
    /// The path exists but not for the request method.
    MethodNotAllowed,
    /// An outbound collaborator failed.
    Upstream,
    /// Anything else, e.g. the database is unavailable.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> Status {
        match self {
            Self::NotFound => Status::NotFound,
            Self::Conflict | Self::Validation | Self::Expired => Status::BadRequest,
            Self::MethodNotAllowed => Status::MethodNotAllowed,
            Self::Upstream => Status::BadGateway,
            Self::Internal => Status::InternalServerError,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyRegistered(String),
    #[error("{0}")]
    AlreadyOpen(String),
    #[error("{0}")]
    AlreadyVoted(String),
    #[error("{0}")]
    SessionExpired(String),
    #[error("{0}")]
    UnableToVote(String),
    #[error("{0}")]
    InvalidDateTime(String),
    #[error("Invalid Request")]
    Validation(Vec<String>),
    #[error("{0}")]
    UnsupportedMediaType(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("{0}")]
    Upstream(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) | Self::Json(_) => ErrorKind::Internal,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyRegistered(_) | Self::AlreadyOpen(_) | Self::AlreadyVoted(_) => {
                ErrorKind::Conflict
            }
            Self::SessionExpired(_) => ErrorKind::Expired,
            Self::UnableToVote(_)
            | Self::InvalidDateTime(_)
            | Self::Validation(_)
            | Self::UnsupportedMediaType(_) => ErrorKind::Validation,
            Self::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            Self::Upstream(_) => ErrorKind::Upstream,
        }
    }

    /// Shorthand for the HTTP status this error maps to.
    pub fn status(&self) -> Status {
        self.kind().status()
    }

    pub fn not_found(what: impl AsRef<str>) -> Self {
        Self::NotFound(format!("{} not found", what.as_ref()))
    }

    pub fn associate_already_registered() -> Self {
        Self::AlreadyRegistered("Associate already registered".to_string())
    }

    pub fn subject_code_already_registered() -> Self {
        Self::AlreadyRegistered("Subject code already registered".to_string())
    }

    pub fn session_already_open() -> Self {
        Self::AlreadyOpen("Session cannot be open more than once".to_string())
    }

    pub fn already_voted() -> Self {
        Self::AlreadyVoted("Associate already voted".to_string())
    }

    pub fn session_expired() -> Self {
        Self::SessionExpired("Voting session is expired".to_string())
    }

    pub fn unable_to_vote() -> Self {
        Self::UnableToVote("Associate unable to vote".to_string())
    }

    pub fn invalid_date_time() -> Self {
        Self::InvalidDateTime("Invalid date time".to_string())
    }

    pub fn method_not_allowed(method: Method) -> Self {
        Self::MethodNotAllowed(format!("Request method '{method}' is not supported"))
    }

    pub fn unsupported_media_type() -> Self {
        Self::UnsupportedMediaType("Supported content types: application/json".to_string())
    }
}

/// The JSON body sent for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status: status.code,
            message: message.into(),
            errors: None,
        }
    }
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        let mut body = ErrorBody::new(err.status(), err.to_string());
        if let Error::Validation(errors) = err {
            body.errors = Some(errors.clone());
        }
        body
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let body = ErrorBody::from(&self);
        match status.class() {
            StatusClass::ServerError => error!("HTTP Status: {status} - Error Message: {self}"),
            _ => match body.errors {
                Some(ref errors) => warn!("HTTP Status: {status} - Error Message: {self} {errors:?}"),
                None => warn!("HTTP Status: {status} - Error Message: {self}"),
            },
        }
        (status, Json(body)).respond_to(req)
    }
}

//! For some reason, the mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

use crate::error::Error;

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error, i.e. an
/// insert was rejected by one of the unique indexes.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    if let ErrorKind::Write(WriteFailure::WriteError(ref e)) = *err.kind {
        return e.code == DUPLICATE_KEY;
    }
    false
}

/// Map a duplicate key error to the business error produced by `duplicate`,
/// passing any other database error through.
pub fn map_duplicate_key(err: DbError, duplicate: impl FnOnce() -> Error) -> Error {
    if is_duplicate_key_error(&err) {
        duplicate()
    } else {
        err.into()
    }
}

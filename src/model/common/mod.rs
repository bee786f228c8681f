//! Types and rules shared between the database and API representations.

pub mod code;
pub mod datetime;
pub mod status;

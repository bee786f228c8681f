//! API-friendly types.
//!
//! Requests are deserialised leniently (every field optional) and then
//! checked by `validate`, so that missing or blank fields are reported
//! together as per-field messages instead of as a parse failure.

pub mod associate;
pub mod event;
pub mod session;
pub mod subject;
pub mod validation;
pub mod vote;

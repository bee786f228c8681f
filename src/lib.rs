#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, EligibilityFairing, PublisherFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod integration;
pub mod logging;
pub mod model;

#[cfg(test)]
mod test_support;

/// Assemble the server. Collaborators are connected when the returned
/// instance is ignited.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(EligibilityFairing)
        .attach(PublisherFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

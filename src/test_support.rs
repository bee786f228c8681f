//! Shared setup for route-level tests, driven by `#[backend_test]`.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use log::info;
use mongodb::{options::ClientOptions, Client, Database};
use rocket::{
    figment::{providers::Serialized, Figment},
    Build, Rocket,
};

use crate::integration::{
    publisher::PublishError, Eligibility, EligibilityCheck, EligibilityError, ResultPublisher,
};
use crate::model::{
    db::{
        associate::{Associate, AssociateCore},
        session::{VotingSession, VotingSessionCore},
        subject::{Subject, SubjectCore},
    },
    mongodb::{ensure_indexes_exist, Coll},
};

pub const TEST_TOPIC: &str = "arn:aws:sns:us-east-1:000000000000:voting-session-results";

const DEFAULT_DB_URI: &str = "mongodb://localhost:27017";

/// Connect to the test MongoDB server, taken from `ROCKET_DB_URI` if set.
///
/// Panics if no server answers, so database tests never pass without running.
pub async fn db_client() -> Client {
    let uri = std::env::var("ROCKET_DB_URI").unwrap_or_else(|_| DEFAULT_DB_URI.to_string());
    match connect(&uri).await {
        Ok(client) => client,
        Err(e) => panic!("No test database at {uri}: {e}"),
    }
}

/// Connect and ping, giving up quickly if the server is unreachable.
async fn connect(uri: &str) -> mongodb::error::Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_selection_timeout = Some(Duration::from_secs(2));
    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(mongodb::bson::doc! { "ping": 1 }, None)
        .await?;
    info!("Connected to test database at {uri}");
    Ok(client)
}

/// A random database name, so tests never collide.
pub fn database() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

/// How the stub eligibility service answers.
#[derive(Debug, Copy, Clone)]
pub enum StubOutcome {
    Answer(Eligibility),
    Timeout,
    Unavailable,
}

/// Eligibility service stand-in. Clones share state, so the copy in managed
/// state can be reconfigured from a test.
#[derive(Debug, Clone)]
pub struct StubEligibility {
    outcome: Arc<Mutex<StubOutcome>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for StubEligibility {
    fn default() -> Self {
        Self {
            outcome: Arc::new(Mutex::new(StubOutcome::Answer(Eligibility::AbleToVote))),
            calls: Arc::default(),
        }
    }
}

impl StubEligibility {
    pub fn set(&self, outcome: StubOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// The CPFs checked so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[rocket::async_trait]
impl EligibilityCheck for StubEligibility {
    async fn check(&self, cpf: &str) -> Result<Eligibility, EligibilityError> {
        self.calls.lock().unwrap().push(cpf.to_string());
        let outcome = *self.outcome.lock().unwrap();
        match outcome {
            StubOutcome::Answer(eligibility) => Ok(eligibility),
            StubOutcome::Timeout => Err(EligibilityError::Timeout(Duration::from_millis(5000))),
            StubOutcome::Unavailable => Err(EligibilityError::Status(503)),
        }
    }
}

/// Publisher that remembers every `(topic, payload)` it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<(String, String)>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    /// Make the next publication fail without recording anything.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[rocket::async_trait]
impl ResultPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PublishError {
                topic: topic.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Build a server against the named database, with messaging enabled and
/// the stub collaborators in place of the real ones.
pub async fn rocket_for_db(client: Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    ensure_indexes_exist(&db).await.unwrap();

    let figment = Figment::from(rocket::Config::debug_default())
        .merge(Serialized::default("eligibility_url", "http://localhost:1"))
        .merge(Serialized::default("messaging_enabled", true))
        .merge(Serialized::default("messaging_topic", TEST_TOPIC))
        .merge(Serialized::default("log_level", "off"));

    let eligibility = StubEligibility::default();
    let publisher = RecordingPublisher::default();
    let checker: Box<dyn EligibilityCheck> = Box::new(eligibility.clone());
    let sink: Box<dyn ResultPublisher> = Box::new(publisher.clone());

    rocket::custom(figment)
        .attach(crate::config::ConfigFairing)
        .mount("/", crate::api::routes())
        .register("/", crate::api::catchers())
        .manage(client)
        .manage(db)
        .manage(checker)
        .manage(sink)
        .manage(eligibility)
        .manage(publisher)
}

pub async fn seed_associate(db: &Database) -> Associate {
    let associate = Associate::new(AssociateCore::example());
    Coll::<Associate>::from_db(db)
        .insert_one(&associate, None)
        .await
        .unwrap();
    associate
}

/// Subject `VOTE-1` with a session open for another hour.
pub async fn seed_open_session(db: &Database) -> VotingSession {
    let subject = Subject::new(SubjectCore::example());
    seed_session(db, VotingSessionCore::open_example(subject)).await
}

/// Subject `MINIMUM-WAGE` with a session that expired a minute ago.
pub async fn seed_closed_session(db: &Database) -> VotingSession {
    let subject = Subject::new(SubjectCore::example2());
    seed_session(db, VotingSessionCore::closed_example(subject)).await
}

async fn seed_session(db: &Database, session: VotingSessionCore) -> VotingSession {
    Coll::<Subject>::from_db(db)
        .insert_one(&session.subject, None)
        .await
        .unwrap();
    let session = VotingSession::new(session);
    Coll::<VotingSession>::from_db(db)
        .insert_one(&session, None)
        .await
        .unwrap();
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn unreachable_database_is_an_error() {
        assert!(connect("mongodb://127.0.0.1:1").await.is_err());
    }
}

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_sns::{
    config::{Credentials, Region},
    Client as SnsClient,
};
use log::{error, info, warn};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::integration::{
    eligibility::HttpEligibilityClient,
    publisher::{DisabledPublisher, SnsResultPublisher},
    EligibilityCheck, ResultPublisher,
};
use crate::model::mongodb::ensure_indexes_exist;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // eligibility service
    eligibility_url: String,
    #[serde(default = "default_eligibility_timeout_ms")]
    eligibility_timeout_ms: u64,
    #[serde(default = "default_eligibility_fail_open")]
    eligibility_fail_open: bool,
    // results messaging
    #[serde(default)]
    messaging_enabled: bool,
    #[serde(default)]
    messaging_topic: String,
    // sessions
    #[serde(default = "default_session_ttl")]
    default_session_ttl: u32,
}

fn default_eligibility_timeout_ms() -> u64 {
    5000
}

fn default_eligibility_fail_open() -> bool {
    true
}

fn default_session_ttl() -> u32 {
    60
}

impl Config {
    /// Base URL of the eligibility service; the CPF is appended as a path segment.
    pub fn eligibility_url(&self) -> &str {
        &self.eligibility_url
    }

    /// Connect and read timeout for the eligibility service.
    pub fn eligibility_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.eligibility_timeout_ms)
    }

    /// Whether a timed-out eligibility check lets the vote through.
    pub fn eligibility_fail_open(&self) -> bool {
        self.eligibility_fail_open
    }

    /// Whether closed session results are published.
    pub fn messaging_enabled(&self) -> bool {
        self.messaging_enabled
    }

    /// ARN of the SNS topic results are published to.
    pub fn messaging_topic(&self) -> &str {
        &self.messaging_topic
    }

    /// Lifetime of a session opened without an expiration date.
    pub fn default_session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.default_session_ttl.into())
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.messaging_enabled && config.messaging_topic.trim().is_empty() {
            error!("`messaging_topic` must be set when `messaging_enabled` is true");
            return Err(rocket);
        }
        if !config.eligibility_fail_open {
            info!("Eligibility timeouts will reject votes");
        }

        Ok(rocket.manage(config))
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "voting".to_string()
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes exist, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        Ok(rocket.manage(client).manage(db))
    }
}

/// A fairing that builds the eligibility service client and places it into
/// managed state as a `Box<dyn EligibilityCheck>`. Must be attached after
/// [`ConfigFairing`].
pub struct EligibilityFairing;

#[rocket::async_trait]
impl Fairing for EligibilityFairing {
    fn info(&self) -> Info {
        Info {
            name: "Eligibility service",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Application config must be loaded before the eligibility client");
            return Err(rocket);
        };
        let client =
            match HttpEligibilityClient::new(config.eligibility_url(), config.eligibility_timeout()) {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to build eligibility client: {e}");
                    return Err(rocket);
                }
            };
        info!(
            "Eligibility checks go to {} with a {:?} timeout",
            config.eligibility_url(),
            config.eligibility_timeout()
        );

        let checker: Box<dyn EligibilityCheck> = Box::new(client);
        Ok(rocket.manage(checker))
    }
}

/// Configuration for the AWS connection.
#[derive(Deserialize)]
struct AwsConfig {
    // non-secrets
    aws_region: String,
    aws_access_key_id: String,
    // secrets
    aws_secret_access_key: String,
}

/// A fairing that places a `Box<dyn ResultPublisher>` into managed state:
/// an Amazon SNS publisher when messaging is enabled, else a no-op. Must be
/// attached after [`ConfigFairing`].
pub struct PublisherFairing;

#[rocket::async_trait]
impl Fairing for PublisherFairing {
    fn info(&self) -> Info {
        Info {
            name: "Results publisher",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(app_config) = rocket.state::<Config>() else {
            error!("Application config must be loaded before the results publisher");
            return Err(rocket);
        };
        if !app_config.messaging_enabled() {
            warn!("Messaging disabled, session results will not be published");
            let publisher: Box<dyn ResultPublisher> = Box::new(DisabledPublisher);
            return Ok(rocket.manage(publisher));
        }

        let config = match rocket.figment().extract::<AwsConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load AWS config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let aws_config = SdkConfig::builder()
            .region(Region::new(config.aws_region))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                config.aws_access_key_id,
                config.aws_secret_access_key,
                None,
                None,
                "rocket config",
            )))
            .behavior_version(BehaviorVersion::latest())
            .build();
        info!("Loaded Amazon SNS config");

        let publisher: Box<dyn ResultPublisher> =
            Box::new(SnsResultPublisher::new(SnsClient::new(&aws_config)));
        Ok(rocket.manage(publisher))
    }
}

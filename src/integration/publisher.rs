use aws_sdk_sns::{error::DisplayErrorContext, Client as SnsClient};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to publish to {topic}: {message}")]
pub struct PublishError {
    pub topic: String,
    pub message: String,
}

/// Sends serialized events to a topic, fire-and-forget.
#[rocket::async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}

/// Publishes to an Amazon SNS topic, identified by its ARN.
pub struct SnsResultPublisher {
    client: SnsClient,
}

impl SnsResultPublisher {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[rocket::async_trait]
impl ResultPublisher for SnsResultPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(payload)
            .send()
            .await
            .map_err(|e| PublishError {
                topic: topic.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;
        debug!("Published message {:?} to {topic}", output.message_id());
        Ok(())
    }
}

/// Drops every event. Used when messaging is turned off.
#[derive(Debug, Default, Copy, Clone)]
pub struct DisabledPublisher;

#[rocket::async_trait]
impl ResultPublisher for DisabledPublisher {
    async fn publish(&self, topic: &str, _payload: &str) -> Result<(), PublishError> {
        debug!("Messaging disabled, not publishing to {topic}");
        Ok(())
    }
}

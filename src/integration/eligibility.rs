use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

/// Whether an associate is currently allowed to vote.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Eligibility {
    AbleToVote,
    UnableToVote,
}

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("eligibility service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("eligibility service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("eligibility service answered with status {0}")]
    Status(u16),
    #[error("eligibility service sent an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Asks whether the associate with a given CPF may vote right now.
#[rocket::async_trait]
pub trait EligibilityCheck: Send + Sync {
    async fn check(&self, cpf: &str) -> std::result::Result<Eligibility, EligibilityError>;
}

#[derive(Debug, Deserialize)]
struct EligibilityResponse {
    status: Eligibility,
}

/// Calls the eligibility service at `GET <base_url>/<cpf>`.
#[derive(Debug, Clone)]
pub struct HttpEligibilityClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpEligibilityClient {
    /// Build a client whose connect and overall request timeouts are both `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> EligibilityError {
        if err.is_timeout() {
            EligibilityError::Timeout(self.timeout)
        } else {
            EligibilityError::Transport(err)
        }
    }
}

#[rocket::async_trait]
impl EligibilityCheck for HttpEligibilityClient {
    async fn check(&self, cpf: &str) -> std::result::Result<Eligibility, EligibilityError> {
        let url = format!("{}/{}", self.base_url, cpf);
        debug!("Checking eligibility at {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        // The service answers 404 for CPFs it does not recognise.
        if status == StatusCode::NOT_FOUND {
            warn!("Eligibility service does not know CPF {cpf}");
            return Ok(Eligibility::UnableToVote);
        }
        if !status.is_success() {
            return Err(EligibilityError::Status(status.as_u16()));
        }

        let body = response.json::<EligibilityResponse>().await.map_err(|e| {
            if e.is_timeout() {
                EligibilityError::Timeout(self.timeout)
            } else {
                EligibilityError::Decode(e)
            }
        })?;
        debug!("CPF {cpf} is {:?}", body.status);
        Ok(body.status)
    }
}

/// Turn the outcome of an eligibility check into a go/no-go for a vote.
///
/// Only a timeout is recoverable, and only when `fail_open` is set.
pub fn resolve_eligibility(
    cpf: &str,
    outcome: std::result::Result<Eligibility, EligibilityError>,
    fail_open: bool,
) -> Result<()> {
    match outcome {
        Ok(Eligibility::AbleToVote) => Ok(()),
        Ok(Eligibility::UnableToVote) => {
            warn!("Associate {cpf} is unable to vote");
            Err(Error::unable_to_vote())
        }
        Err(EligibilityError::Timeout(timeout)) if fail_open => {
            warn!("Eligibility check for {cpf} timed out after {timeout:?}, allowing the vote");
            Ok(())
        }
        Err(err) => Err(Error::Upstream(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rocket::tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        time::sleep,
    };

    use super::*;
    use crate::error::ErrorKind;

    /// Serve a single canned HTTP response on a random local port.
    async fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        rocket::tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    /// Accept a connection and never answer.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        rocket::tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            sleep(Duration::from_secs(30)).await;
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> HttpEligibilityClient {
        HttpEligibilityClient::new(base_url, Duration::from_millis(300)).unwrap()
    }

    #[rocket::async_test]
    async fn able_to_vote() {
        let url = serve_once("200 OK", r#"{"status": "ABLE_TO_VOTE"}"#).await;
        let outcome = client(url).check("12345678901").await;
        assert_eq!(Eligibility::AbleToVote, outcome.unwrap());
    }

    #[rocket::async_test]
    async fn unable_to_vote() {
        let url = serve_once("200 OK", r#"{"status": "UNABLE_TO_VOTE"}"#).await;
        let outcome = client(url).check("12345678901").await;
        assert_eq!(Eligibility::UnableToVote, outcome.unwrap());
    }

    #[rocket::async_test]
    async fn unknown_cpf_is_unable() {
        let url = serve_once("404 Not Found", "{}").await;
        let outcome = client(url).check("12345678901").await;
        assert_eq!(Eligibility::UnableToVote, outcome.unwrap());
    }

    #[rocket::async_test]
    async fn server_error_status() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        match client(url).check("12345678901").await {
            Err(EligibilityError::Status(503)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn garbage_body() {
        let url = serve_once("200 OK", r#"{"status": "MAYBE"}"#).await;
        match client(url).check("12345678901").await {
            Err(EligibilityError::Decode(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn silent_service_times_out() {
        let url = serve_silence().await;
        match client(url).check("12345678901").await {
            Err(EligibilityError::Timeout(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        match client(format!("http://{addr}")).check("12345678901").await {
            Err(EligibilityError::Transport(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resolution_rules() {
        let timeout = || Err(EligibilityError::Timeout(Duration::from_secs(5)));

        assert!(resolve_eligibility("1", Ok(Eligibility::AbleToVote), false).is_ok());
        assert!(resolve_eligibility("1", timeout(), true).is_ok());

        let err = resolve_eligibility("1", Ok(Eligibility::UnableToVote), true).unwrap_err();
        assert_eq!("Associate unable to vote", err.to_string());

        let err = resolve_eligibility("1", timeout(), false).unwrap_err();
        assert_eq!(ErrorKind::Upstream, err.kind());

        let err = resolve_eligibility("1", Err(EligibilityError::Status(500)), true).unwrap_err();
        assert_eq!(ErrorKind::Upstream, err.kind());
    }
}

use chrono::Utc;
use log::{error, info, warn};
use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::TryStreamExt,
    serde::json::{serde_json, Json},
    Route, State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::integration::ResultPublisher;
use crate::model::{
    api::{
        event::VotingSessionResultEvent,
        session::{ResultCounts, VotingSessionDescription, VotingSessionRequest, VotingSessionResult},
    },
    db::{
        session::{VotingSession, VotingSessionCore},
        subject::Subject,
        vote::Vote,
    },
    mongodb::{map_duplicate_key, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![
        session,
        session_result,
        sessions,
        open_session,
        open_session_unsupported,
    ]
}

#[get("/session/<subject_code>")]
async fn session(
    subject_code: &str,
    sessions: Coll<VotingSession>,
) -> Result<Json<VotingSessionDescription>> {
    info!("Finding voting session for subject {subject_code}");
    let session = find_session(subject_code, &sessions).await?;
    Ok(Json(VotingSessionDescription::at(&session, Utc::now())))
}

#[get("/session/result/<subject_code>")]
async fn session_result(
    subject_code: &str,
    sessions: Coll<VotingSession>,
    votes: Coll<Vote>,
    config: &State<Config>,
    publisher: &State<Box<dyn ResultPublisher>>,
) -> Result<Json<VotingSessionResult>> {
    let session = find_session(subject_code, &sessions).await?;

    let counts = ResultCounts {
        yes: votes
            .count_documents(Vote::option_filter(subject_code, true), None)
            .await?,
        no: votes
            .count_documents(Vote::option_filter(subject_code, false), None)
            .await?,
    };
    info!(
        "Session for subject {subject_code} has {} yes and {} no votes",
        counts.yes, counts.no
    );

    let result = VotingSessionResult::at(&session, counts, Utc::now());
    if session.needs_notification(config.messaging_enabled(), result.session.status) {
        notify(&session, &result, config, publisher.inner().as_ref(), &sessions).await?;
    }

    Ok(Json(result))
}

/// Publish the results event, then mark the session as notified.
///
/// A failed publication is logged and left for the next read to retry.
async fn notify(
    session: &VotingSession,
    result: &VotingSessionResult,
    config: &Config,
    publisher: &dyn ResultPublisher,
    sessions: &Coll<VotingSession>,
) -> Result<()> {
    let event = VotingSessionResultEvent::new(result.clone());
    let payload = serde_json::to_string(&event)?;

    if let Err(e) = publisher.publish(config.messaging_topic(), &payload).await {
        error!("Results of subject {} not published: {e}", session.subject.code);
        return Ok(());
    }
    info!(
        "Published results of subject {} as version {}",
        session.subject.code, event.version
    );

    sessions
        .update_one(
            session.unnotified_filter(),
            doc! { "$set": { "notified": true } },
            None,
        )
        .await?;
    Ok(())
}

#[get("/session")]
async fn sessions(sessions: Coll<VotingSession>) -> Result<Json<Vec<VotingSessionDescription>>> {
    let options = FindOptions::builder()
        .sort(VotingSession::sort_order())
        .build();
    let sessions = sessions
        .find(None, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    info!("Found {} voting sessions", sessions.len());

    let now = Utc::now();
    Ok(Json(
        sessions
            .iter()
            .map(|session| VotingSessionDescription::at(session, now))
            .collect(),
    ))
}

#[post("/session", data = "<request>", format = "json")]
async fn open_session(
    request: Json<VotingSessionRequest>,
    subjects: Coll<Subject>,
    sessions: Coll<VotingSession>,
    config: &State<Config>,
) -> Result<Json<VotingSessionDescription>> {
    let spec = request.into_inner().validate()?;

    // One session per subject, ever, not just one open at a time.
    if sessions
        .find_one(VotingSession::subject_code_filter(&spec.subject_code), None)
        .await?
        .is_some()
    {
        warn!("Subject {} already has a voting session", spec.subject_code);
        return Err(Error::session_already_open());
    }

    let subject = subjects
        .find_one(Subject::code_filter(&spec.subject_code), None)
        .await?
        .ok_or_else(|| Error::not_found("Subject"))?;

    let now = Utc::now();
    let expires_at = match spec.expiration_date {
        Some(expiration) if expiration < now => {
            warn!("Expiration {expiration} for subject {} is in the past", subject.code);
            return Err(Error::invalid_date_time());
        }
        Some(expiration) => expiration,
        None => now + config.default_session_ttl(),
    };

    let session = VotingSession::new(VotingSessionCore::new(subject, expires_at));
    sessions
        .insert_one(&session, None)
        .await
        .map_err(|e| map_duplicate_key(e, Error::session_already_open))?;
    info!(
        "Opened voting session for subject {} until {}",
        session.subject.code, session.expires_at
    );

    Ok(Json(VotingSessionDescription::at(&session, now)))
}

#[post("/session", rank = 2)]
fn open_session_unsupported() -> Error {
    Error::unsupported_media_type()
}

pub(crate) async fn find_session(
    subject_code: &str,
    sessions: &Coll<VotingSession>,
) -> Result<VotingSession> {
    sessions
        .find_one(VotingSession::subject_code_filter(subject_code), None)
        .await?
        .ok_or_else(|| Error::not_found("Voting session"))
}

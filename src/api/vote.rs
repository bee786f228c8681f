use chrono::Utc;
use log::{info, warn};
use rocket::{serde::json::Json, Route, State};

use crate::api::session::find_session;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::integration::{resolve_eligibility, EligibilityCheck};
use crate::model::{
    api::{
        session::VotingSessionDescription,
        vote::{VoteReceipt, VoteRequest},
    },
    db::{
        associate::Associate,
        session::VotingSession,
        vote::{Vote, VoteCore},
    },
    mongodb::{map_duplicate_key, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote, cast_vote_unsupported]
}

/// Record an associate's yes/no vote on the session for a subject.
///
/// Checks run in a fixed order: the session must exist, the associate must
/// not have voted on it already, it must not have expired, the associate must
/// exist, and finally the eligibility service must allow the vote. The local
/// checks come first so rejected votes never reach the network.
#[post("/vote", data = "<request>", format = "json")]
async fn cast_vote(
    request: Json<VoteRequest>,
    sessions: Coll<VotingSession>,
    votes: Coll<Vote>,
    associates: Coll<Associate>,
    config: &State<Config>,
    eligibility: &State<Box<dyn EligibilityCheck>>,
) -> Result<Json<VoteReceipt>> {
    let spec = request.into_inner().validate()?;
    let session = find_session(&spec.subject_code, &sessions).await?;

    if votes
        .find_one(Vote::ballot_filter(&spec.cpf, &spec.subject_code), None)
        .await?
        .is_some()
    {
        warn!("Associate {} already voted on {}", spec.cpf, spec.subject_code);
        return Err(Error::already_voted());
    }

    let now = Utc::now();
    if session.is_expired_at(now) {
        warn!("Voting session for {} expired at {}", spec.subject_code, session.expires_at);
        return Err(Error::session_expired());
    }

    let associate = associates
        .find_one(Associate::cpf_filter(&spec.cpf), None)
        .await?
        .ok_or_else(|| Error::not_found("Associate"))?;

    let outcome = eligibility.check(&associate.cpf).await;
    resolve_eligibility(&associate.cpf, outcome, config.eligibility_fail_open())?;

    let vote = Vote::new(VoteCore::new(&associate, &session, spec.option));
    votes
        .insert_one(&vote, None)
        .await
        .map_err(|e| map_duplicate_key(e, Error::already_voted))?;
    info!(
        "Associate {} voted {} on {}",
        associate.cpf,
        if vote.option { "yes" } else { "no" },
        spec.subject_code
    );

    Ok(Json(VoteReceipt {
        session: VotingSessionDescription::at(&session, now),
        associate: associate.into(),
    }))
}

#[post("/vote", rank = 2)]
fn cast_vote_unsupported() -> Error {
    Error::unsupported_media_type()
}

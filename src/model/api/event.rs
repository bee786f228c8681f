use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::api::session::VotingSessionResult;

/// Published once when the results of a closed session are first read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingSessionResultEvent {
    /// Random per-event identifier, so consumers can discard redeliveries.
    pub version: String,
    pub voting_session_result: VotingSessionResult,
}

impl VotingSessionResultEvent {
    pub fn new(voting_session_result: VotingSessionResult) -> Self {
        Self {
            version: Uuid::new_v4().to_string(),
            voting_session_result,
        }
    }
}

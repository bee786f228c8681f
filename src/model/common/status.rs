use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a voting session. Never stored: it is derived from the
/// expiration timestamp whenever a session is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    /// The expiration is still in the future.
    Open,
    /// The expiration has been reached. This is final.
    Closed,
}

impl SessionStatus {
    /// The status of a session expiring at `expires_at`, as observed at `now`.
    pub fn at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expires_at > now {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged-in session as held in tab-scoped storage. Created by the host at
/// login, mutated only by the refresh coordinator afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    /// Lifetime of the new access token, in seconds.
    pub expires_in: i64,
}

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A token counts as near expiry once `now` reaches `expires_at - margin`.
/// Millisecond arithmetic, matching the storage representation.
pub(crate) fn near_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>, margin: Duration) -> bool {
    now.timestamp_millis() >= expires_at.timestamp_millis() - margin.as_millis() as i64
}

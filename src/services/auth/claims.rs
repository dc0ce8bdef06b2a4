use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried inside an access token.
///
/// Timestamps are whole seconds since the Unix epoch (JWT NumericDate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    // Unique per issuance; two tokens minted for the same subject in the same second
    // still differ, so revoking one never revokes the other.
    pub jti: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Zero skew: the token is dead from the `exp` second onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

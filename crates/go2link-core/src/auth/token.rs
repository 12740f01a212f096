use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

use super::TokenError;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Missing `exp` reads as 0, i.e. already expired. Some issuers emit
    /// fractional seconds, so any JSON number is accepted.
    #[serde(default)]
    exp: f64,
}

/// Opaque bearer token plus its `exp` claim (Unix seconds).
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    expires_at: i64,
}

impl Token {
    /// Read the `exp` claim without verifying the signature.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into().trim().to_string();
        let data = jsonwebtoken::dangerous::insecure_decode::<Claims>(&raw)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        Ok(Self {
            raw,
            expires_at: data.claims.exp.floor() as i64,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Local wall-clock expiry, for display
    pub fn expires_at_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.expires_at, 0).single()
    }

    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.expires_at - now
    }

    /// The server will reject it
    pub fn is_past_expiry(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Inside the safety margin, or past expiry
    pub fn needs_refresh(&self, now: i64, margin_secs: i64) -> bool {
        now > self.expires_at - margin_secs
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

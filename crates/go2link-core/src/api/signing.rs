//! Optional request signing.
//!
//! When an app secret is configured every request carries a millisecond
//! timestamp, a short nonce and `md5(secret ‖ timestamp ‖ nonce)`.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use uuid::Uuid;

use crate::utils::md5_hex;

pub const TIMESTAMP_HEADER: &str = "apptimestamp";
pub const NONCE_HEADER: &str = "appnonce";
pub const SIGN_HEADER: &str = "appsign";

const NONCE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub timestamp: String,
    pub nonce: String,
    pub sign: String,
}

impl Signature {
    pub fn apply(&self, headers: &mut HeaderMap) {
        // Timestamp, nonce and hex digest are always ASCII
        if let (Ok(ts), Ok(nonce), Ok(sign)) = (
            HeaderValue::from_str(&self.timestamp),
            HeaderValue::from_str(&self.nonce),
            HeaderValue::from_str(&self.sign),
        ) {
            headers.insert(TIMESTAMP_HEADER, ts);
            headers.insert(NONCE_HEADER, nonce);
            headers.insert(SIGN_HEADER, sign);
        }
    }
}

#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a request being sent now
    pub fn sign(&self) -> Signature {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let nonce: String = Uuid::new_v4().simple().to_string()[..NONCE_LEN].to_string();
        self.sign_with(timestamp, nonce)
    }

    pub fn sign_with(&self, timestamp: String, nonce: String) -> Signature {
        let sign = md5_hex(format!("{}{}{}", self.secret, timestamp, nonce).as_bytes());
        Signature {
            timestamp,
            nonce,
            sign,
        }
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

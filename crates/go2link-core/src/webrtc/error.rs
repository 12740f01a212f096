use thiserror::Error;

use crate::api::ApiError;
use crate::crypto::CryptoError;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to parse session credentials: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether rerunning the whole handshake may succeed.
    /// Crypto and parse failures are retried with fresh key material.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Api(e) => e.is_retryable(),
            FetchError::Crypto(_) | FetchError::InvalidResponse(_) | FetchError::Parse(_) => true,
        }
    }
}

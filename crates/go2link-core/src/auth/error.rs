use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Login response carried no access token")]
    MissingAccessToken,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl RefreshError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RefreshError::Api(e) => e.is_retryable(),
            RefreshError::MissingAccessToken | RefreshError::Token(_) => false,
        }
    }
}

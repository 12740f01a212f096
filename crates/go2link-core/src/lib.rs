//! go2link core - credentials and session establishment for remote robot control.
//!
//! The pipeline has two halves:
//!
//! - `auth`: an access token obtained by logging in to the robot cloud
//!   service, cached on disk and refreshed ahead of its `exp` claim
//! - `webrtc`: a hybrid RSA/AES handshake that trades the token and a robot
//!   serial number for time-limited TURN credentials
//!
//! Both talk to the service through `api::RemoteApi`, implemented over HTTP
//! by `api::ApiClient`. Nothing here retries on its own; callers decide
//! using the `is_retryable()` of each error type.

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod utils;
pub mod webrtc;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, RemoteApi};
pub use auth::{Credential, Token, TokenManager, TokenState, TokenStore};
pub use config::Config;
pub use crypto::{CryptoError, KeyWrap};
pub use webrtc::{FetchError, IceServer, SessionCredentials, SessionFetcher};

//! WebRTC session credentials.
//!
//! `SessionFetcher` runs the hybrid handshake against the remote service:
//! fetch the RSA public key, mint a one-time AES key, wrap it, send it with
//! the robot serial number and decrypt the TURN credentials that come back.
//! Every attempt mints its own key, so a failed attempt can simply be
//! retried from the top.

pub mod error;
pub mod fetcher;
pub mod models;

pub use error::FetchError;
pub use fetcher::{SessionFetcher, PUBLIC_KEY_PATH, SESSION_PATH};
pub use models::{IceServer, SessionCredentials, DEFAULT_STUN_URL};

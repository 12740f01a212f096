//! Access-token lifecycle.
//!
//! This module provides:
//! - `Token`: bearer token with its unverified `exp` claim
//! - `TokenStore`: the single on-disk token file, replaced atomically
//! - `TokenManager`: load-or-fetch, expiry checks, refresh and deletion
//! - `Credential`: account login input, never persisted
//!
//! The token's signature is never checked locally. The remote service is
//! the only signer and verifier; `exp` is read purely to schedule refreshes.

pub mod credentials;
pub mod error;
pub mod manager;
pub mod store;
pub mod token;

pub use credentials::Credential;
pub use error::{RefreshError, StoreError, TokenError};
pub use manager::{TokenManager, TokenState, LOGIN_PATH};
pub use store::TokenStore;
pub use token::Token;

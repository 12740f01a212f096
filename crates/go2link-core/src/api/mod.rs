//! Remote identity/session service client.
//!
//! This module provides the `ApiClient` for talking to the robot cloud
//! service, and the `RemoteApi` trait it implements so the token and
//! session layers can be driven by any transport.
//!
//! Every response is a `{code, data}` envelope. Code 100 means success;
//! anything else surfaces as `ApiError::RemoteService`.

pub mod client;
pub mod error;
pub mod signing;

pub use client::{ApiClient, Method, RemoteApi, ResponseEnvelope, SUCCESS_CODE};
pub use error::ApiError;
pub use signing::{RequestSigner, Signature};

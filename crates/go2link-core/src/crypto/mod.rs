//! Hybrid-encryption primitives for the session-credential handshake.
//!
//! This module provides:
//! - `load_public_key`: parse the service's RSA key (PEM or bare base64 DER)
//! - `generate_session_key`: a fresh single-use AES-256 key
//! - `encrypt_key`: wrap the session key under the RSA public key
//! - `decrypt_payload`: AES-256-ECB/PKCS#7 decryption of the response body
//!
//! The payload cipher is unauthenticated. Integrity of decrypted payloads
//! relies solely on the TLS transport to the remote service.

pub mod codec;
pub mod error;

pub use codec::{
    decrypt_payload, encrypt_key, encrypt_payload, generate_session_key, load_public_key, KeyWrap,
    SessionKey, SESSION_KEY_LEN,
};
pub use error::CryptoError;

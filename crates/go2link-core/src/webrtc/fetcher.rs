use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::RsaPublicKey;
use tracing::{debug, info, warn};

use crate::api::{Method, RemoteApi};
use crate::auth::Token;
use crate::crypto::{self, CryptoError, KeyWrap};

use super::{FetchError, SessionCredentials};

/// Public key endpoint, no token required
pub const PUBLIC_KEY_PATH: &str = "system/pubKey";

/// Session credential endpoint, takes `sn` and the wrapped key `sk`
pub const SESSION_PATH: &str = "webrtc/account";

pub struct SessionFetcher {
    remote: Arc<dyn RemoteApi>,
    key_wrap: KeyWrap,
}

impl SessionFetcher {
    pub fn new(remote: Arc<dyn RemoteApi>, key_wrap: KeyWrap) -> Self {
        Self { remote, key_wrap }
    }

    /// Fetch the service's public key. Never cached, failures included.
    pub async fn fetch_public_key(&self) -> Result<RsaPublicKey, FetchError> {
        let envelope = self
            .remote
            .call(PUBLIC_KEY_PATH, &[], None, Method::Get)
            .await?;
        let pem = envelope
            .data
            .as_str()
            .ok_or_else(|| FetchError::InvalidResponse("public key is not a string".to_string()))?;
        Ok(crypto::load_public_key(pem)?)
    }

    /// Run the full handshake for one robot.
    pub async fn try_fetch(
        &self,
        serial: &str,
        token: &Token,
    ) -> Result<SessionCredentials, FetchError> {
        let public_key = self.fetch_public_key().await?;

        let session_key = crypto::generate_session_key();
        let wrapped = crypto::encrypt_key(&session_key, &public_key, self.key_wrap)?;
        let sk = STANDARD.encode(wrapped);

        let body = [("sn", serial), ("sk", sk.as_str())];
        let envelope = self
            .remote
            .call(SESSION_PATH, &body, Some(token.as_str()), Method::Post)
            .await?;

        let data = envelope.data.as_str().ok_or_else(|| {
            FetchError::InvalidResponse("session payload is not a string".to_string())
        })?;
        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        let ciphertext = STANDARD.decode(compact).map_err(CryptoError::from)?;
        let plaintext = crypto::decrypt_payload(&ciphertext, &session_key)?;
        debug!(bytes = plaintext.len(), "Decrypted session payload");

        Ok(serde_json::from_slice(&plaintext)?)
    }

    pub async fn fetch(&self, serial: &str, token: &Token) -> Option<SessionCredentials> {
        match self.try_fetch(serial, token).await {
            Ok(credentials) => {
                info!(serial = serial, "Obtained WebRTC session credentials");
                Some(credentials)
            }
            Err(e) => {
                warn!(
                    serial = serial,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to fetch WebRTC session credentials"
                );
                None
            }
        }
    }
}

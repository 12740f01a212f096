//! Scripted in-process stand-in for the remote service.

use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use sha2::Sha256;

use crate::api::{ApiError, Method, RemoteApi, ResponseEnvelope, SUCCESS_CODE};
use crate::crypto::{encrypt_payload, KeyWrap, SessionKey};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub path: String,
    pub body: Vec<(String, String)>,
    pub token: Option<String>,
    pub method: Method,
}

pub(crate) struct FakeRemote {
    /// Access token handed out by `login/email`; `None` rejects the login
    pub login_token: Option<String>,
    pub pubkey_code: i64,
    /// Simulate an unreachable service on `system/pubKey`
    pub pubkey_unavailable: bool,
    pub pubkey_override: Option<String>,
    pub session_code: i64,
    pub session_data_override: Option<Value>,
    pub session_payload: Value,
    /// Break the base64 session data into 76-column lines, MIME style
    pub wrap_session_data: bool,
    pub key_wrap: KeyWrap,
    private_key: Option<RsaPrivateKey>,
    pub calls: Mutex<Vec<RecordedCall>>,
    /// Session keys recovered from `sk`, in call order
    pub unwrapped_keys: Mutex<Vec<Vec<u8>>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            login_token: None,
            pubkey_code: SUCCESS_CODE,
            pubkey_unavailable: false,
            pubkey_override: None,
            session_code: SUCCESS_CODE,
            session_data_override: None,
            session_payload: json!({
                "user": "turn-user",
                "passwd": "turn-pass",
                "realm": "turn:203.0.113.7:3478",
            }),
            wrap_session_data: false,
            key_wrap: KeyWrap::Oaep,
            private_key: None,
            calls: Mutex::new(Vec::new()),
            unwrapped_keys: Mutex::new(Vec::new()),
        }
    }

    pub fn with_login_token(mut self, token: impl Into<String>) -> Self {
        self.login_token = Some(token.into());
        self
    }

    pub fn with_rsa(self) -> Self {
        self.with_rsa_bits(1024)
    }

    pub fn with_rsa_bits(mut self, bits: usize) -> Self {
        let key = RsaPrivateKey::new(&mut OsRng, bits).expect("Failed to generate RSA key");
        self.private_key = Some(key);
        self
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }

    fn envelope(code: i64, data: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            code,
            data,
            message: None,
        }
    }

    fn public_key_pem(&self) -> String {
        let key = self.private_key.as_ref().expect("FakeRemote needs with_rsa()");
        RsaPublicKey::from(key)
            .to_public_key_pem(LineEnding::LF)
            .expect("Failed to encode public key")
    }

    fn session_data(&self, body: &[(&str, &str)]) -> Value {
        let key = self.private_key.as_ref().expect("FakeRemote needs with_rsa()");
        let sk = body
            .iter()
            .find(|(k, _)| *k == "sk")
            .map(|(_, v)| *v)
            .expect("sk missing from body");
        let wrapped = STANDARD.decode(sk).expect("sk is not base64");
        let raw = match self.key_wrap {
            KeyWrap::Oaep => key.decrypt(Oaep::new::<Sha256>(), &wrapped),
            KeyWrap::Pkcs1v15 => key.decrypt(Pkcs1v15Encrypt, &wrapped),
        }
        .expect("Failed to unwrap session key");
        self.unwrapped_keys.lock().unwrap().push(raw.clone());

        let session_key = SessionKey::from_raw(&raw).expect("unexpected session key length");
        let plaintext = serde_json::to_vec(&self.session_payload).unwrap();
        let ciphertext = encrypt_payload(&plaintext, &session_key).unwrap();
        let encoded = STANDARD.encode(ciphertext);
        if !self.wrap_session_data {
            return Value::String(encoded);
        }
        let lines: Vec<&str> = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect();
        Value::String(lines.join("\r\n"))
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn send(
        &self,
        path: &str,
        body: &[(&str, &str)],
        token: Option<&str>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            body: body
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            token: token.map(str::to_string),
            method,
        });

        match path {
            "login/email" => Ok(match self.login_token {
                Some(ref token) => Self::envelope(SUCCESS_CODE, json!({ "accessToken": token })),
                None => Self::envelope(1001, Value::Null),
            }),
            "system/pubKey" => {
                if self.pubkey_unavailable {
                    return Err(ApiError::ServerError("unavailable".to_string()));
                }
                if self.pubkey_code != SUCCESS_CODE {
                    return Ok(Self::envelope(self.pubkey_code, Value::Null));
                }
                let pem = self
                    .pubkey_override
                    .clone()
                    .unwrap_or_else(|| self.public_key_pem());
                Ok(Self::envelope(SUCCESS_CODE, Value::String(pem)))
            }
            "webrtc/account" => {
                if self.session_code != SUCCESS_CODE {
                    return Ok(Self::envelope(self.session_code, Value::Null));
                }
                let data = match self.session_data_override {
                    Some(ref data) => data.clone(),
                    None => self.session_data(body),
                };
                Ok(Self::envelope(SUCCESS_CODE, data))
            }
            other => Err(ApiError::NotFound(other.to_string())),
        }
    }
}

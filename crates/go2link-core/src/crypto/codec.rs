use base64::{engine::general_purpose::STANDARD, Engine as _};
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use rand::{rngs::OsRng, RngCore};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::CryptoError;

type Aes256EcbEnc = ecb::Encryptor<aes::Aes256>;
type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;

/// Session keys are 32 lowercase hex characters, used verbatim as AES-256 key bytes.
pub const SESSION_KEY_LEN: usize = 32;

const AES_BLOCK_LEN: usize = 16;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Asymmetric padding used to wrap the session key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyWrap {
    /// RSA-OAEP with SHA-256
    #[default]
    Oaep,
    /// RSAES-PKCS1-v1_5, for services that predate OAEP
    Pkcs1v15,
}

/// A single-use symmetric key. Never persisted, never reused across fetches.
#[derive(PartialEq, Eq)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    /// Rebuild a key unwrapped on the receiving side of the exchange
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let key: [u8; SESSION_KEY_LEN] = raw.try_into().ok()?;
        Some(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Generate a fresh session key from 16 bytes of OS randomness.
pub fn generate_session_key() -> SessionKey {
    let mut raw = [0u8; SESSION_KEY_LEN / 2];
    OsRng.fill_bytes(&mut raw);

    let mut key = [0u8; SESSION_KEY_LEN];
    for (i, byte) in raw.iter().enumerate() {
        key[2 * i] = HEX_DIGITS[(byte >> 4) as usize];
        key[2 * i + 1] = HEX_DIGITS[(byte & 0x0f) as usize];
    }
    SessionKey(key)
}

/// Parse the service's RSA public key.
///
/// Accepts SPKI PEM (`BEGIN PUBLIC KEY`), PKCS#1 PEM (`BEGIN RSA PUBLIC KEY`)
/// or bare base64 DER in either encoding, which is what the service
/// usually sends.
pub fn load_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    let trimmed = pem.trim();
    if trimmed.is_empty() {
        return Err(CryptoError::InvalidPublicKey("empty key material".to_string()));
    }

    if trimmed.contains("-----BEGIN RSA PUBLIC KEY-----") {
        return RsaPublicKey::from_pkcs1_pem(trimmed)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()));
    }
    if trimmed.contains("-----BEGIN") {
        return RsaPublicKey::from_public_key_pem(trimmed)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()));
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let der = STANDARD
        .decode(compact)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("not PEM and not base64 DER: {}", e)))?;

    RsaPublicKey::from_public_key_der(&der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Wrap the session key under the public key.
///
/// Output is randomized by the padding scheme, so two calls never agree.
/// Fails when the key is too small for the padding overhead plus key length.
pub fn encrypt_key(
    key: &SessionKey,
    public_key: &RsaPublicKey,
    wrap: KeyWrap,
) -> Result<Vec<u8>, CryptoError> {
    let mut rng = OsRng;
    let wrapped = match wrap {
        KeyWrap::Oaep => public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), key.as_bytes())?,
        KeyWrap::Pkcs1v15 => public_key.encrypt(&mut rng, Pkcs1v15Encrypt, key.as_bytes())?,
    };
    Ok(wrapped)
}

/// Decrypt an AES-256-ECB/PKCS#7 payload.
///
/// Length and padding failures come back as `CryptoError::Decrypt`; callers
/// treat them as a malformed response.
pub fn decrypt_payload(ciphertext: &[u8], key: &SessionKey) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_LEN != 0 {
        return Err(CryptoError::Decrypt(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            AES_BLOCK_LEN
        )));
    }

    let cipher = Aes256EcbDec::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Decrypt(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decrypt("invalid PKCS#7 padding".to_string()))
}

/// Inverse of `decrypt_payload`, as the remote service applies it.
pub fn encrypt_payload(plaintext: &[u8], key: &SessionKey) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256EcbEnc::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Decrypt(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

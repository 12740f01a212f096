use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Failed to wrap session key: {0}")]
    KeyWrap(#[from] rsa::Error),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload decryption failed: {0}")]
    Decrypt(String),
}

use crate::utils::md5_hex;

/// Account login input. Lives only as long as the request that uses it.
#[derive(Clone)]
pub struct Credential {
    identifier: String,
    secret: String,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Password form the login endpoint expects: unsalted lowercase hex MD5.
    /// Obfuscation only; confidentiality in transit comes from TLS.
    pub fn password_hash(&self) -> String {
        md5_hex(self.secret.as_bytes())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

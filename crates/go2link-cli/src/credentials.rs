use anyhow::{Context, Result};
use go2link_core::Credential;

pub const EMAIL_VAR: &str = "GO2LINK_EMAIL";
pub const PASSWORD_VAR: &str = "GO2LINK_PASSWORD";
pub const SERIAL_VAR: &str = "GO2LINK_SERIAL";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Account credential from the environment, prompting for a missing password
pub fn load_credential() -> Result<Credential> {
    credential_from(env_var(EMAIL_VAR), env_var(PASSWORD_VAR), |email| {
        rpassword::prompt_password(format!("Password for {}: ", email))
    })
}

fn credential_from<F>(
    email: Option<String>,
    password: Option<String>,
    prompt: F,
) -> Result<Credential>
where
    F: FnOnce(&str) -> std::io::Result<String>,
{
    let email = email
        .filter(|s| !s.is_empty())
        .with_context(|| format!("{} is not set", EMAIL_VAR))?;

    let password = match password {
        Some(password) if !password.is_empty() => password,
        _ => prompt(&email).context("Failed to read password")?,
    };

    Ok(Credential::new(email, password))
}

/// Robot serial from the command line, falling back to the environment
pub fn resolve_serial(serial: Option<String>) -> Result<String> {
    serial_from(serial, || env_var(SERIAL_VAR))
}

fn serial_from(
    serial: Option<String>,
    fallback: impl FnOnce() -> Option<String>,
) -> Result<String> {
    serial
        .or_else(fallback)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .with_context(|| format!("No robot serial given and {} is not set", SERIAL_VAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_prompt(_: &str) -> std::io::Result<String> {
        panic!("password prompt should not be shown")
    }

    #[test]
    fn test_resolve_serial_prefers_argument() {
        assert_eq!(resolve_serial(Some(" B42 ".to_string())).unwrap(), "B42");
        let serial = serial_from(Some("B42".to_string()), || Some("FROM-ENV".to_string()));
        assert_eq!(serial.unwrap(), "B42");
    }

    #[test]
    fn test_resolve_serial_falls_back_to_environment() {
        let serial = serial_from(None, || Some(" B42D2000 \n".to_string()));
        assert_eq!(serial.unwrap(), "B42D2000");
    }

    #[test]
    fn test_resolve_serial_rejects_blank() {
        assert!(serial_from(Some("   ".to_string()), || None).is_err());
        assert!(serial_from(None, || Some("\t".to_string())).is_err());

        let err = serial_from(None, || None).unwrap_err();
        assert!(err.to_string().contains(SERIAL_VAR));
    }

    #[test]
    fn test_credential_requires_email() {
        let err = credential_from(None, Some("secret".to_string()), no_prompt).unwrap_err();
        assert!(err.to_string().contains(EMAIL_VAR));

        let err = credential_from(Some(String::new()), Some("secret".to_string()), no_prompt)
            .unwrap_err();
        assert!(err.to_string().contains(EMAIL_VAR));
    }

    #[test]
    fn test_credential_from_environment_values() {
        let credential = credential_from(
            Some("pilot@example.com".to_string()),
            Some("password".to_string()),
            no_prompt,
        )
        .unwrap();
        assert_eq!(credential.identifier(), "pilot@example.com");
        assert_eq!(
            credential.password_hash(),
            Credential::new("x", "password").password_hash()
        );
    }

    #[test]
    fn test_credential_prompts_for_missing_password() {
        let credential = credential_from(Some("pilot@example.com".to_string()), None, |email| {
            assert_eq!(email, "pilot@example.com");
            Ok("typed".to_string())
        })
        .unwrap();
        assert_eq!(
            credential.password_hash(),
            Credential::new("x", "typed").password_hash()
        );

        let err = credential_from(Some("pilot@example.com".to_string()), None, |_| {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no tty"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read password"));
    }
}

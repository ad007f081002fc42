//! Request-scoped bind credentials.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Credentials used for exactly one LDAP bind.
///
/// The gateway performs no local validation of these; they are passed
/// through unmodified as the bind identity and secret. Instances live for
/// the duration of a single request and are never persisted. The secret is
/// wrapped in [`SecretString`] so it cannot leak through `Debug` output or
/// serialization.
#[derive(Clone)]
pub struct BindCredentials {
    principal: String,
    secret: SecretString,
}

impl BindCredentials {
    /// Creates credentials from a principal and its secret.
    #[must_use]
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// The bind identity (DN or username, as the caller supplied it).
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The bind secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindCredentials")
            .field("principal", &self.principal)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

//! Startup configuration for the gateway.
//!
//! All configuration is loaded once at process startup and is read-only
//! thereafter; nothing here is re-read or hot-reloaded mid-request.

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Default transport connect timeout (seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default listen address for the HTTP adapter.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

const fn default_trust_all() -> bool {
    true
}

const fn default_verify_hostname() -> bool {
    true
}

fn default_store_format() -> String {
    "PKCS12".to_string()
}

/// TLS trust policy applied when connecting to `ldaps` targets.
///
/// Process-wide configuration: constructed once at startup and shared
/// read-only across all requests.
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    trust_all: bool,
    store_path: Option<String>,
    store_password: Option<SecretString>,
    store_format: String,
    verify_hostname: bool,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            trust_all: default_trust_all(),
            store_path: None,
            store_password: None,
            store_format: default_store_format(),
            verify_hostname: default_verify_hostname(),
        }
    }
}

impl TrustPolicy {
    /// Creates a policy with the default settings (trust-all, hostname
    /// verification enabled).
    ///
    /// Trust-all accepts any certificate chain unconditionally and is only
    /// suitable outside production.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether every certificate chain is accepted unconditionally.
    #[must_use]
    pub const fn trust_all(&self) -> bool {
        self.trust_all
    }

    /// Optional truststore path (store-based validation only).
    #[must_use]
    pub fn store_path(&self) -> Option<&str> {
        self.store_path.as_deref()
    }

    /// Optional truststore password.
    #[must_use]
    pub const fn store_password(&self) -> Option<&SecretString> {
        self.store_password.as_ref()
    }

    /// Truststore format (`PKCS12` or `PEM`).
    #[must_use]
    pub fn store_format(&self) -> &str {
        &self.store_format
    }

    /// Returns whether the server certificate's hostname must match the
    /// connected host.
    #[must_use]
    pub const fn verify_hostname(&self) -> bool {
        self.verify_hostname
    }

    /// Enables or disables unconditional certificate acceptance.
    #[must_use]
    pub const fn with_trust_all(mut self, trust_all: bool) -> Self {
        self.trust_all = trust_all;
        self
    }

    /// Sets the truststore path used for store-based validation.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<String>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Sets the truststore password.
    #[must_use]
    pub fn with_store_password(mut self, password: SecretString) -> Self {
        self.store_password = Some(password);
        self
    }

    /// Sets the truststore format.
    #[must_use]
    pub fn with_store_format(mut self, format: impl Into<String>) -> Self {
        self.store_format = format.into();
        self
    }

    /// Enables or disables hostname verification.
    #[must_use]
    pub const fn with_verify_hostname(mut self, verify: bool) -> Self {
        self.verify_hostname = verify;
        self
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    listen: String,
    connect_timeout_secs: u64,
    trust: TrustPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            trust: TrustPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads the configuration from `LDAPGW_*` environment variables.
    ///
    /// Unset variables fall back to their defaults. Recognized variables:
    /// `LDAPGW_LISTEN`, `LDAPGW_CONNECT_TIMEOUT_SECS`, `LDAPGW_TRUST_ALL`,
    /// `LDAPGW_TRUSTSTORE_PATH`, `LDAPGW_TRUSTSTORE_PASSWORD`,
    /// `LDAPGW_TRUSTSTORE_FORMAT`, `LDAPGW_VERIFY_HOSTNAME`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is present but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through a lookup function.
    ///
    /// `from_env` delegates here; tests supply their own lookup instead of
    /// mutating the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(listen) = lookup("LDAPGW_LISTEN") {
            config.listen = listen;
        }
        if let Some(timeout) = lookup("LDAPGW_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = timeout.parse().map_err(|_| {
                Error::Config(format!(
                    "LDAPGW_CONNECT_TIMEOUT_SECS must be an integer, got `{timeout}`"
                ))
            })?;
        }
        if let Some(trust_all) = lookup("LDAPGW_TRUST_ALL") {
            config.trust.trust_all = parse_bool("LDAPGW_TRUST_ALL", &trust_all)?;
        }
        if let Some(path) = lookup("LDAPGW_TRUSTSTORE_PATH") {
            config.trust.store_path = Some(path);
        }
        if let Some(password) = lookup("LDAPGW_TRUSTSTORE_PASSWORD") {
            config.trust.store_password = Some(SecretString::from(password));
        }
        if let Some(format) = lookup("LDAPGW_TRUSTSTORE_FORMAT") {
            config.trust.store_format = format;
        }
        if let Some(verify) = lookup("LDAPGW_VERIFY_HOSTNAME") {
            config.trust.verify_hostname = parse_bool("LDAPGW_VERIFY_HOSTNAME", &verify)?;
        }

        Ok(config)
    }

    /// Address the HTTP adapter listens on.
    #[must_use]
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Transport connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// The process-wide trust policy.
    #[must_use]
    pub const fn trust(&self) -> &TrustPolicy {
        &self.trust
    }

    /// Overrides the listen address.
    #[must_use]
    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    /// Overrides the connect timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout_secs(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }

    /// Overrides the trust policy.
    #[must_use]
    pub fn with_trust(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::Config(format!(
            "{name} must be a boolean, got `{value}`"
        ))),
    }
}

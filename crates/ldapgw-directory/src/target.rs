//! Directory target parsing.

use ldapgw_core::{Error, Result};
use std::fmt;
use url::Url;

/// Default port for plaintext LDAP.
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default port for LDAP over TLS.
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Transport scheme of a directory target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plaintext transport (`ldap://`).
    Plain,
    /// TLS transport (`ldaps://`).
    Secure,
}

impl Scheme {
    /// The default port for this scheme.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Plain => DEFAULT_LDAP_PORT,
            Self::Secure => DEFAULT_LDAPS_PORT,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "ldap",
            Self::Secure => "ldaps",
        }
    }
}

/// A parsed directory endpoint: scheme, host, and port.
///
/// Derived once per request from the caller-supplied URI and immutable from
/// then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTarget {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl DirectoryTarget {
    /// Parses a caller-supplied LDAP URI into a target.
    ///
    /// `ldaps` selects the TLS transport with a default port of 636; any
    /// other scheme selects the plaintext transport with a default port of
    /// 389 (matching the gateway's historical behavior of not rejecting
    /// unknown schemes). An explicit port in the URI is always honored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] if the URI cannot be parsed or names no
    /// host.
    pub fn parse(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri)
            .map_err(|err| Error::InvalidUri(format!("cannot parse `{uri}`: {err}")))?;

        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(Error::InvalidUri(format!("`{uri}` names no host"))),
        };

        let scheme = if parsed.scheme().eq_ignore_ascii_case("ldaps") {
            Scheme::Secure
        } else {
            Scheme::Plain
        };

        let port = parsed.port().unwrap_or_else(|| scheme.default_port());

        Ok(Self { scheme, host, port })
    }

    /// The transport scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The target port (explicit or scheme default).
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Renders the canonical URL handed to the transport.
    #[must_use]
    pub fn as_url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

impl fmt::Display for DirectoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_url())
    }
}

//! TLS trust strategy resolution.
//!
//! The trust strategy is resolved once at process startup from the
//! configured [`TrustPolicy`] and shared read-only by every connection the
//! gateway opens afterwards.

use ldapgw_core::{Error, Result, TrustPolicy};
use native_tls::{Certificate, TlsConnector};
use openssl::asn1::Asn1Time;
use openssl::pkcs12::Pkcs12;
use openssl::x509::X509;
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};

/// Truststore formats the resolver can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFormat {
    Pkcs12,
    Pem,
}

impl StoreFormat {
    fn parse(format: &str) -> Result<Self> {
        match format.to_ascii_uppercase().as_str() {
            "PKCS12" | "P12" => Ok(Self::Pkcs12),
            "PEM" => Ok(Self::Pem),
            other => Err(Error::TrustStore(format!(
                "unsupported truststore format `{other}` (expected PKCS12 or PEM)"
            ))),
        }
    }
}

/// Resolved TLS trust strategy: a connector plus the hostname-verification
/// flag it was built with.
///
/// `trust_all` policies accept any certificate chain unconditionally;
/// store-based policies validate against the configured truststore (or the
/// platform root store when no path is configured). Hostname verification is
/// orthogonal to the trust mode.
#[derive(Clone, Debug)]
pub struct TlsStrategy {
    connector: TlsConnector,
    verify_hostname: bool,
}

impl TlsStrategy {
    /// Builds the TLS connector described by `policy`.
    ///
    /// Certificate validity periods are checked while the truststore is
    /// loaded, so an expired trust anchor fails at startup rather than on
    /// the first connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrustStore`] if the truststore cannot be read,
    /// parsed, or contains a certificate outside its validity period.
    pub fn resolve(policy: &TrustPolicy) -> Result<Self> {
        let mut builder = TlsConnector::builder();

        if policy.trust_all() {
            builder.danger_accept_invalid_certs(true);
        } else if let Some(path) = policy.store_path() {
            for anchor in load_trust_anchors(policy, path)? {
                builder.add_root_certificate(anchor);
            }
        }
        // No store path and no trust-all: the platform root store applies.

        if !policy.verify_hostname() {
            builder.danger_accept_invalid_hostnames(true);
        }

        let connector = builder
            .build()
            .map_err(|err| Error::TrustStore(format!("failed to construct TLS connector: {err}")))?;

        Ok(Self {
            connector,
            verify_hostname: policy.verify_hostname(),
        })
    }

    /// The connector handed to the transport for `ldaps` targets.
    #[must_use]
    pub fn connector(&self) -> &TlsConnector {
        &self.connector
    }

    /// Whether the server certificate's hostname must match the target.
    #[must_use]
    pub const fn verify_hostname(&self) -> bool {
        self.verify_hostname
    }
}

/// Resolves the configured store path to a filesystem path.
///
/// `file:` and `classpath:` prefixes are accepted for compatibility with
/// configuration migrated from the original deployment; a bare path is used
/// as-is.
fn resolve_store_path(path: &str) -> PathBuf {
    let stripped = path
        .strip_prefix("file:")
        .or_else(|| path.strip_prefix("classpath:"))
        .unwrap_or(path);
    PathBuf::from(stripped)
}

fn load_trust_anchors(policy: &TrustPolicy, path: &str) -> Result<Vec<Certificate>> {
    let format = StoreFormat::parse(policy.store_format())?;
    let resolved = resolve_store_path(path);
    let bytes = fs::read(&resolved).map_err(|err| {
        Error::TrustStore(format!(
            "cannot read truststore {}: {err}",
            resolved.display()
        ))
    })?;

    let certs = match format {
        StoreFormat::Pkcs12 => {
            let password = policy
                .store_password()
                .map_or("", |secret| secret.expose_secret());
            parse_pkcs12(&bytes, password, &resolved)?
        }
        StoreFormat::Pem => X509::stack_from_pem(&bytes).map_err(|err| {
            Error::TrustStore(format!(
                "cannot parse PEM truststore {}: {err}",
                resolved.display()
            ))
        })?,
    };

    if certs.is_empty() {
        return Err(Error::TrustStore(format!(
            "truststore {} contains no certificates",
            resolved.display()
        )));
    }

    certs
        .into_iter()
        .map(|cert| {
            check_validity_period(&cert)?;
            let der = cert
                .to_der()
                .map_err(|err| Error::TrustStore(format!("cannot encode trust anchor: {err}")))?;
            Certificate::from_der(&der)
                .map_err(|err| Error::TrustStore(format!("invalid trust anchor: {err}")))
        })
        .collect()
}

fn parse_pkcs12(bytes: &[u8], password: &str, path: &Path) -> Result<Vec<X509>> {
    let parsed = Pkcs12::from_der(bytes)
        .and_then(|p12| p12.parse2(password))
        .map_err(|err| {
            Error::TrustStore(format!(
                "cannot parse PKCS12 truststore {}: {err}",
                path.display()
            ))
        })?;

    let mut certs = Vec::new();
    if let Some(cert) = parsed.cert {
        certs.push(cert);
    }
    if let Some(ca) = parsed.ca {
        certs.extend(ca);
    }
    Ok(certs)
}

fn check_validity_period(cert: &X509) -> Result<()> {
    let now = Asn1Time::days_from_now(0)
        .map_err(|err| Error::TrustStore(format!("cannot compute current time: {err}")))?;

    let until_expiry = now
        .diff(cert.not_after())
        .map_err(|err| Error::TrustStore(format!("cannot read certificate validity: {err}")))?;
    if until_expiry.days < 0 || until_expiry.secs < 0 {
        return Err(Error::TrustStore(format!(
            "trust anchor expired on {}",
            cert.not_after()
        )));
    }

    let until_valid = now
        .diff(cert.not_before())
        .map_err(|err| Error::TrustStore(format!("cannot read certificate validity: {err}")))?;
    if until_valid.days > 0 || until_valid.secs > 0 {
        return Err(Error::TrustStore(format!(
            "trust anchor not valid before {}",
            cert.not_before()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_all_resolves_without_a_store() {
        let policy = TrustPolicy::new().with_trust_all(true);
        let strategy = TlsStrategy::resolve(&policy).unwrap();
        assert!(strategy.verify_hostname());
    }

    #[test]
    fn hostname_verification_flag_is_carried() {
        let policy = TrustPolicy::new()
            .with_trust_all(true)
            .with_verify_hostname(false);
        let strategy = TlsStrategy::resolve(&policy).unwrap();
        assert!(!strategy.verify_hostname());
    }

    #[test]
    fn absent_store_path_falls_back_to_platform_roots() {
        let policy = TrustPolicy::new().with_trust_all(false);
        assert!(TlsStrategy::resolve(&policy).is_ok());
    }

    #[test]
    fn missing_store_file_is_a_trust_store_error() {
        let policy = TrustPolicy::new()
            .with_trust_all(false)
            .with_store_path("/nonexistent/truststore.p12");
        let err = TlsStrategy::resolve(&policy).unwrap_err();
        assert!(matches!(err, Error::TrustStore(_)));
    }

    #[test]
    fn unsupported_format_is_rejected_before_any_read() {
        let policy = TrustPolicy::new()
            .with_trust_all(false)
            .with_store_path("/nonexistent/truststore.jks")
            .with_store_format("JKS");
        let err = TlsStrategy::resolve(&policy).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JKS"), "unexpected message: {message}");
    }

    #[test]
    fn store_path_prefixes_are_stripped() {
        assert_eq!(
            resolve_store_path("file:/etc/ssl/store.p12"),
            PathBuf::from("/etc/ssl/store.p12")
        );
        assert_eq!(
            resolve_store_path("classpath:store.p12"),
            PathBuf::from("store.p12")
        );
        assert_eq!(
            resolve_store_path("/etc/ssl/store.p12"),
            PathBuf::from("/etc/ssl/store.p12")
        );
    }
}

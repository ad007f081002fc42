//! Connection factory and transport session abstraction.
//!
//! The [`LdapConnector`]/[`LdapSession`] split keeps the executors testable:
//! the gateway talks to the traits, the real implementations wrap `ldap3`,
//! and tests substitute mocks.

use crate::modify::AttributeOperation;
use crate::search::SearchScope;
use crate::target::{DirectoryTarget, Scheme};
use crate::tls::TlsStrategy;
use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Mod, SearchEntry};
use ldapgw_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::debug;

/// A directory entry as the transport returns it, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute map (value order preserved from the server).
    pub attributes: HashMap<String, Vec<String>>,
}

/// Outcome of a directory write as reported by the server.
///
/// A non-zero `code` is a business-level rejection, reported to the caller
/// as a normal result; only transport and protocol faults become errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectoryResult {
    /// LDAP result code (0 is success).
    pub code: u32,
    /// Diagnostic text supplied by the server.
    pub message: String,
}

impl DirectoryResult {
    pub(crate) fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// One live, bound-or-bindable directory session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapSession: Send {
    /// Binds with the caller's credentials.
    async fn simple_bind(&mut self, principal: &str, secret: &str) -> Result<()>;
    /// Runs one search, returning all user attributes of each entry.
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> Result<Vec<RawEntry>>;
    /// Submits all operations as one atomic modify.
    async fn modify(
        &mut self,
        dn: &str,
        operations: &[AttributeOperation],
    ) -> Result<DirectoryResult>;
    /// Adds a new entry (LDIF `changetype: add`).
    async fn add(
        &mut self,
        dn: &str,
        attributes: &[(String, Vec<String>)],
    ) -> Result<DirectoryResult>;
    /// Deletes an entry (LDIF `changetype: delete`).
    async fn delete(&mut self, dn: &str) -> Result<DirectoryResult>;
    /// Renames an entry (LDIF `changetype: modrdn`).
    async fn modify_dn<'a>(
        &mut self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
        new_superior: Option<&'a str>,
    ) -> Result<DirectoryResult>;
    /// Releases the connection. Idempotent; never fails observably.
    async fn close(&mut self);
}

/// Opens one connection per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapConnector: Send + Sync {
    async fn connect(&self, target: &DirectoryTarget) -> Result<Box<dyn LdapSession>>;
}

/// Real connector backed by `ldap3`.
pub(crate) struct RealLdapConnector {
    tls: TlsStrategy,
    connect_timeout: Duration,
}

impl RealLdapConnector {
    pub(crate) fn new(tls: TlsStrategy, connect_timeout: Duration) -> Self {
        Self {
            tls,
            connect_timeout,
        }
    }
}

#[async_trait]
impl LdapConnector for RealLdapConnector {
    async fn connect(&self, target: &DirectoryTarget) -> Result<Box<dyn LdapSession>> {
        let mut settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);

        if target.scheme() == Scheme::Secure {
            settings = settings.set_connector(self.tls.connector().clone());
            if !self.tls.verify_hostname() {
                settings = settings.set_no_tls_verify(true);
            }
        }

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &target.as_url())
            .await
            .map_err(|err| Error::Connection(format!("{target}: {err}")))?;
        ldap3::drive!(conn);

        debug!(target = %target, "directory connection established");
        Ok(Box::new(RealLdapSession {
            inner: ldap,
            closed: false,
        }))
    }
}

struct RealLdapSession {
    inner: ldap3::Ldap,
    closed: bool,
}

impl RealLdapSession {
    fn directory_result(result: ldap3::LdapResult) -> DirectoryResult {
        DirectoryResult {
            code: result.rc,
            message: result.text,
        }
    }
}

#[async_trait]
impl LdapSession for RealLdapSession {
    async fn simple_bind(&mut self, principal: &str, secret: &str) -> Result<()> {
        let result = self
            .inner
            .simple_bind(principal, secret)
            .await
            .map_err(|err| Error::Connection(format!("bind transport failure: {err}")))?;
        if result.rc == 0 {
            Ok(())
        } else {
            // rc 49 is invalidCredentials; anything non-zero is a rejection.
            Err(Error::BindFailed(format!(
                "directory rejected bind for {principal} (code {}): {}",
                result.rc, result.text
            )))
        }
    }

    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> Result<Vec<RawEntry>> {
        let result = self
            .inner
            .search(base, scope.into(), filter, Vec::<&str>::new())
            .await
            .map_err(|err| Error::Search(err.to_string()))?;
        let (entries, _) = result
            .success()
            .map_err(|err| Error::Search(err.to_string()))?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| {
                let mut attributes = entry.attrs;
                // Binary attributes come back separately; carry them as
                // lossily-decoded strings so the entry stays complete.
                for (name, values) in entry.bin_attrs {
                    attributes.entry(name).or_default().extend(
                        values
                            .into_iter()
                            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
                    );
                }
                RawEntry {
                    dn: entry.dn,
                    attributes,
                }
            })
            .collect())
    }

    async fn modify(
        &mut self,
        dn: &str,
        operations: &[AttributeOperation],
    ) -> Result<DirectoryResult> {
        let mods = operations
            .iter()
            .map(|op| match op {
                AttributeOperation::Add { attribute, values } => Mod::Add(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                AttributeOperation::Delete { attribute, values } => Mod::Delete(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                AttributeOperation::Replace { attribute, values } => Mod::Replace(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
            })
            .collect::<Vec<_>>();

        let result = self
            .inner
            .modify(dn, mods)
            .await
            .map_err(|err| Error::Modify(err.to_string()))?;
        Ok(Self::directory_result(result))
    }

    async fn add(
        &mut self,
        dn: &str,
        attributes: &[(String, Vec<String>)],
    ) -> Result<DirectoryResult> {
        let attrs = attributes
            .iter()
            .map(|(name, values)| {
                (
                    name.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                )
            })
            .collect::<Vec<_>>();

        let result = self
            .inner
            .add(dn, attrs)
            .await
            .map_err(|err| Error::Modify(err.to_string()))?;
        Ok(Self::directory_result(result))
    }

    async fn delete(&mut self, dn: &str) -> Result<DirectoryResult> {
        let result = self
            .inner
            .delete(dn)
            .await
            .map_err(|err| Error::Modify(err.to_string()))?;
        Ok(Self::directory_result(result))
    }

    async fn modify_dn<'a>(
        &mut self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
        new_superior: Option<&'a str>,
    ) -> Result<DirectoryResult> {
        let result = self
            .inner
            .modifydn(dn, new_rdn, delete_old_rdn, new_superior)
            .await
            .map_err(|err| Error::Modify(err.to_string()))?;
        Ok(Self::directory_result(result))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.inner.unbind().await {
            debug!(error = %err, "directory unbind failed during close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_result_success_is_code_zero() {
        let ok = DirectoryResult {
            code: 0,
            message: String::new(),
        };
        let rejected = DirectoryResult {
            code: 19,
            message: "constraint violation".to_string(),
        };
        assert!(ok.is_success());
        assert!(!rejected.is_success());
    }
}

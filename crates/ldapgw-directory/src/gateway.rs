//! The gateway facade: one connection, one bind, one operation per call.

use crate::batch;
use crate::connection::{LdapConnector, LdapSession, RealLdapConnector};
use crate::entry::{DirectoryEntry, SearchOutcome};
use crate::ldif;
use crate::modify::{ModifyOutcome, ModifySpec};
use crate::search::SearchSpec;
use crate::target::DirectoryTarget;
use crate::tls::TlsStrategy;
use ldapgw_core::{BindCredentials, Error, Result, TrustPolicy};
use std::time::Duration;
use tracing::debug;

/// Executes directory operations on behalf of HTTP callers.
///
/// Every operation parses the caller-supplied target URI, opens one
/// connection, binds with the caller's own credentials, performs the
/// operation, and closes the connection on every exit path — success,
/// directory error, or fault. Nothing is pooled and nothing survives the
/// request.
pub struct DirectoryGateway {
    connector: Box<dyn LdapConnector>,
}

impl DirectoryGateway {
    /// Creates a gateway whose TLS trust strategy is resolved once from
    /// `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrustStore`] if the configured truststore cannot be
    /// loaded, so misconfiguration surfaces at startup rather than on the
    /// first `ldaps` request.
    pub fn new(policy: &TrustPolicy, connect_timeout: Duration) -> Result<Self> {
        let tls = TlsStrategy::resolve(policy)?;
        Ok(Self {
            connector: Box::new(RealLdapConnector::new(tls, connect_timeout)),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_connector(connector: Box<dyn LdapConnector>) -> Self {
        Self { connector }
    }

    /// Runs one search and returns the normalized entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`], [`Error::Connection`],
    /// [`Error::BindFailed`], or [`Error::Search`].
    pub async fn search(
        &self,
        spec: &SearchSpec,
        credentials: &BindCredentials,
    ) -> Result<SearchOutcome> {
        let entries = self.search_entries(spec, credentials).await?;
        Ok(SearchOutcome::new(entries))
    }

    /// Runs the identical search, rendered as LDIF text.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryGateway::search`].
    pub async fn search_to_ldif(
        &self,
        spec: &SearchSpec,
        credentials: &BindCredentials,
    ) -> Result<String> {
        let entries = self.search_entries(spec, credentials).await?;
        Ok(ldif::render_entries(&entries))
    }

    /// Applies all operations as one atomic directory modify.
    ///
    /// A directory-level rejection is reported as `success: false` in the
    /// outcome, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty operation list (before
    /// any network traffic), or [`Error::InvalidUri`], [`Error::Connection`],
    /// [`Error::BindFailed`], [`Error::Modify`] for faults.
    pub async fn modify(
        &self,
        spec: &ModifySpec,
        credentials: &BindCredentials,
    ) -> Result<ModifyOutcome> {
        if spec.operations.is_empty() {
            return Err(Error::Validation(
                "modifications cannot be empty".to_string(),
            ));
        }

        let target = DirectoryTarget::parse(&spec.uri)?;
        debug!(target = %target, dn = %spec.dn, "executing directory modify");

        let mut session = self.connector.connect(&target).await?;
        let result = run_modify(session.as_mut(), spec, credentials).await;
        session.close().await;
        result
    }

    /// Parses LDIF change records and applies them sequentially on one
    /// connection and one bind.
    ///
    /// Individual record failures are aggregated into the outcome and never
    /// abort the batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`], [`Error::Connection`],
    /// [`Error::BindFailed`], or [`Error::LdifParse`] (malformed content
    /// fails the whole call; the connection is still closed).
    pub async fn apply_ldif(
        &self,
        uri: &str,
        content: &str,
        credentials: &BindCredentials,
    ) -> Result<ModifyOutcome> {
        let target = DirectoryTarget::parse(uri)?;
        debug!(target = %target, "applying LDIF batch");

        let mut session = self.connector.connect(&target).await?;
        let result = run_ldif_batch(session.as_mut(), content, credentials).await;
        session.close().await;
        result
    }

    async fn search_entries(
        &self,
        spec: &SearchSpec,
        credentials: &BindCredentials,
    ) -> Result<Vec<DirectoryEntry>> {
        let target = DirectoryTarget::parse(&spec.uri)?;
        debug!(target = %target, base = %spec.base, filter = %spec.filter, "executing directory search");

        let mut session = self.connector.connect(&target).await?;
        let result = run_search(session.as_mut(), spec, credentials).await;
        session.close().await;
        result
    }
}

async fn run_search(
    session: &mut dyn LdapSession,
    spec: &SearchSpec,
    credentials: &BindCredentials,
) -> Result<Vec<DirectoryEntry>> {
    session
        .simple_bind(credentials.principal(), credentials.secret())
        .await?;
    let raw = session
        .search(&spec.base, spec.resolved_scope(), &spec.filter)
        .await?;
    Ok(raw
        .into_iter()
        .map(|entry| DirectoryEntry::from_raw(entry.dn, entry.attributes))
        .collect())
}

async fn run_modify(
    session: &mut dyn LdapSession,
    spec: &ModifySpec,
    credentials: &BindCredentials,
) -> Result<ModifyOutcome> {
    session
        .simple_bind(credentials.principal(), credentials.secret())
        .await?;
    let result = session.modify(&spec.dn, &spec.operations).await?;
    if result.is_success() {
        Ok(ModifyOutcome::succeeded(&spec.dn))
    } else {
        Ok(ModifyOutcome::rejected(&spec.dn, result.message))
    }
}

async fn run_ldif_batch(
    session: &mut dyn LdapSession,
    content: &str,
    credentials: &BindCredentials,
) -> Result<ModifyOutcome> {
    session
        .simple_bind(credentials.principal(), credentials.secret())
        .await?;
    let records = ldif::parse_change_records(content)?;
    Ok(batch::apply_records(session, &records).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{DirectoryResult, MockLdapConnector, MockLdapSession, RawEntry};
    use crate::modify::AttributeOperation;
    use crate::search::SearchScope;
    use std::collections::HashMap;

    fn credentials() -> BindCredentials {
        BindCredentials::new("uid=bob,ou=users,dc=example,dc=com", "secret")
    }

    fn gateway_with_session(session: MockLdapSession) -> DirectoryGateway {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(move |_| Ok(Box::new(session)));
        DirectoryGateway::with_connector(Box::new(connector))
    }

    fn success() -> DirectoryResult {
        DirectoryResult {
            code: 0,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn search_with_no_matches_yields_empty_outcome() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_search()
            .withf(|base, scope, filter| {
                base == "ou=users,dc=x" && *scope == SearchScope::Subtree && filter == "(uid=bob)"
            })
            .returning(|_, _, _| Ok(Vec::new()));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let spec = SearchSpec::new("ldap://h:389")
            .with_base("ou=users,dc=x")
            .with_filter("(uid=bob)")
            .with_scope("sub");
        let outcome = gateway.search(&spec, &credentials()).await.unwrap();

        assert_eq!(outcome.count, 0);
        assert!(outcome.entries.is_empty());
    }

    #[tokio::test]
    async fn search_normalizes_entries() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session.expect_search().returning(|_, _, _| {
            Ok(vec![RawEntry {
                dn: "cn=John,dc=x".to_string(),
                attributes: HashMap::from([
                    ("cn".to_string(), vec!["John".to_string()]),
                    (
                        "objectClass".to_string(),
                        vec!["person".to_string(), "top".to_string()],
                    ),
                ]),
            }])
        });
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let outcome = gateway
            .search(&SearchSpec::new("ldap://h"), &credentials())
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["entries"][0]["attributes"]["cn"], "John");
        assert_eq!(
            json["entries"][0]["attributes"]["objectClass"],
            serde_json::json!(["person", "top"])
        );
    }

    #[tokio::test]
    async fn rejected_bind_closes_the_connection_exactly_once() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| {
            Err(Error::BindFailed("invalid credentials".to_string()))
        });
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let err = gateway
            .search(&SearchSpec::new("ldap://h"), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BindFailed(_)));
    }

    #[tokio::test]
    async fn search_fault_still_closes_the_connection() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_search()
            .returning(|_, _, _| Err(Error::Search("no such object".to_string())));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let err = gateway
            .search(&SearchSpec::new("ldap://h"), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Search(_)));
    }

    #[tokio::test]
    async fn invalid_uri_fails_before_any_connection() {
        let connector = MockLdapConnector::new(); // no expectations: connect must not happen
        let gateway = DirectoryGateway::with_connector(Box::new(connector));

        let err = gateway
            .search(&SearchSpec::new("not a uri"), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUri(_)));
    }

    #[tokio::test]
    async fn search_to_ldif_renders_entries() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session.expect_search().returning(|_, _, _| {
            Ok(vec![RawEntry {
                dn: "cn=John,dc=x".to_string(),
                attributes: HashMap::from([("cn".to_string(), vec!["John".to_string()])]),
            }])
        });
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let ldif = gateway
            .search_to_ldif(&SearchSpec::new("ldap://h"), &credentials())
            .await
            .unwrap();

        assert_eq!(ldif, "dn: cn=John,dc=x\ncn: John\n\n");
    }

    #[tokio::test]
    async fn modify_success_maps_to_fixed_message() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session
            .expect_modify()
            .withf(|dn, ops| dn == "cn=John,dc=x" && ops.len() == 1)
            .returning(|_, _| Ok(success()));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let spec = ModifySpec {
            uri: "ldap://h".to_string(),
            dn: "cn=John,dc=x".to_string(),
            operations: vec![AttributeOperation::Replace {
                attribute: "mail".to_string(),
                values: vec!["new@example.com".to_string()],
            }],
        };
        let outcome = gateway.modify(&spec, &credentials()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Modification successful");
        assert_eq!(outcome.dn, "cn=John,dc=x");
    }

    #[tokio::test]
    async fn modify_rejection_is_a_normal_outcome() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session.expect_modify().returning(|_, _| {
            Ok(DirectoryResult {
                code: 19,
                message: "constraint violation".to_string(),
            })
        });
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let spec = ModifySpec {
            uri: "ldap://h".to_string(),
            dn: "cn=John,dc=x".to_string(),
            operations: vec![AttributeOperation::Delete {
                attribute: "mail".to_string(),
                values: Vec::new(),
            }],
        };
        let outcome = gateway.modify(&spec, &credentials()).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "constraint violation");
    }

    #[tokio::test]
    async fn empty_operation_list_fails_before_any_connection() {
        let connector = MockLdapConnector::new();
        let gateway = DirectoryGateway::with_connector(Box::new(connector));

        let spec = ModifySpec {
            uri: "ldap://h".to_string(),
            dn: "cn=John,dc=x".to_string(),
            operations: Vec::new(),
        };
        let err = gateway.modify(&spec, &credentials()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn apply_ldif_binds_once_and_applies_records() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .times(1)
            .returning(|_, _| Ok(()));
        session
            .expect_modify()
            .times(2)
            .returning(|_, _| Ok(success()));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let content = "dn: cn=a,dc=x\nchangetype: modify\nreplace: mail\nmail: a@x\n-\n\n\
                       dn: cn=b,dc=x\nchangetype: modify\nreplace: mail\nmail: b@x\n-\n";
        let outcome = gateway
            .apply_ldif("ldap://h", content, &credentials())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "All modifications successful");
        assert_eq!(outcome.dn, "cn=b,dc=x");
    }

    #[tokio::test]
    async fn apply_ldif_with_empty_content_is_a_fixed_success() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let outcome = gateway
            .apply_ldif("ldap://h", "", &credentials())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "All modifications successful");
        assert_eq!(outcome.dn, "");
    }

    #[tokio::test]
    async fn malformed_ldif_fails_the_call_but_closes_the_connection() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| Ok(()));
        session.expect_close().times(1).returning(|| ());

        let gateway = gateway_with_session(session);
        let err = gateway
            .apply_ldif("ldap://h", "dn: cn=x,dc=x\nobjectClass: person\n", &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LdifParse(_)));
    }
}

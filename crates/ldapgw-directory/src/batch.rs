//! Sequential application of LDIF change records.

use crate::connection::{DirectoryResult, LdapSession};
use crate::ldif::ChangeRecord;
use crate::modify::ModifyOutcome;
use ldapgw_core::Result;

/// Fixed message when every record in a batch succeeds (also used for the
/// empty batch).
pub(crate) const BATCH_SUCCESS_MESSAGE: &str = "All modifications successful";

/// Applies parsed change records in order on one already-bound session.
///
/// A failing record never aborts the batch: a non-success directory result
/// is recorded as `Failed to modify {dn}: {diagnostic}; `, a raised fault as
/// `Error modifying {dn}: {error}; `, and processing continues with the next
/// record. The returned outcome carries the DN of the last record processed
/// (empty for a zero-record batch) and either the fixed success message or
/// the concatenated failure entries.
pub(crate) async fn apply_records(
    session: &mut dyn LdapSession,
    records: &[ChangeRecord],
) -> ModifyOutcome {
    let mut all_ok = true;
    let mut messages = String::new();
    let mut last_dn = String::new();

    for record in records {
        // Record the DN before attempting, so a failing record's DN is
        // still reported.
        last_dn = record.dn().to_string();

        match apply_record(session, record).await {
            Ok(result) if result.is_success() => {}
            Ok(result) => {
                all_ok = false;
                messages.push_str(&format!(
                    "Failed to modify {last_dn}: {}; ",
                    result.message
                ));
            }
            Err(err) => {
                all_ok = false;
                messages.push_str(&format!("Error modifying {last_dn}: {err}; "));
            }
        }
    }

    ModifyOutcome {
        success: all_ok,
        message: if all_ok {
            BATCH_SUCCESS_MESSAGE.to_string()
        } else {
            messages
        },
        dn: last_dn,
    }
}

async fn apply_record(
    session: &mut dyn LdapSession,
    record: &ChangeRecord,
) -> Result<DirectoryResult> {
    match record {
        ChangeRecord::Add { dn, attributes } => session.add(dn, attributes).await,
        ChangeRecord::Delete { dn } => session.delete(dn).await,
        ChangeRecord::Modify { dn, operations } => session.modify(dn, operations).await,
        ChangeRecord::ModifyDn {
            dn,
            new_rdn,
            delete_old_rdn,
            new_superior,
        } => {
            session
                .modify_dn(dn, new_rdn, *delete_old_rdn, new_superior.as_deref())
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{DirectoryResult, MockLdapSession};
    use crate::modify::AttributeOperation;

    fn modify_record(dn: &str) -> ChangeRecord {
        ChangeRecord::Modify {
            dn: dn.to_string(),
            operations: vec![AttributeOperation::Replace {
                attribute: "mail".to_string(),
                values: vec!["x@example.com".to_string()],
            }],
        }
    }

    fn success() -> DirectoryResult {
        DirectoryResult {
            code: 0,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn empty_batch_is_a_fixed_success() {
        let mut session = MockLdapSession::new();
        let outcome = apply_records(&mut session, &[]).await;

        assert!(outcome.success);
        assert_eq!(outcome.message, BATCH_SUCCESS_MESSAGE);
        assert_eq!(outcome.dn, "");
    }

    #[tokio::test]
    async fn all_records_succeeding_yields_the_fixed_message() {
        let mut session = MockLdapSession::new();
        session
            .expect_modify()
            .times(2)
            .returning(|_, _| Ok(success()));

        let records = vec![modify_record("cn=a,dc=x"), modify_record("cn=b,dc=x")];
        let outcome = apply_records(&mut session, &records).await;

        assert!(outcome.success);
        assert_eq!(outcome.message, BATCH_SUCCESS_MESSAGE);
        assert_eq!(outcome.dn, "cn=b,dc=x");
    }

    #[tokio::test]
    async fn failing_record_does_not_abort_the_batch() {
        let mut session = MockLdapSession::new();
        session.expect_modify().times(3).returning(|dn, _| {
            if dn == "cn=b,dc=x" {
                Ok(DirectoryResult {
                    code: 19,
                    message: "constraint violation".to_string(),
                })
            } else {
                Ok(success())
            }
        });

        let records = vec![
            modify_record("cn=a,dc=x"),
            modify_record("cn=b,dc=x"),
            modify_record("cn=c,dc=x"),
        ];
        let outcome = apply_records(&mut session, &records).await;

        assert!(!outcome.success);
        // The last record was still applied and its DN reported.
        assert_eq!(outcome.dn, "cn=c,dc=x");
        assert_eq!(
            outcome.message,
            "Failed to modify cn=b,dc=x: constraint violation; "
        );
    }

    #[tokio::test]
    async fn raised_fault_becomes_a_record_failure() {
        let mut session = MockLdapSession::new();
        session.expect_modify().times(2).returning(|dn, _| {
            if dn == "cn=a,dc=x" {
                Err(ldapgw_core::Error::Modify("connection reset".to_string()))
            } else {
                Ok(success())
            }
        });

        let records = vec![modify_record("cn=a,dc=x"), modify_record("cn=b,dc=x")];
        let outcome = apply_records(&mut session, &records).await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Error modifying cn=a,dc=x: LDAP modify failed: connection reset; "
        );
        assert_eq!(outcome.dn, "cn=b,dc=x");
    }

    #[tokio::test]
    async fn multiple_failures_are_concatenated() {
        let mut session = MockLdapSession::new();
        session.expect_modify().times(2).returning(|_, _| {
            Ok(DirectoryResult {
                code: 50,
                message: "insufficient access".to_string(),
            })
        });

        let records = vec![modify_record("cn=a,dc=x"), modify_record("cn=b,dc=x")];
        let outcome = apply_records(&mut session, &records).await;

        assert_eq!(
            outcome.message,
            "Failed to modify cn=a,dc=x: insufficient access; \
             Failed to modify cn=b,dc=x: insufficient access; "
        );
    }

    #[tokio::test]
    async fn dispatches_each_record_kind() {
        let mut session = MockLdapSession::new();
        session.expect_add().times(1).returning(|_, _| Ok(success()));
        session.expect_delete().times(1).returning(|_| Ok(success()));
        session
            .expect_modify_dn()
            .times(1)
            .returning(|_, _, _, _| Ok(success()));

        let records = vec![
            ChangeRecord::Add {
                dn: "cn=new,dc=x".to_string(),
                attributes: vec![("cn".to_string(), vec!["new".to_string()])],
            },
            ChangeRecord::Delete {
                dn: "cn=old,dc=x".to_string(),
            },
            ChangeRecord::ModifyDn {
                dn: "cn=move,dc=x".to_string(),
                new_rdn: "cn=moved".to_string(),
                delete_old_rdn: true,
                new_superior: None,
            },
        ];
        let outcome = apply_records(&mut session, &records).await;

        assert!(outcome.success);
        assert_eq!(outcome.dn, "cn=move,dc=x");
    }
}

//! LDIF change-record parsing and entry rendering.
//!
//! Implements the RFC 2849 subset the gateway needs: unfolded continuation
//! lines, comments, base64 values, and the `add`, `delete`, `modify`, and
//! `modrdn`/`moddn` change types. Content records without a `changetype`
//! line are rejected, as are URL value references.

use crate::entry::DirectoryEntry;
use crate::modify::AttributeOperation;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ldapgw_core::{Error, Result};

/// One parsed LDIF change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord {
    /// `changetype: add` — create an entry with the given attributes.
    Add {
        /// Distinguished name of the new entry.
        dn: String,
        /// Attributes in first-seen order, values in record order.
        attributes: Vec<(String, Vec<String>)>,
    },
    /// `changetype: delete` — remove the entry.
    Delete {
        /// Distinguished name of the entry to remove.
        dn: String,
    },
    /// `changetype: modify` — apply attribute operations to the entry.
    Modify {
        /// Distinguished name of the entry to modify.
        dn: String,
        /// Operations in record order.
        operations: Vec<AttributeOperation>,
    },
    /// `changetype: modrdn` / `moddn` — rename the entry.
    ModifyDn {
        /// Distinguished name of the entry to rename.
        dn: String,
        /// The new relative distinguished name.
        new_rdn: String,
        /// Whether the old RDN attribute value is removed.
        delete_old_rdn: bool,
        /// Optional new parent DN.
        new_superior: Option<String>,
    },
}

impl ChangeRecord {
    /// The distinguished name this record applies to.
    #[must_use]
    pub fn dn(&self) -> &str {
        match self {
            Self::Add { dn, .. }
            | Self::Delete { dn }
            | Self::Modify { dn, .. }
            | Self::ModifyDn { dn, .. } => dn,
        }
    }
}

/// Parses LDIF content into a sequence of change records.
///
/// Content consisting only of whitespace and comments yields an empty
/// sequence. Any syntax error fails the whole call; nothing is partially
/// parsed.
///
/// # Errors
///
/// Returns [`Error::LdifParse`] for malformed content, including records
/// without a `changetype` line.
pub fn parse_change_records(content: &str) -> Result<Vec<ChangeRecord>> {
    let logical = unfold(content)?;
    let mut records: Vec<&[String]> = Vec::new();
    let mut start = 0;
    for (idx, line) in logical.iter().enumerate() {
        if line.is_empty() {
            if idx > start {
                records.push(&logical[start..idx]);
            }
            start = idx + 1;
        }
    }
    if logical.len() > start {
        records.push(&logical[start..]);
    }

    let mut parsed = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        // An optional `version:` line may precede the first record.
        let record = if idx == 0 {
            strip_version_line(record)
        } else {
            record
        };
        if record.is_empty() {
            continue;
        }
        parsed.push(parse_record(record)?);
    }
    Ok(parsed)
}

/// Renders normalized entries as LDIF text.
///
/// Each entry emits a `dn:` line, one line per attribute value in directory
/// order, and a trailing blank line.
#[must_use]
pub fn render_entries(entries: &[DirectoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str("dn: ");
        out.push_str(&entry.dn);
        out.push('\n');
        for (name, value) in &entry.attributes {
            for single in value.values() {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(single);
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

/// Unfolds physical lines into logical lines.
///
/// Continuation lines (leading space) are appended to the preceding logical
/// line; comment lines and their continuations are dropped; blank lines
/// survive as empty strings to mark record boundaries.
fn unfold(content: &str) -> Result<Vec<String>> {
    let mut logical: Vec<String> = Vec::new();
    let mut last_was_comment = false;

    for raw in content.lines() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(rest) = line.strip_prefix(' ') {
            if last_was_comment {
                continue;
            }
            match logical.last_mut() {
                Some(prev) if !prev.is_empty() => prev.push_str(rest),
                _ => {
                    return Err(Error::LdifParse(format!(
                        "continuation line with nothing to continue: `{line}`"
                    )))
                }
            }
            continue;
        }

        if line.starts_with('#') {
            last_was_comment = true;
            continue;
        }
        last_was_comment = false;

        if line.trim().is_empty() {
            logical.push(String::new());
        } else {
            logical.push(line.to_string());
        }
    }

    Ok(logical)
}

fn strip_version_line(record: &[String]) -> &[String] {
    match record.first().and_then(|line| split_attr_line(line)) {
        Some((name, _)) if name.eq_ignore_ascii_case("version") => &record[1..],
        _ => record,
    }
}

/// Splits `name: value` without decoding; returns None when no colon exists.
fn split_attr_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
}

/// Parses one `name: value` line, decoding base64 (`::`) values.
fn parse_attr_line(line: &str) -> Result<(String, String)> {
    let (name, rest) = split_attr_line(line)
        .ok_or_else(|| Error::LdifParse(format!("expected `name: value`, got `{line}`")))?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::LdifParse(format!("missing attribute name: `{line}`")));
    }

    let value = if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = BASE64.decode(encoded.trim()).map_err(|err| {
            Error::LdifParse(format!("invalid base64 value for `{name}`: {err}"))
        })?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else if rest.starts_with('<') {
        return Err(Error::LdifParse(format!(
            "URL value references are not supported: `{line}`"
        )));
    } else {
        rest.strip_prefix(' ').unwrap_or(rest).to_string()
    };

    Ok((name, value))
}

fn parse_record(lines: &[String]) -> Result<ChangeRecord> {
    let (first_name, dn) = parse_attr_line(&lines[0])?;
    if !first_name.eq_ignore_ascii_case("dn") {
        return Err(Error::LdifParse(format!(
            "record must start with a dn line, got `{}`",
            lines[0]
        )));
    }

    let Some(changetype_line) = lines.get(1) else {
        return Err(Error::LdifParse(format!(
            "record for `{dn}` has no changetype line"
        )));
    };
    let (name, changetype) = parse_attr_line(changetype_line)?;
    if !name.eq_ignore_ascii_case("changetype") {
        return Err(Error::LdifParse(format!(
            "record for `{dn}` has no changetype line (got `{changetype_line}`)"
        )));
    }

    let body = &lines[2..];
    match changetype.to_ascii_lowercase().as_str() {
        "add" => parse_add(dn, body),
        "delete" => parse_delete(dn, body),
        "modify" => parse_modify(dn, body),
        "modrdn" | "moddn" => parse_modify_dn(dn, body),
        other => Err(Error::LdifParse(format!(
            "unsupported changetype `{other}` for `{dn}`"
        ))),
    }
}

fn parse_add(dn: String, body: &[String]) -> Result<ChangeRecord> {
    if body.is_empty() {
        return Err(Error::LdifParse(format!(
            "add record for `{dn}` has no attributes"
        )));
    }

    let mut attributes: Vec<(String, Vec<String>)> = Vec::new();
    for line in body {
        let (name, value) = parse_attr_line(line)?;
        match attributes
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, values)) => values.push(value),
            None => attributes.push((name, vec![value])),
        }
    }
    Ok(ChangeRecord::Add { dn, attributes })
}

fn parse_delete(dn: String, body: &[String]) -> Result<ChangeRecord> {
    if let Some(extra) = body.first() {
        return Err(Error::LdifParse(format!(
            "unexpected line after delete record for `{dn}`: `{extra}`"
        )));
    }
    Ok(ChangeRecord::Delete { dn })
}

fn parse_modify(dn: String, body: &[String]) -> Result<ChangeRecord> {
    let mut operations = Vec::new();
    let mut idx = 0;

    while idx < body.len() {
        if body[idx] == "-" {
            idx += 1;
            continue;
        }

        let (kind, attribute) = parse_attr_line(&body[idx])?;
        let kind = kind.to_ascii_lowercase();
        if !matches!(kind.as_str(), "add" | "delete" | "replace") {
            return Err(Error::LdifParse(format!(
                "unknown modify section `{kind}` for `{dn}`"
            )));
        }
        idx += 1;

        let mut values = Vec::new();
        while idx < body.len() && body[idx] != "-" {
            let (name, value) = parse_attr_line(&body[idx])?;
            if !name.eq_ignore_ascii_case(&attribute) {
                return Err(Error::LdifParse(format!(
                    "modify section for `{attribute}` contains value line for `{name}`"
                )));
            }
            values.push(value);
            idx += 1;
        }
        // The "-" terminator is optional on the final section.
        if idx < body.len() {
            idx += 1;
        }

        let operation = match kind.as_str() {
            "add" => AttributeOperation::Add { attribute, values },
            "delete" => AttributeOperation::Delete { attribute, values },
            _ => AttributeOperation::Replace { attribute, values },
        };
        operations.push(operation);
    }

    if operations.is_empty() {
        return Err(Error::LdifParse(format!(
            "modify record for `{dn}` has no operations"
        )));
    }
    Ok(ChangeRecord::Modify { dn, operations })
}

fn parse_modify_dn(dn: String, body: &[String]) -> Result<ChangeRecord> {
    let mut new_rdn = None;
    let mut delete_old_rdn = None;
    let mut new_superior = None;

    for line in body {
        let (name, value) = parse_attr_line(line)?;
        match name.to_ascii_lowercase().as_str() {
            "newrdn" => new_rdn = Some(value),
            "deleteoldrdn" => {
                delete_old_rdn = Some(match value.as_str() {
                    "1" => true,
                    "0" => false,
                    other => {
                        return Err(Error::LdifParse(format!(
                            "deleteoldrdn must be 0 or 1, got `{other}`"
                        )))
                    }
                });
            }
            "newsuperior" => new_superior = Some(value),
            other => {
                return Err(Error::LdifParse(format!(
                    "unexpected line `{other}` in modrdn record for `{dn}`"
                )))
            }
        }
    }

    let new_rdn = new_rdn
        .ok_or_else(|| Error::LdifParse(format!("modrdn record for `{dn}` has no newrdn")))?;
    let delete_old_rdn = delete_old_rdn.ok_or_else(|| {
        Error::LdifParse(format!("modrdn record for `{dn}` has no deleteoldrdn"))
    })?;

    Ok(ChangeRecord::ModifyDn {
        dn,
        new_rdn,
        delete_old_rdn,
        new_superior,
    })
}

//! Basic-credential extraction.
//!
//! The gateway performs no credential validation of its own: the decoded
//! `username:password` pair is passed through unmodified as the LDAP bind
//! identity, and the target directory is the authority.

use crate::error::WebError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ldapgw_core::{BindCredentials, Error};

/// Extractor that rejects the request with 401 unless a decodable
/// `Authorization: Basic` header is present.
pub struct RequireBindCredentials(pub BindCredentials);

impl<S> FromRequestParts<S> for RequireBindCredentials
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(decode_basic)
            .map(Self)
            .ok_or_else(|| {
                WebError::from(Error::BindFailed(
                    "unable to extract credentials from request; \
                     HTTP Basic authorization is required"
                        .to_string(),
                ))
            })
    }
}

/// Decodes a `Basic <base64>` header value into bind credentials.
///
/// Returns `None` for a non-Basic scheme, undecodable payload, missing
/// colon separator, or an empty username or password.
fn decode_basic(header: &str) -> Option<BindCredentials> {
    let (scheme, payload) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(payload.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (principal, secret) = decoded.split_once(':')?;
    if principal.is_empty() || secret.is_empty() {
        return None;
    }
    Some(BindCredentials::new(principal, secret))
}

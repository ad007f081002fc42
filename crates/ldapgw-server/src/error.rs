//! HTTP rendering of gateway errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ldapgw_core::Error;
use tracing::{debug, error};

/// Wraps the core error type so it can be returned from handlers.
///
/// The response body is the structured error payload
/// (`{error, message, code, details}`); the HTTP status comes from the
/// error kind's mapping.
#[derive(Debug)]
pub struct WebError(Error);

impl WebError {
    /// The wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &Error {
        &self.0
    }
}

impl From<Error> for WebError {
    fn from(inner: Error) -> Self {
        Self(inner)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.0.should_log() {
            error!(error = %self.0, "request failed");
        } else {
            debug!(error = %self.0, "request rejected");
        }

        let payload = self.0.into_error_response();
        let status =
            StatusCode::from_u16(payload.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(payload)).into_response()
    }
}

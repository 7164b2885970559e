//! HTTP surface of the library knowledge base.
//!
//! Every handler returns [`crate::Result`]. Failures are turned into a JSON
//! body with an `error` reason and a human `description`:
//!
//! ```json
//! {"error": "not_found", "description": "individual `Libro9` not found"}
//! ```

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub use self::routes::{AppRoutes, ListRoutes, Routes};
use crate::{errors::Error, Result};

pub mod catalog;
pub mod format;
pub mod i18n;
pub mod individuals;
pub mod monitoring;
mod routes;
pub mod search;
pub mod sparql;

/// Rejects the request with a 400 and `msg` as description.
///
/// # Errors
///
/// This function will always return an `Err` variant.
pub fn bad_request<T: Into<String>, U>(msg: T) -> Result<U> {
    Err(Error::BadRequest(msg.into()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Structure representing details about an error.
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorDetail {
    /// Create a new `ErrorDetail` with the specified error and description.
    #[must_use]
    pub fn new<T: Into<String> + AsRef<str>>(error: T, description: T) -> Self {
        let description = (!description.as_ref().is_empty()).then(|| description.into());
        Self {
            error: Some(error.into()),
            description,
        }
    }
}

fn reason(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        _ => "internal_server_error",
    }
}

impl IntoResponse for Error {
    /// Convert an `Error` into an HTTP response.
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            err if status.is_server_error() => {
                tracing::error!(
                    error.msg = %err,
                    error.details = ?err,
                    "controller_error"
                );
            }
            err => {
                tracing::debug!(error.msg = %err, status = status.as_u16(), "request_rejected");
            }
        }

        let detail = match self {
            Self::JsonRejection(err) => {
                ErrorDetail::new(reason(status).to_string(), err.body_text())
            }
            err => ErrorDetail::new(reason(status).to_string(), err.to_string()),
        };

        (status, axum::Json(detail)).into_response()
    }
}

/// JSON extractor that reports malformed bodies through [`Error`], so they
/// get the same `{error, description}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

//! Response helpers shared by the controllers.
//!
//! ```rust
//! use biblioteca::{controller::format, Result};
//! use axum::response::Response;
//!
//! async fn banner() -> Result<Response> {
//!     format::json(serde_json::json!({"mensaje": "hola"}))
//! }
//! ```

use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::{controller::Json, Result};

/// Returns a JSON response.
///
/// # Errors
///
/// Never fails today; handlers return it directly as their `Result`.
pub fn json<T: Serialize>(t: T) -> Result<Response> {
    Ok(Json(t).into_response())
}

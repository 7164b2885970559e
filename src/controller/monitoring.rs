//! Liveness and readiness checks. Readiness also proves the ontology store
//! can still be serialized and read back.

use axum::{extract::State, response::Response, routing::get};
use serde::Serialize;

use super::{format, routes::Routes};
use crate::{app::AppContext, ontology::OntologySnapshot, Result};

/// Represents the health status of the application.
#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

/// Check application ping endpoint
///
/// # Errors
/// This function always returns `Ok` with a JSON response indicating the
/// service is up.
pub async fn ping() -> Result<Response> {
    format::json(Health { ok: true })
}

/// Check application health endpoint
///
/// # Errors
/// This function always returns `Ok` with a JSON response indicating the
/// service is up.
pub async fn health() -> Result<Response> {
    format::json(Health { ok: true })
}

/// Check the readiness of the application by serializing the store and
/// parsing it back, which exercises the same path as persistence and
/// SPARQL queries.
///
/// # Errors
/// All errors are logged, and the readiness status is returned as a JSON response.
pub async fn readiness(State(ctx): State<AppContext>) -> Result<Response> {
    let mut is_ok: bool = true;

    let (snapshot, base) = {
        let ontology = ctx.ontology.read().await;
        (OntologySnapshot::from(&*ontology), ontology.id().clone())
    };
    if let Err(error) = snapshot.restore(&base) {
        tracing::error!(err.msg = %error, err.detail = ?error, "readiness_snapshot_error");
        is_ok = false;
    }

    format::json(Health { ok: is_ok })
}

/// Defines and returns the readiness-related routes.
pub fn routes() -> Routes {
    Routes::new()
        .add("/_readiness", get(readiness))
        .add("/_ping", get(ping))
        .add("/_health", get(health))
}

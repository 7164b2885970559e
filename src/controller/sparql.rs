use axum::{extract::State, response::Response, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    app::AppContext,
    controller::{format, Json, Routes},
    ontology::SparqlResults,
    Result,
};

#[derive(Debug, Deserialize)]
pub struct SparqlQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SparqlResponse {
    pub variables: Vec<String>,
    pub resultados: Vec<Vec<JsonValue>>,
}

impl From<SparqlResults> for SparqlResponse {
    fn from(results: SparqlResults) -> Self {
        Self {
            variables: results.variables,
            resultados: results.rows,
        }
    }
}

/// `POST /consultar/sparql`: runs an arbitrary query over the whole store.
pub async fn query(
    State(ctx): State<AppContext>,
    Json(params): Json<SparqlQuery>,
) -> Result<Response> {
    let results = ctx.ontology.sparql(&params.query).await?;
    tracing::debug!(rows = results.rows.len(), "sparql query evaluated");
    format::json(SparqlResponse::from(results))
}

pub fn routes() -> Routes {
    Routes::new().add("/consultar/sparql", post(query))
}

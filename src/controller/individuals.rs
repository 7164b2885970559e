//! Creation, mutation and lookup of individuals.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    app::AppContext,
    controller::{format, Json, Routes},
    ontology::{IndividualView, LanguageTag},
    Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct NewIndividual {
    pub name: String,
    pub class_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DataAssignment {
    pub individual: String,
    pub property: String,
    pub value: JsonValue,
    /// Language of the value when assigning a label.
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewRelation {
    pub subject: String,
    pub property: String,
    pub object: String,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub mensaje: String,
}

impl Message {
    fn new(mensaje: String) -> Self {
        Self { mensaje }
    }
}

/// Individual as returned by the lookup endpoint.
#[derive(Debug, Serialize)]
pub struct IndividualResponse {
    pub nombre: String,
    pub clase: String,
    pub datos: std::collections::BTreeMap<String, Vec<String>>,
    pub relaciones: std::collections::BTreeMap<String, Vec<String>>,
}

impl From<IndividualView> for IndividualResponse {
    fn from(view: IndividualView) -> Self {
        Self {
            nombre: view.id,
            clase: view.class,
            datos: view.data,
            relaciones: view.relations,
        }
    }
}

/// Renders a request value the way it reads in the confirmation message.
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `POST /individuos`
pub async fn create(
    State(ctx): State<AppContext>,
    Json(params): Json<NewIndividual>,
) -> Result<Response> {
    ctx.ontology
        .create_individual(&params.name, &params.class_name)
        .await?;
    tracing::info!(individual = %params.name, class = %params.class_name, "individual created");
    format::json(Message::new(format!(
        "Creado '{}' de tipo '{}'",
        params.name, params.class_name
    )))
}

/// `POST /individuos/datos`
pub async fn assign_data(
    State(ctx): State<AppContext>,
    Json(params): Json<DataAssignment>,
) -> Result<Response> {
    let lang = match params.lang.as_deref() {
        Some(code) => LanguageTag::new(code)
            .map_err(|err| Error::BadRequest(format!("invalid lang: {err}")))?,
        None => ctx.languages.default_language().clone(),
    };
    ctx.ontology
        .assign_data(&params.individual, &params.property, &params.value, &lang)
        .await?;
    tracing::info!(
        individual = %params.individual,
        property = %params.property,
        "data value assigned"
    );
    format::json(Message::new(format!(
        "Actualizado {}: {} = {}",
        params.individual,
        params.property,
        display_value(&params.value)
    )))
}

/// `POST /individuos/relacion`
pub async fn relate(
    State(ctx): State<AppContext>,
    Json(params): Json<NewRelation>,
) -> Result<Response> {
    ctx.ontology
        .relate(&params.subject, &params.property, &params.object)
        .await?;
    tracing::info!(
        subject = %params.subject,
        property = %params.property,
        object = %params.object,
        "relation created"
    );
    format::json(Message::new(format!(
        "Relación creada: {} --[{}]--> {}",
        params.subject, params.property, params.object
    )))
}

/// `GET /individuos/{name}`
pub async fn show(State(ctx): State<AppContext>, Path(name): Path<String>) -> Result<Response> {
    let view = ctx.ontology.describe(&name).await?;
    format::json(IndividualResponse::from(view))
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("individuos")
        .add("/", post(create))
        .add("/datos", post(assign_data))
        .add("/relacion", post(relate))
        .add("/{name}", get(show))
}

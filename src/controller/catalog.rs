//! Service banner and the per-class listings.

use axum::{extract::State, response::Response, routing::get};
use serde::Serialize;

use crate::{
    app::AppContext,
    config::OntologyBackend,
    controller::{format, Routes},
    ontology::IndividualView,
    Result,
};

#[derive(Debug, Serialize)]
pub struct Banner {
    pub mensaje: String,
    pub archivo: String,
}

/// One entry of a class listing.
#[derive(Debug, Serialize)]
pub struct InstanceResponse {
    pub id: String,
    pub tipo: String,
    pub datos: std::collections::BTreeMap<String, Vec<String>>,
    pub relaciones: std::collections::BTreeMap<String, Vec<String>>,
}

impl From<IndividualView> for InstanceResponse {
    fn from(view: IndividualView) -> Self {
        Self {
            id: view.id,
            tipo: view.class,
            datos: view.data,
            relaciones: view.relations,
        }
    }
}

/// `GET /`
pub async fn banner(State(ctx): State<AppContext>) -> Result<Response> {
    let archivo = match ctx.config.ontology.backend {
        OntologyBackend::File => ctx.config.ontology.path.display().to_string(),
        OntologyBackend::InMemory => ctx.ontology.repository().location(),
    };
    format::json(Banner {
        mensaje: "API de Ontología de Biblioteca funcionando".to_string(),
        archivo,
    })
}

async fn list(ctx: &AppContext, class_name: &str) -> Result<Response> {
    let instances: Vec<InstanceResponse> = ctx
        .ontology
        .instances_of(class_name)
        .await
        .into_iter()
        .map(InstanceResponse::from)
        .collect();
    format::json(instances)
}

pub async fn books(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Libro").await
}

pub async fn magazines(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Revista").await
}

/// Students and teachers included.
pub async fn users(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Usuario").await
}

pub async fn students(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Estudiante").await
}

pub async fn teachers(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Docente").await
}

pub async fn librarians(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Bibliotecario").await
}

pub async fn publishers(State(ctx): State<AppContext>) -> Result<Response> {
    list(&ctx, "Editorial").await
}

pub fn routes() -> Routes {
    Routes::new()
        .add("/", get(banner))
        .add("/libros", get(books))
        .add("/revistas", get(magazines))
        .add("/usuarios", get(users))
        .add("/estudiantes", get(students))
        .add("/docentes", get(teachers))
        .add("/bibliotecarios", get(librarians))
        .add("/editoriales", get(publishers))
}

use std::sync::Arc;

use axum::http::StatusCode;
use biblioteca::ontology::InMemoryOntologyRepository;
use insta::assert_json_snapshot;
use serde_json::{json, Value};

use super::{context_with_repository, server, server_for};

#[tokio::test]
async fn create_then_fetch() {
    let server = server().await;

    let response = server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Libro"}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"mensaje": "Creado 'Libro1' de tipo 'Libro'"}));

    let response = server.get("/individuos/Libro1").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "nombre": "Libro1",
        "clase": "Libro",
        "datos": {},
        "relaciones": {}
    }));
}

#[tokio::test]
async fn unknown_class_is_not_found() {
    let server = server().await;
    let response = server
        .post("/individuos")
        .json(&json!({"name": "Nave1", "class_name": "Nave"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({
        "error": "not_found",
        "description": "class `Nave` not found"
    }));
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let server = server().await;
    let body = json!({"name": "Libro1", "class_name": "Libro"});
    server.post("/individuos").json(&body).await.assert_status_ok();

    let response = server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Revista"}))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let fetched: Value = server.get("/individuos/Libro1").await.json();
    assert_eq!(fetched["clase"], "Libro");
}

#[tokio::test]
async fn schema_names_are_not_available() {
    let repository = Arc::new(InMemoryOntologyRepository::default());
    let server = server_for(context_with_repository(repository.clone()).await);

    for name in ["Libro", "titulo"] {
        let response = server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": "Persona"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({
            "error": "conflict",
            "description": format!("`{name}` already names a class or property")
        }));
    }
    assert_eq!(repository.saves(), 1);

    let body: Vec<Value> = server.get("/libros").await.json();
    assert!(body.is_empty());
}

#[tokio::test]
async fn invalid_names_are_rejected() {
    let server = server().await;
    let response = server
        .post("/individuos")
        .json(&json!({"name": "Cien años", "class_name": "Libro"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_bodies_are_rejected() {
    let server = server().await;
    let response = server
        .post("/individuos")
        .json(&json!({"name": "Libro1"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn multi_valued_properties_append() {
    let server = server().await;
    server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Libro"}))
        .await
        .assert_status_ok();

    for title in ["Rayuela", "Hopscotch"] {
        let response = server
            .post("/individuos/datos")
            .json(&json!({"individual": "Libro1", "property": "titulo", "value": title}))
            .await;
        response.assert_status_ok();
    }

    let body: Value = server.get("/individuos/Libro1").await.json();
    assert_eq!(body["datos"]["titulo"], json!(["Rayuela", "Hopscotch"]));
}

#[tokio::test]
async fn single_valued_properties_overwrite() {
    let server = server().await;
    server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Libro"}))
        .await
        .assert_status_ok();

    for state in ["Disponible", "Prestado"] {
        server
            .post("/individuos/datos")
            .json(&json!({"individual": "Libro1", "property": "estado_libro", "value": state}))
            .await
            .assert_status_ok();
    }

    let body: Value = server.get("/individuos/Libro1").await.json();
    assert_eq!(body["datos"]["estado_libro"], json!(["Prestado"]));
}

#[tokio::test]
async fn type_mismatches_are_server_errors() {
    let server = server().await;
    for (name, class) in [("Libro1", "Libro"), ("Autor1", "Persona")] {
        server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": class}))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/individuos/datos")
        .json(&json!({"individual": "Libro1", "property": "anio_publicacion", "value": "pronto"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["description"]
        .as_str()
        .unwrap()
        .contains("anio_publicacion"));

    let response = server
        .post("/individuos/datos")
        .json(&json!({"individual": "Autor1", "property": "escribe", "value": "Libro1"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = server
        .post("/individuos/relacion")
        .json(&json!({"subject": "Autor1", "property": "titulo", "object": "Libro1"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let server = server().await;
    server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Libro"}))
        .await
        .assert_status_ok();

    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Libro9", "property": "titulo", "value": "x"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Libro1", "property": "subtitulo", "value": "x"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/individuos/relacion")
        .json(&json!({"subject": "Libro1", "property": "escribe", "object": "Nadie"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/individuos/Nadie")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_individual_view() {
    let server = server().await;
    for (name, class) in [("Rayuela", "Libro"), ("Cortazar", "Persona")] {
        server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": class}))
            .await
            .assert_status_ok();
    }
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Rayuela", "property": "titulo", "value": "Rayuela"}))
        .await
        .assert_status_ok();
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Rayuela", "property": "anio_publicacion", "value": 1963}))
        .await
        .assert_status_ok();
    let response = server
        .post("/individuos/relacion")
        .json(&json!({"subject": "Rayuela", "property": "escribe", "object": "Cortazar"}))
        .await;
    response.assert_json(&json!({
        "mensaje": "Relación creada: Rayuela --[escribe]--> Cortazar"
    }));

    let body: Value = server.get("/individuos/Rayuela").await.json();
    assert_json_snapshot!(body, @r#"
    {
      "clase": "Libro",
      "datos": {
        "anio_publicacion": [
          "1963"
        ],
        "titulo": [
          "Rayuela"
        ]
      },
      "nombre": "Rayuela",
      "relaciones": {
        "escribe": [
          "Cortazar"
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn labels_are_reserved_and_language_tagged() {
    let server = server().await;
    server
        .post("/individuos")
        .json(&json!({"name": "Docente1", "class_name": "Docente"}))
        .await
        .assert_status_ok();
    server
        .post("/individuos/datos")
        .json(&json!({
            "individual": "Docente1",
            "property": "label",
            "value": "History teacher",
            "lang": "en"
        }))
        .await
        .assert_status_ok();

    let body: Value = server
        .get("/buscador")
        .add_query_param("q", "history")
        .await
        .json();
    assert_eq!(body["cantidad"], 1);
    assert_eq!(
        body["resultados"][0]["descripcion"],
        "Coincidencia en etiqueta: History teacher"
    );
}

#[tokio::test]
async fn every_mutation_is_persisted() {
    let repository = Arc::new(InMemoryOntologyRepository::default());
    let server = server_for(context_with_repository(repository.clone()).await);
    assert_eq!(repository.saves(), 1);

    server
        .post("/individuos")
        .json(&json!({"name": "Libro1", "class_name": "Libro"}))
        .await
        .assert_status_ok();
    server
        .post("/individuos")
        .json(&json!({"name": "Estudiante1", "class_name": "Estudiante"}))
        .await
        .assert_status_ok();
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Libro1", "property": "titulo", "value": "Rayuela"}))
        .await
        .assert_status_ok();
    server
        .post("/individuos/relacion")
        .json(&json!({"subject": "Estudiante1", "property": "toma_prestado", "object": "Libro1"}))
        .await
        .assert_status_ok();
    assert_eq!(repository.saves(), 5);

    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Libro1", "property": "subtitulo", "value": "x"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server.get("/individuos/Libro1").await.assert_status_ok();
    assert_eq!(repository.saves(), 5);

    let document = repository.document().expect("saved document");
    assert!(document.contains(
        "<http://uni.edu/biblioteca.owl#Estudiante1> \
         <http://uni.edu/biblioteca.owl#toma_prestado> \
         <http://uni.edu/biblioteca.owl#Libro1> ."
    ));
}

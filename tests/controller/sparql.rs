use axum::http::StatusCode;
use serde_json::{json, Value};

use super::server;

#[tokio::test]
async fn select_over_created_individuals() {
    let server = server().await;
    for name in ["Libro2", "Libro1"] {
        server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": "Libro"}))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/consultar/sparql")
        .json(&json!({
            "query": "SELECT ?s WHERE { ?s a <http://uni.edu/biblioteca.owl#Libro> } ORDER BY ?s"
        }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "variables": ["s"],
        "resultados": [
            ["http://uni.edu/biblioteca.owl#Libro1"],
            ["http://uni.edu/biblioteca.owl#Libro2"]
        ]
    }));
}

#[tokio::test]
async fn queries_see_the_schema() {
    let server = server().await;
    let body: Value = server
        .post("/consultar/sparql")
        .json(&json!({
            "query": "SELECT ?c WHERE { ?c <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://uni.edu/biblioteca.owl#Usuario> } ORDER BY ?c"
        }))
        .await
        .json();
    assert_eq!(
        body["resultados"],
        json!([
            ["http://uni.edu/biblioteca.owl#Docente"],
            ["http://uni.edu/biblioteca.owl#Estudiante"]
        ])
    );
}

#[tokio::test]
async fn malformed_queries_are_bad_requests() {
    let server = server().await;
    let response = server
        .post("/consultar/sparql")
        .json(&json!({"query": "SELEC ?s WHERE"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Bad Request");
}

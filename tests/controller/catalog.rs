use biblioteca::TestServer;
use rstest::rstest;
use serde_json::{json, Value};

use super::server;

async fn seeded() -> TestServer {
    let server = server().await;
    for (name, class) in [
        ("Libro1", "Libro"),
        ("Revista1", "Revista"),
        ("Estudiante1", "Estudiante"),
        ("Docente1", "Docente"),
        ("Bibliotecario1", "Bibliotecario"),
        ("Editorial1", "Editorial"),
    ] {
        server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": class}))
            .await
            .assert_status_ok();
    }
    server
}

#[tokio::test]
async fn banner_names_the_store() {
    let server = server().await;
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "mensaje": "API de Ontología de Biblioteca funcionando",
        "archivo": "memory"
    }));
}

#[rstest]
#[case("/libros", &["Libro1"])]
#[case("/revistas", &["Revista1"])]
#[case("/usuarios", &["Docente1", "Estudiante1"])]
#[case("/estudiantes", &["Estudiante1"])]
#[case("/docentes", &["Docente1"])]
#[case("/bibliotecarios", &["Bibliotecario1"])]
#[case("/editoriales", &["Editorial1"])]
#[tokio::test]
async fn listings_include_subclass_instances(#[case] uri: &str, #[case] expected: &[&str]) {
    let server = seeded().await;
    let response = server.get(uri).await;
    response.assert_status_ok();

    let body: Vec<Value> = response.json();
    let ids: Vec<&str> = body.iter().filter_map(|item| item["id"].as_str()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn listing_entries_carry_type_and_values() {
    let server = seeded().await;
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Estudiante1", "property": "carrera", "value": "Medicina"}))
        .await
        .assert_status_ok();

    let body: Vec<Value> = server.get("/usuarios").await.json();
    assert_eq!(
        body[1],
        json!({
            "id": "Estudiante1",
            "tipo": "Estudiante",
            "datos": {"carrera": ["Medicina"]},
            "relaciones": {}
        })
    );
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let server = server().await;
    let body: Vec<Value> = server.get("/libros").await.json();
    assert!(body.is_empty());
}

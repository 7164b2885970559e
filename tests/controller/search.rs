use std::sync::Arc;

use axum::http::StatusCode;
use biblioteca::{
    search::{SearchHit, SearchOrigin},
    tests_cfg::{self, search::StubSearch},
    TestServer,
};
use rstest::rstest;
use serde_json::{json, Value};

use super::{server, server_for};

async fn seed(server: &TestServer) {
    for (name, class) in [("Rayuela", "Libro"), ("Estudiante1", "Estudiante")] {
        server
            .post("/individuos")
            .json(&json!({"name": name, "class_name": class}))
            .await
            .assert_status_ok();
    }
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Estudiante1", "property": "carrera", "value": "Literatura"}))
        .await
        .assert_status_ok();
}

fn remote_hit(id: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        kind: "Libro".to_string(),
        display_name: "Hopscotch".to_string(),
        description: "Resultado de DBpedia".to_string(),
        origin: SearchOrigin::Dbpedia,
        image: None,
    }
}

#[tokio::test]
async fn local_search_matches_ids_and_properties() {
    let server = server().await;
    seed(&server).await;

    let body: Value = server
        .get("/buscador")
        .add_query_param("q", "ra")
        .await
        .json();
    assert_eq!(body["cantidad"], 2);
    assert_eq!(body["resultados"][0]["id"], "Estudiante1");
    assert_eq!(
        body["resultados"][0]["descripcion"],
        "Coincidencia en carrera: Literatura"
    );
    assert_eq!(body["resultados"][1]["descripcion"], "Coincidencia en ID");
    assert!(body.get("aviso").is_none());
}

#[tokio::test]
async fn local_search_can_be_narrowed_to_a_class() {
    let server = server().await;
    seed(&server).await;

    let body: Value = server
        .get("/buscador")
        .add_query_param("q", "ra")
        .add_query_param("clase", "Libro")
        .await
        .json();
    assert_eq!(body["cantidad"], 1);
    assert_eq!(body["resultados"][0]["tipo"], "Libro");
}

#[tokio::test]
async fn title_matches_do_not_leak_into_other_classes() {
    let server = server().await;
    seed(&server).await;
    server
        .post("/individuos/datos")
        .json(&json!({"individual": "Rayuela", "property": "titulo", "value": "Hopscotch"}))
        .await
        .assert_status_ok();

    let body: Value = server
        .get("/buscador")
        .add_query_param("q", "hopscotch")
        .add_query_param("clase", "Estudiante")
        .await
        .json();
    assert_eq!(body["cantidad"], 0);

    let body: Value = server
        .get("/buscador")
        .add_query_param("q", "hopscotch")
        .await
        .json();
    assert_eq!(body["resultados"][0]["nombre_mostrar"], "Hopscotch");
}

#[rstest]
#[case("/buscador", "")]
#[case("/buscador/online", "r")]
#[tokio::test]
async fn short_queries_are_rejected(#[case] uri: &str, #[case] q: &str) {
    let server = server().await;
    server
        .get(uri)
        .add_query_param("q", q)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn online_search_appends_remote_hits() {
    let remote = Arc::new(StubSearch::Hits(vec![remote_hit(
        "http://es.dbpedia.org/resource/Rayuela",
    )]));
    let server = server_for(tests_cfg::app::get_app_context_with_remote(remote).await);
    seed(&server).await;

    let body: Value = server
        .get("/buscador/online")
        .add_query_param("q", "rayuela")
        .await
        .json();
    assert_eq!(body["cantidad"], 2);
    assert_eq!(body["resultados"][0]["origen"], "Local");
    assert_eq!(body["resultados"][1]["origen"], "DBpedia");
    assert!(body.get("aviso").is_none());
}

#[tokio::test]
async fn online_search_survives_remote_timeouts() {
    let remote = Arc::new(StubSearch::TimingOut);
    let server = server_for(tests_cfg::app::get_app_context_with_remote(remote).await);
    seed(&server).await;

    let response = server
        .get("/buscador/online")
        .add_query_param("q", "rayuela")
        .add_query_param("lang", "en")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["cantidad"], 1);
    assert_eq!(body["resultados"][0]["id"], "Rayuela");
    assert!(body["aviso"].is_string());
}

#[tokio::test]
async fn online_search_rejects_malformed_languages() {
    let server = server().await;
    server
        .get("/buscador/online")
        .add_query_param("q", "rayuela")
        .add_query_param("lang", "no es")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

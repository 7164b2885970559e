use axum::http::StatusCode;
use rstest::rstest;
use serde_json::{json, Value};

use super::server;

#[rstest]
#[case("es", "Libro", "Editorial")]
#[case("en", "Book", "Publisher")]
#[case("qu", "Mayt'u", "Qillqa wasi")]
#[case("de", "Buch", "Verlag")]
#[tokio::test]
async fn class_names_are_translated(
    #[case] code: &str,
    #[case] book: &str,
    #[case] publisher: &str,
) {
    let server = server().await;
    let response = server.get(&format!("/config/idioma/{code}")).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["Libro"], book);
    assert_eq!(body["Editorial"], publisher);
}

#[tokio::test]
async fn unlabeled_properties_fall_back_to_their_name() {
    let server = server().await;
    let body: Value = server.get("/config/idioma/en").await.json();
    assert_eq!(body["isbn"], "isbn");
    assert_eq!(body["titulo"], "title");
}

#[tokio::test]
async fn unsupported_languages_are_rejected() {
    let server = server().await;
    let response = server.get("/config/idioma/it").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "error": "Bad Request",
        "description": "Idioma no soportado. Use: es, en, qu, fr, de"
    }));
}

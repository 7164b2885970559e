use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
};

use crate::{
    app::AppContext,
    controller::{format, Routes},
    Result,
};

/// `GET /config/idioma/{code}`: class and property names mapped to their
/// labels in `code`.
pub async fn translations(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
) -> Result<Response> {
    let lang = ctx.languages.resolve(&code)?;
    let ontology = ctx.ontology.read().await;
    format::json(ctx.languages.translate(&ontology, &lang))
}

pub fn routes() -> Routes {
    Routes::new().add("/config/idioma/{code}", get(translations))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::tests_cfg;

    #[tokio::test]
    async fn unsupported_languages_are_rejected() {
        let ctx = tests_cfg::app::get_app_context().await;
        let err = translations(State(ctx), Path("it".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Idioma no soportado. Use: es, en, qu, fr, de");
    }

    #[tokio::test]
    async fn english_labels_are_served() {
        let ctx = tests_cfg::app::get_app_context().await;
        let response = translations(State(ctx), Path("en".to_string()))
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["Libro"], "Book");
        assert_eq!(body["codigo_sis"], "codigo_sis");
    }
}

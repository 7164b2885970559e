use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use crate::{
    app::AppContext,
    controller::{bad_request, format, Routes},
    ontology::LanguageTag,
    search::{local, SearchResults},
    Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct LocalSearchParams {
    #[serde(default)]
    pub q: String,
    pub clase: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnlineSearchParams {
    #[serde(default)]
    pub q: String,
    pub lang: Option<String>,
}

fn require_length(q: &str, min: usize) -> Result<()> {
    if q.chars().count() < min {
        return bad_request(format!("q must be at least {min} characters long"));
    }
    Ok(())
}

/// `GET /buscador?q=&clase=`: local store only.
pub async fn offline(
    State(ctx): State<AppContext>,
    Query(params): Query<LocalSearchParams>,
) -> Result<Response> {
    require_length(&params.q, 1)?;
    let hits = {
        let ontology = ctx.ontology.read().await;
        local::search(&ontology, &params.q, params.clase.as_deref())
    };
    format::json(SearchResults::local(hits))
}

/// `GET /buscador/online?q=&lang=`: local hits followed by remote ones.
pub async fn online(
    State(ctx): State<AppContext>,
    Query(params): Query<OnlineSearchParams>,
) -> Result<Response> {
    require_length(&params.q, 2)?;
    let lang = match params.lang.as_deref() {
        Some(code) => LanguageTag::new(code)
            .map_err(|err| Error::BadRequest(format!("invalid lang: {err}")))?,
        None => LanguageTag::default(),
    };
    tracing::debug!(q = %params.q, lang = %lang, "hybrid search");

    let hits = {
        let ontology = ctx.ontology.read().await;
        local::search(&ontology, &params.q, None)
    };
    let remote = ctx.remote.search(&params.q, &lang).await;
    format::json(SearchResults::merge(hits, remote))
}

pub fn routes() -> Routes {
    Routes::new()
        .prefix("buscador")
        .add("/", get(offline))
        .add("/online", get(online))
}

//! Substring search over the local store and a remote knowledge base.
//!
//! Both sides produce [`SearchHit`]s with the same shape so the HTTP layer can
//! concatenate them without caring where a hit came from.

pub mod local;
pub mod remote;

use serde::Serialize;

pub use remote::{DbpediaSearch, DisabledSearch, RemoteSearch, RemoteSearchError, SparqlClient};

/// Where a search hit was found.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SearchOrigin {
    Local,
    #[serde(rename = "DBpedia")]
    Dbpedia,
}

/// One search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "nombre_mostrar")]
    pub display_name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "origen")]
    pub origin: SearchOrigin,
    #[serde(rename = "imagen")]
    pub image: Option<String>,
}

/// Search response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    #[serde(rename = "cantidad")]
    pub count: usize,
    #[serde(rename = "resultados")]
    pub hits: Vec<SearchHit>,
    /// Advisory message set when the remote side could not be queried.
    #[serde(rename = "aviso", skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl SearchResults {
    #[must_use]
    pub fn local(hits: Vec<SearchHit>) -> Self {
        Self {
            count: hits.len(),
            hits,
            notice: None,
        }
    }

    /// Appends remote hits after local ones. A failed remote search leaves
    /// the local hits untouched and only adds a notice.
    #[must_use]
    pub fn merge(local: Vec<SearchHit>, remote: Result<Vec<SearchHit>, RemoteSearchError>) -> Self {
        let mut hits = local;
        let notice = match remote {
            Ok(remote) => {
                hits.extend(remote);
                None
            }
            Err(RemoteSearchError::Disabled) => None,
            Err(err) => {
                tracing::warn!(err.msg = %err, err.detail = ?err, "remote_search_failed");
                Some(format!("Búsqueda en DBpedia no disponible: {err}"))
            }
        };
        Self {
            count: hits.len(),
            hits,
            notice,
        }
    }
}

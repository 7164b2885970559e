//! Remote search against a public SPARQL endpoint (DBpedia by default).

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{SearchHit, SearchOrigin};
use crate::{config::RemoteSearchSettings, ontology::LanguageTag};

const NO_DESCRIPTION: &str = "Sin descripción";

/// Errors raised while querying the remote knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum RemoteSearchError {
    #[error("remote search is disabled")]
    Disabled,
    #[error("remote endpoint timed out")]
    Timeout,
    #[error("remote endpoint answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Payload(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RemoteSearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Payload(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<Binding>,
}

/// One row of a SPARQL JSON result.
pub type Binding = HashMap<String, SparqlValue>;

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlValue {
    pub value: String,
}

/// Minimal SPARQL protocol client returning JSON bindings.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: Client,
    endpoint: String,
}

impl SparqlClient {
    /// Creates a client with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteSearchError> {
        let http = Client::builder()
            .user_agent(concat!("biblioteca/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a `SELECT` query and returns its bindings.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteSearchError`] on timeouts, transport failures, error
    /// statuses and undecodable payloads.
    pub async fn select(&self, query: &str) -> Result<Vec<Binding>, RemoteSearchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .query(&[("query", query), ("format", "json")])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_bindings(&body)
    }
}

pub(crate) fn parse_bindings(body: &str) -> Result<Vec<Binding>, RemoteSearchError> {
    let parsed: SparqlResponse =
        serde_json::from_str(body).map_err(|err| RemoteSearchError::Payload(err.to_string()))?;
    Ok(parsed.results.bindings)
}

/// Removes characters that could break out of a quoted SPARQL literal.
#[must_use]
pub fn sanitize_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\\') && !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the full-text lookup for `term` restricted to people, books and
/// organisations labelled in `lang`.
#[must_use]
pub fn build_query(term: &str, lang: &LanguageTag, limit: usize) -> String {
    format!(
        r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX bif: <bif:>

SELECT DISTINCT ?s ?label ?comment ?type ?img
WHERE {{
  ?s rdfs:label ?label .
  ?label bif:contains "'{term}'" .
  ?s a ?type .
  FILTER (lang(?label) = '{lang}')
  OPTIONAL {{
    ?s rdfs:comment ?comment .
    FILTER (lang(?comment) = '{lang}')
  }}
  OPTIONAL {{ ?s foaf:depiction ?img }}
  FILTER (?type IN (dbo:Person, dbo:Book, dbo:Organisation))
}}
LIMIT {limit}"#
    )
}

fn to_hit(binding: &Binding) -> Option<SearchHit> {
    let value = |name: &str| binding.get(name).map(|v| v.value.clone());
    let ty = value("type")?;
    Some(SearchHit {
        id: value("s")?,
        kind: ty.rsplit('/').next().unwrap_or(ty.as_str()).to_string(),
        display_name: value("label")?,
        description: value("comment").unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        origin: SearchOrigin::Dbpedia,
        image: value("img"),
    })
}

/// Port for remote lookups.
#[async_trait]
pub trait RemoteSearch: Send + Sync {
    /// Searches the remote knowledge base for `query` in `lang`.
    async fn search(
        &self,
        query: &str,
        lang: &LanguageTag,
    ) -> Result<Vec<SearchHit>, RemoteSearchError>;
}

/// DBpedia adapter.
#[derive(Debug, Clone)]
pub struct DbpediaSearch {
    client: SparqlClient,
    limit: usize,
}

impl DbpediaSearch {
    #[must_use]
    pub fn new(client: SparqlClient, limit: usize) -> Self {
        Self { client, limit }
    }

    /// Builds the adapter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(settings: &RemoteSearchSettings) -> Result<Self, RemoteSearchError> {
        let client = SparqlClient::new(
            settings.endpoint.as_str(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::new(client, settings.limit))
    }
}

#[async_trait]
impl RemoteSearch for DbpediaSearch {
    async fn search(
        &self,
        query: &str,
        lang: &LanguageTag,
    ) -> Result<Vec<SearchHit>, RemoteSearchError> {
        let term = sanitize_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            endpoint = self.client.endpoint(),
            term = %term,
            lang = %lang,
            "remote_search"
        );
        let bindings = self
            .client
            .select(&build_query(&term, lang, self.limit))
            .await?;
        Ok(bindings.iter().filter_map(to_hit).collect())
    }
}

/// Adapter used when remote search is switched off in the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearch;

#[async_trait]
impl RemoteSearch for DisabledSearch {
    async fn search(
        &self,
        _query: &str,
        _lang: &LanguageTag,
    ) -> Result<Vec<SearchHit>, RemoteSearchError> {
        Err(RemoteSearchError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizing_drops_quotes_and_backslashes() {
        assert_eq!(sanitize_term(r#"  Don 'Quijote' "de" la \Mancha "#), "Don Quijote de la Mancha");
        assert_eq!(sanitize_term("'\"\\"), "");
    }

    #[test]
    fn query_embeds_term_language_and_limit() {
        let query = build_query("Borges", &LanguageTag::new("fr").unwrap(), 10);
        assert!(query.contains(r#"?label bif:contains "'Borges'" ."#));
        assert!(query.contains("FILTER (lang(?label) = 'fr')"));
        assert!(query.contains("dbo:Person, dbo:Book, dbo:Organisation"));
        assert!(query.ends_with("LIMIT 10"));
    }

    #[test]
    fn bindings_map_to_hits() {
        let body = r#"{
            "head": {"vars": ["s", "label", "comment", "type", "img"]},
            "results": {"bindings": [
                {
                    "s": {"type": "uri", "value": "http://dbpedia.org/resource/Jorge_Luis_Borges"},
                    "label": {"type": "literal", "xml:lang": "es", "value": "Jorge Luis Borges"},
                    "type": {"type": "uri", "value": "http://dbpedia.org/ontology/Person"},
                    "img": {"type": "uri", "value": "http://commons.wikimedia.org/borges.jpg"}
                },
                {
                    "s": {"type": "uri", "value": "http://dbpedia.org/resource/Ficciones"},
                    "label": {"type": "literal", "xml:lang": "es", "value": "Ficciones"},
                    "comment": {"type": "literal", "xml:lang": "es", "value": "Libro de cuentos"},
                    "type": {"type": "uri", "value": "http://dbpedia.org/ontology/Book"}
                },
                {
                    "label": {"type": "literal", "value": "sin sujeto"}
                }
            ]}
        }"#;
        let hits: Vec<SearchHit> = parse_bindings(body)
            .unwrap()
            .iter()
            .filter_map(to_hit)
            .collect();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, "Person");
        assert_eq!(hits[0].description, NO_DESCRIPTION);
        assert_eq!(
            hits[0].image.as_deref(),
            Some("http://commons.wikimedia.org/borges.jpg")
        );
        assert_eq!(hits[1].kind, "Book");
        assert_eq!(hits[1].description, "Libro de cuentos");
        assert_eq!(hits[1].origin, SearchOrigin::Dbpedia);
    }

    #[test]
    fn malformed_payloads_are_errors() {
        let err = parse_bindings("<html>").unwrap_err();
        assert!(matches!(err, RemoteSearchError::Payload(_)));
    }

    #[tokio::test]
    async fn disabled_adapter_always_fails() {
        let err = DisabledSearch
            .search("Borges", &LanguageTag::new("es").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteSearchError::Disabled));
    }
}

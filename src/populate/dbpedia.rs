//! Real book records from the Spanish DBpedia chapter.

use crate::search::{remote::Binding, RemoteSearchError, SparqlClient};

use super::BookRecord;

const UNKNOWN_PUBLISHER: &str = "Editorial Generica";
const UNKNOWN_COUNTRY: &str = "Desconocido";

/// Books with a Spanish title and author label, plus their publisher and
/// the publisher's location when known.
#[must_use]
pub fn books_query(limit: usize) -> String {
    format!(
        r"PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>

SELECT DISTINCT ?titulo ?autor ?editorial ?pais
WHERE {{
  ?libro a dbo:Book ;
         rdfs:label ?titulo ;
         dbo:author ?aResource .
  ?aResource rdfs:label ?autor .
  OPTIONAL {{
    ?libro dbo:publisher ?eResource .
    ?eResource rdfs:label ?editorial .
    OPTIONAL {{ ?eResource dbo:location ?pResource . ?pResource rdfs:label ?pais }}
  }}
  FILTER (LANG(?titulo) = 'es')
  FILTER (LANG(?autor) = 'es')
}}
LIMIT {limit}"
    )
}

fn to_record(binding: &Binding) -> Option<BookRecord> {
    let value = |name: &str| binding.get(name).map(|v| v.value.clone());
    Some(BookRecord {
        title: value("titulo")?,
        author: value("autor")?,
        publisher: value("editorial").unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
        country: value("pais").unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
    })
}

/// Fetches up to `limit` books.
///
/// # Errors
///
/// Returns the client error when the endpoint cannot be queried.
pub async fn fetch_books(
    client: &SparqlClient,
    limit: usize,
) -> Result<Vec<BookRecord>, RemoteSearchError> {
    tracing::info!(endpoint = client.endpoint(), limit, "fetching books");
    let bindings = client.select(&books_query(limit)).await?;
    Ok(bindings.iter().filter_map(to_record).collect())
}

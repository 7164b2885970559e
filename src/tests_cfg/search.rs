use async_trait::async_trait;

use crate::{
    ontology::LanguageTag,
    search::{RemoteSearch, RemoteSearchError, SearchHit},
};

/// Remote search double: either answers with fixed hits or times out.
#[derive(Debug, Clone)]
pub enum StubSearch {
    Hits(Vec<SearchHit>),
    TimingOut,
}

#[async_trait]
impl RemoteSearch for StubSearch {
    async fn search(
        &self,
        _query: &str,
        _lang: &LanguageTag,
    ) -> Result<Vec<SearchHit>, RemoteSearchError> {
        match self {
            Self::Hits(hits) => Ok(hits.clone()),
            Self::TimingOut => Err(RemoteSearchError::Timeout),
        }
    }
}

//! # Application Error Handling

use axum::{extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    i18n::TranslationError,
    ontology::{OntologyError, OntologyServiceError},
    populate::PopulateError,
    search::RemoteSearchError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("cannot parse `{1}`: {0}")]
    YAMLFile(#[source] serde_yaml::Error, String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Tera(#[from] tera::Error),

    // API
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),

    // library knowledge base
    #[error(transparent)]
    Ontology(#[from] OntologyServiceError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    RemoteSearch(#[from] RemoteSearchError),

    #[error(transparent)]
    Populate(#[from] PopulateError),
}

impl Error {
    /// HTTP status a failed request is answered with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::JsonRejection(_) | Self::Translation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Ontology(err) => ontology_status(err),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn ontology_status(err: &OntologyServiceError) -> StatusCode {
    match err {
        OntologyServiceError::Domain(domain) => match domain {
            _ if domain.is_not_found() => StatusCode::NOT_FOUND,
            OntologyError::DuplicateIndividual(_) | OntologyError::NameTaken(_) => {
                StatusCode::CONFLICT
            }
            OntologyError::InvalidName(_) | OntologyError::Language(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        OntologyServiceError::Sparql(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

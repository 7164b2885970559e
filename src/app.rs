//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    config::Config, environment::Environment, i18n::Languages, ontology::OntologyService,
    search::RemoteSearch,
};

/// Everything a request needs, cloned cheaply into each handler.
#[derive(Clone)]
pub struct AppContext {
    /// The environment in which the application is running.
    pub environment: Environment,
    /// Configuration settings for the application
    pub config: Config,
    /// The library knowledge base.
    pub ontology: Arc<OntologyService>,
    /// Remote knowledge base used by the online search.
    pub remote: Arc<dyn RemoteSearch>,
    /// Languages offered by the translation endpoint.
    pub languages: Languages,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("environment", &self.environment)
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

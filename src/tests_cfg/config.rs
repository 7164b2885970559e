use std::path::PathBuf;

use crate::{
    config::{
        self, Config, I18nSettings, OntologyBackend, OntologySettings, PopulateSettings,
        RemoteSearchSettings,
    },
    logger,
};

/// Configuration used by tests: in-memory store, no remote search and no
/// log output.
#[must_use]
pub fn test_config() -> Config {
    Config {
        logger: config::Logger {
            enable: false,
            level: logger::LogLevel::Off,
            format: logger::Format::Json,
            override_filter: None,
            file_appender: None,
        },
        server: config::Server {
            binding: "localhost".to_string(),
            port: 5555,
            host: "localhost".to_string(),
            cors: config::CorsSettings { enable: true },
        },
        ontology: OntologySettings {
            backend: OntologyBackend::InMemory,
            path: PathBuf::from("biblioteca.nt"),
            base_iri: "http://uni.edu/biblioteca.owl#".to_string(),
        },
        remote_search: RemoteSearchSettings {
            enable: false,
            ..RemoteSearchSettings::default()
        },
        i18n: I18nSettings::default(),
        populate: PopulateSettings::default(),
    }
}

/// Same as [`test_config`] with the store kept in a file at `path`.
#[must_use]
pub fn file_config(path: impl Into<PathBuf>) -> Config {
    let mut config = test_config();
    config.ontology.backend = OntologyBackend::File;
    config.ontology.path = path.into();
    config
}

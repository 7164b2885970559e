//! # Biblioteca
//!
//! A library knowledge base served over HTTP. The store is an OWL ontology
//! (people, organisations and publications) persisted as N-Triples; the API
//! creates individuals, sets their attributes and relations, answers SPARQL
//! queries and searches both the local store and DBpedia.
//!
//! Start the server with `biblioteca start`, fill the store with sample data
//! with `biblioteca populate`.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub use self::errors::Error;

pub mod app;
pub mod boot;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod environment;
pub mod errors;
pub mod i18n;
pub mod logger;
pub mod ontology;
pub mod populate;
pub mod search;
#[cfg(any(test, feature = "testing"))]
pub mod tests_cfg;

#[cfg(feature = "testing")]
pub use axum_test::TestServer;

/// Application results options list
pub type Result<T, E = Error> = std::result::Result<T, E>;

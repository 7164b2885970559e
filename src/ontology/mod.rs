//! Core ontology domain primitives and contracts.
//!
//! The module holds the library knowledge base: value objects, the
//! [`Ontology`] aggregate with its classes, properties and individuals, the
//! T-Box declared at startup, the RDF projection used for persistence and
//! SPARQL, and the [`OntologyService`] that serializes access and persists the
//! store after every mutation.

pub mod entities;
pub mod rdf;
pub mod repositories;
pub mod schema;
pub mod service;
pub mod value_objects;
pub mod values;

pub use entities::{
    Class, EntityRef, Individual, Ontology, OntologyError, Property, PropertyKind, LABEL_PROPERTY,
};
pub use repositories::{OntologyRepository, OntologySnapshot, OntologySummary};
pub use service::{
    FileOntologyRepository, InMemoryOntologyRepository, IndividualView, OntologyService,
    OntologyServiceError, RepositoryHandle, SparqlResults,
};
pub use value_objects::{Iri, IriError, LanguageTag, LanguageTagError, LocalizedTexts};
pub use values::{PropertySlot, PropertyValues, Value, ValueError};

use async_trait::async_trait;

use super::entities::Ontology;
use super::rdf::{self, RdfError};
use super::value_objects::Iri;

/// Serialized form of the whole store as handed to repositories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OntologySnapshot {
    /// N-Triples document holding the schema and every individual.
    pub document: String,
}

impl OntologySnapshot {
    /// Rebuilds the aggregate in the `base` namespace.
    ///
    /// # Errors
    ///
    /// Returns [`RdfError`] when the document is not valid N-Triples or
    /// describes inconsistent entities.
    pub fn restore(&self, base: &Iri) -> Result<Ontology, RdfError> {
        rdf::from_ntriples(base, &self.document)
    }
}

impl From<&Ontology> for OntologySnapshot {
    fn from(ontology: &Ontology) -> Self {
        Self {
            document: rdf::to_ntriples(ontology),
        }
    }
}

/// Summary DTO describing the store without exposing the aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OntologySummary {
    /// Namespace of the ontology.
    pub iri: Iri,
    /// Number of class declarations.
    pub class_count: usize,
    /// Number of property declarations.
    pub property_count: usize,
    /// Number of individuals.
    pub individual_count: usize,
}

impl From<&Ontology> for OntologySummary {
    fn from(ontology: &Ontology) -> Self {
        Self {
            iri: ontology.id().clone(),
            class_count: ontology.classes().len(),
            property_count: ontology.properties().len(),
            individual_count: ontology.individuals().len(),
        }
    }
}

/// Contract describing persistence responsibilities for the ontology store.
///
/// The store is always persisted wholesale: every save replaces the previous
/// snapshot entirely.
#[async_trait]
pub trait OntologyRepository {
    /// Associated error type allowing infrastructure specific failures.
    type Error;

    /// Loads the persisted snapshot.
    ///
    /// Implementors must return `Ok(None)` when nothing was persisted yet.
    async fn load(&self) -> Result<Option<OntologySnapshot>, Self::Error>;

    /// Replaces the persisted snapshot.
    ///
    /// Implementors should never leave a partially written snapshot behind.
    async fn save(&self, snapshot: &OntologySnapshot) -> Result<(), Self::Error>;

    /// Human readable location of the snapshot, e.g. a file path.
    fn location(&self) -> String;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{OntologySnapshot, OntologySummary};
    use crate::ontology::{schema, Iri, LanguageTag, Ontology};

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    #[test]
    fn snapshots_restore_the_aggregate() {
        let mut ontology = Ontology::new(iri("http://uni.edu/biblioteca.owl#"));
        schema::declare(&mut ontology).expect("schema");
        ontology.create_individual("Rayuela", "Libro").expect("individual");
        ontology
            .assign_data(
                "Rayuela",
                "titulo",
                &json!("Rayuela"),
                &LanguageTag::new("es").unwrap(),
            )
            .expect("title");

        let snapshot = OntologySnapshot::from(&ontology);
        let restored = snapshot.restore(ontology.id()).expect("restore");
        assert_eq!(
            OntologySummary::from(&restored),
            OntologySummary::from(&ontology)
        );
        assert_eq!(restored.individuals(), ontology.individuals());
    }

    #[test]
    fn summary_counts_entities() {
        let mut ontology = Ontology::new(iri("http://uni.edu/biblioteca.owl#"));
        schema::declare(&mut ontology).expect("schema");
        let summary = OntologySummary::from(&ontology);
        assert_eq!(summary.class_count, 13);
        assert_eq!(summary.property_count, 22);
        assert_eq!(summary.individual_count, 0);
    }
}

//! RDF projection of the ontology aggregate.
//!
//! The aggregate is written as N-Triples (which is also valid Turtle) and read
//! back through an in-memory oxigraph store. Property slots are not stored
//! explicitly: they are derived from `owl:FunctionalProperty` and the
//! declared `rdfs:range` when a snapshot is loaded.

use std::collections::{BTreeMap, BTreeSet};

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use oxrdf::vocab::{rdf, rdfs, xsd};
use oxrdf::{Literal, NamedNode, NamedNodeRef, Triple};
use thiserror::Error;

use super::entities::{Class, Individual, Ontology, OntologyError, Property, PropertyKind};
use super::value_objects::{Iri, IriError, LanguageTag};
use super::values::{PropertySlot, Value, ValueError};

pub mod owl {
    use oxrdf::NamedNodeRef;

    pub const ONTOLOGY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
    pub const CLASS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const OBJECT_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const DATATYPE_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
    pub const FUNCTIONAL_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#FunctionalProperty");
    pub const NAMED_INDIVIDUAL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#NamedIndividual");
}

/// Language assumed for labels stored without a language tag.
const UNTAGGED_LANGUAGE: &str = "es";

const ALL_STATEMENTS: &str = "SELECT ?s ?p ?o WHERE { ?s ?p ?o }";

/// Errors raised while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum RdfError {
    #[error("failed to open RDF store: {0}")]
    Store(String),
    #[error("failed to parse snapshot: {0}")]
    Parse(String),
    #[error("failed to read snapshot statements: {0}")]
    Query(String),
    #[error(transparent)]
    Iri(#[from] IriError),
    #[error("invalid value for `{property}` on `{subject}`: {source}")]
    Value {
        subject: String,
        property: String,
        #[source]
        source: ValueError,
    },
    #[error(transparent)]
    Ontology(#[from] OntologyError),
}

fn node(iri: &Iri) -> NamedNode {
    iri.to_named_node()
}

fn localized(text: &str, lang: &LanguageTag) -> Literal {
    Literal::new_language_tagged_literal_unchecked(text, lang.as_str())
}

fn literal(value: &Value) -> Literal {
    match value {
        Value::Text(text) => Literal::new_simple_literal(text),
        Value::Integer(number) => Literal::new_typed_literal(number.to_string(), xsd::INTEGER),
        Value::Date(_) => Literal::new_typed_literal(value.to_string(), xsd::DATE),
        Value::Reference(iri) => Literal::new_simple_literal(iri.as_str()),
    }
}

fn datatype(slot: PropertySlot) -> Option<NamedNodeRef<'static>> {
    match slot {
        PropertySlot::SingleText | PropertySlot::MultiText => Some(xsd::STRING),
        PropertySlot::Integer => Some(xsd::INTEGER),
        PropertySlot::Date => Some(xsd::DATE),
        PropertySlot::References => None,
    }
}

/// Projects the aggregate onto RDF triples: the ontology header, then
/// classes, properties and individuals in identifier order.
#[must_use]
pub fn triples(ontology: &Ontology) -> Vec<Triple> {
    let mut triples = Vec::new();
    let header = NamedNode::new_unchecked(ontology.id().as_str().trim_end_matches('#'));
    triples.push(Triple::new(header, rdf::TYPE, owl::ONTOLOGY));

    for class in ontology.classes().values() {
        let subject = node(class.id());
        triples.push(Triple::new(subject.clone(), rdf::TYPE, owl::CLASS));
        for parent in class.parents() {
            triples.push(Triple::new(subject.clone(), rdfs::SUB_CLASS_OF, node(parent)));
        }
        for (lang, text) in class.labels().iter() {
            triples.push(Triple::new(subject.clone(), rdfs::LABEL, localized(text, lang)));
        }
        for (lang, text) in class.comments().iter() {
            triples.push(Triple::new(subject.clone(), rdfs::COMMENT, localized(text, lang)));
        }
    }

    for property in ontology.properties().values() {
        let subject = node(property.id());
        let kind = match property.kind() {
            PropertyKind::Object => owl::OBJECT_PROPERTY,
            PropertyKind::Data => owl::DATATYPE_PROPERTY,
        };
        triples.push(Triple::new(subject.clone(), rdf::TYPE, kind));
        if !property.slot().is_multi_valued() {
            triples.push(Triple::new(subject.clone(), rdf::TYPE, owl::FUNCTIONAL_PROPERTY));
        }
        for domain in property.domains() {
            triples.push(Triple::new(subject.clone(), rdfs::DOMAIN, node(domain)));
        }
        for range in property.ranges() {
            triples.push(Triple::new(subject.clone(), rdfs::RANGE, node(range)));
        }
        if let Some(datatype) = datatype(property.slot()) {
            triples.push(Triple::new(subject.clone(), rdfs::RANGE, datatype));
        }
        for (lang, text) in property.labels().iter() {
            triples.push(Triple::new(subject.clone(), rdfs::LABEL, localized(text, lang)));
        }
    }

    for individual in ontology.individuals().values() {
        let subject = node(individual.id());
        triples.push(Triple::new(subject.clone(), rdf::TYPE, owl::NAMED_INDIVIDUAL));
        for ty in individual.types() {
            triples.push(Triple::new(subject.clone(), rdf::TYPE, node(ty)));
        }
        for (lang, text) in individual.labels().iter() {
            triples.push(Triple::new(subject.clone(), rdfs::LABEL, localized(text, lang)));
        }
        for (property, values) in individual.values() {
            for value in values.iter() {
                let triple = match value {
                    Value::Reference(target) => {
                        Triple::new(subject.clone(), node(property), node(target))
                    }
                    literal_value => {
                        Triple::new(subject.clone(), node(property), literal(literal_value))
                    }
                };
                triples.push(triple);
            }
        }
    }

    triples
}

/// Serializes the aggregate as an N-Triples document.
#[must_use]
pub fn to_ntriples(ontology: &Ontology) -> String {
    let mut out = String::new();
    for triple in triples(ontology) {
        out.push_str(&triple.to_string());
        out.push_str(" .\n");
    }
    out
}

/// Loads an N-Triples document into a fresh in-memory store.
pub fn load_store(document: &str) -> Result<Store, RdfError> {
    let store = Store::new().map_err(|err| RdfError::Store(err.to_string()))?;
    store
        .load_from_reader(RdfFormat::NTriples, document.as_bytes())
        .map_err(|err| RdfError::Parse(err.to_string()))?;
    Ok(store)
}

struct Statement {
    subject: String,
    predicate: String,
    object: Term,
}

impl Statement {
    fn object_iri(&self) -> Option<&str> {
        match &self.object {
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        }
    }

    fn is(&self, predicate: NamedNodeRef<'_>) -> bool {
        self.predicate == predicate.as_str()
    }

    fn is_type(&self, class: NamedNodeRef<'_>) -> bool {
        self.is(rdf::TYPE) && self.object_iri() == Some(class.as_str())
    }
}

fn statements(store: &Store) -> Result<Vec<Statement>, RdfError> {
    let results = SparqlEvaluator::new()
        .parse_query(ALL_STATEMENTS)
        .map_err(|err| RdfError::Query(err.to_string()))?
        .on_store(store)
        .execute()
        .map_err(|err| RdfError::Query(err.to_string()))?;
    let QueryResults::Solutions(solutions) = results else {
        return Ok(Vec::new());
    };

    let mut statements = Vec::new();
    for solution in solutions {
        let solution = solution.map_err(|err| RdfError::Query(err.to_string()))?;
        let (Some(Term::NamedNode(subject)), Some(Term::NamedNode(predicate)), Some(object)) =
            (solution.get("s"), solution.get("p"), solution.get("o"))
        else {
            continue;
        };
        statements.push(Statement {
            subject: subject.as_str().to_string(),
            predicate: predicate.as_str().to_string(),
            object: object.clone(),
        });
    }
    Ok(statements)
}

fn text_of(term: &Term) -> Option<(LanguageTag, String)> {
    let Term::Literal(literal) = term else {
        return None;
    };
    let lang = LanguageTag::new(literal.language().unwrap_or(UNTAGGED_LANGUAGE)).ok()?;
    Some((lang, literal.value().to_string()))
}

fn slot_for(kind: PropertyKind, functional: bool, ranges: &BTreeSet<&str>) -> PropertySlot {
    match kind {
        PropertyKind::Object => PropertySlot::References,
        PropertyKind::Data if ranges.contains(xsd::INTEGER.as_str()) => PropertySlot::Integer,
        PropertyKind::Data if ranges.contains(xsd::DATE.as_str()) => PropertySlot::Date,
        PropertyKind::Data if functional => PropertySlot::SingleText,
        PropertyKind::Data => PropertySlot::MultiText,
    }
}

/// Rebuilds the aggregate from an N-Triples document.
///
/// `base` is the namespace of the returned ontology. Statements that do not
/// describe a declared class, property or individual are ignored. Values of
/// collection properties come back in store order.
pub fn from_ntriples(base: &Iri, document: &str) -> Result<Ontology, RdfError> {
    let store = load_store(document)?;
    let statements = statements(&store)?;

    let mut classes = BTreeSet::new();
    let mut kinds = BTreeMap::new();
    let mut functional = BTreeSet::new();
    let mut individuals = BTreeSet::new();
    for statement in &statements {
        let subject = statement.subject.as_str();
        if statement.is_type(owl::CLASS) {
            classes.insert(subject);
        } else if statement.is_type(owl::OBJECT_PROPERTY) {
            kinds.insert(subject, PropertyKind::Object);
        } else if statement.is_type(owl::DATATYPE_PROPERTY) {
            kinds.insert(subject, PropertyKind::Data);
        } else if statement.is_type(owl::FUNCTIONAL_PROPERTY) {
            functional.insert(subject);
        } else if statement.is_type(owl::NAMED_INDIVIDUAL) {
            individuals.insert(subject);
        }
    }

    let mut ontology = Ontology::new(base.clone());

    let mut class_defs: BTreeMap<&str, Class> = BTreeMap::new();
    for id in &classes {
        class_defs.insert(*id, Class::new(Iri::new(*id)?));
    }
    let mut ranges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut domains: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut property_labels: Vec<(&str, LanguageTag, String)> = Vec::new();

    for statement in &statements {
        let subject = statement.subject.as_str();
        if let Some(class) = class_defs.get_mut(subject) {
            if statement.is(rdfs::SUB_CLASS_OF) {
                if let Some(parent) = statement.object_iri().filter(|p| classes.contains(p)) {
                    class.add_parent(Iri::new(parent)?);
                }
            } else if statement.is(rdfs::LABEL) {
                if let Some((lang, text)) = text_of(&statement.object) {
                    class.labels_mut().push(lang, text);
                }
            } else if statement.is(rdfs::COMMENT) {
                if let Some((lang, text)) = text_of(&statement.object) {
                    class.comments_mut().push(lang, text);
                }
            }
        } else if kinds.contains_key(subject) {
            if statement.is(rdfs::RANGE) {
                if let Some(range) = statement.object_iri() {
                    ranges.entry(subject).or_default().insert(range);
                }
            } else if statement.is(rdfs::DOMAIN) {
                if let Some(domain) = statement.object_iri() {
                    domains.entry(subject).or_default().insert(domain);
                }
            } else if statement.is(rdfs::LABEL) {
                if let Some((lang, text)) = text_of(&statement.object) {
                    property_labels.push((subject, lang, text));
                }
            }
        }
    }

    for class in class_defs.into_values() {
        ontology.add_class(class)?;
    }

    let empty = BTreeSet::new();
    let mut property_defs: BTreeMap<&str, Property> = BTreeMap::new();
    for (id, kind) in &kinds {
        let property_ranges = ranges.get(id).unwrap_or(&empty);
        let slot = slot_for(*kind, functional.contains(id), property_ranges);
        let mut property = Property::new(Iri::new(*id)?, slot);
        for domain in domains.get(id).unwrap_or(&empty) {
            if classes.contains(domain) {
                property.add_domain(Iri::new(*domain)?);
            }
        }
        for range in property_ranges {
            if classes.contains(range) {
                property.add_range(Iri::new(*range)?);
            }
        }
        property_defs.insert(*id, property);
    }
    for (id, lang, text) in property_labels {
        if let Some(property) = property_defs.get_mut(id) {
            property.labels_mut().push(lang, text);
        }
    }

    let mut individual_defs: BTreeMap<&str, Individual> = BTreeMap::new();
    for id in &individuals {
        individual_defs.insert(*id, Individual::new(Iri::new(*id)?));
    }
    for statement in &statements {
        let subject = statement.subject.as_str();
        let Some(individual) = individual_defs.get_mut(subject) else {
            continue;
        };
        if statement.is(rdf::TYPE) {
            if let Some(class) = statement.object_iri().filter(|c| classes.contains(c)) {
                individual.assert_type(Iri::new(class)?);
            }
        } else if statement.is(rdfs::LABEL) {
            if let Some((lang, text)) = text_of(&statement.object) {
                individual.add_label(lang, text);
            }
        } else if let Some(property) = property_defs.get(statement.predicate.as_str()) {
            let value = match (&statement.object, property.kind()) {
                (Term::NamedNode(target), PropertyKind::Object) => {
                    Value::Reference(Iri::new(target.as_str())?)
                }
                (Term::Literal(literal), PropertyKind::Data) => property
                    .slot()
                    .parse_lexical(literal.value())
                    .map_err(|source| RdfError::Value {
                        subject: subject.to_string(),
                        property: property.name().to_string(),
                        source,
                    })?,
                _ => continue,
            };
            individual.assign(property, value);
        }
    }

    for property in property_defs.into_values() {
        ontology.add_property(property)?;
    }
    for individual in individual_defs.into_values() {
        ontology.add_individual(individual)?;
    }

    Ok(ontology)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ontology::schema;

    fn library() -> Ontology {
        let mut ontology = Ontology::new(Iri::new("http://uni.edu/biblioteca.owl#").unwrap());
        schema::declare(&mut ontology).unwrap();
        ontology
    }

    #[test]
    fn writes_one_statement_per_line() {
        let mut ontology = library();
        ontology.create_individual("Rayuela", "Libro").unwrap();
        let es = LanguageTag::new("es").unwrap();
        ontology
            .assign_data("Rayuela", "anio_publicacion", &json!(1963), &es)
            .unwrap();

        let document = to_ntriples(&ontology);
        assert!(document.lines().all(|line| line.ends_with(" .")));
        assert!(document.contains(
            "<http://uni.edu/biblioteca.owl#Rayuela> <http://uni.edu/biblioteca.owl#anio_publicacion> \"1963\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
        ));
        assert!(document.contains("\"Yachakuq\"@qu"));
    }

    #[test]
    fn reading_restores_schema_and_slots() {
        let ontology = library();
        let restored = from_ntriples(ontology.id(), &to_ntriples(&ontology)).unwrap();

        assert_eq!(restored.classes().len(), ontology.classes().len());
        for (id, class) in ontology.classes() {
            let loaded = restored.class(id).unwrap();
            assert_eq!(loaded.parents(), class.parents(), "{id}");
            let mut expected: Vec<_> = class.labels().iter().collect();
            let mut found: Vec<_> = loaded.labels().iter().collect();
            expected.sort();
            found.sort();
            assert_eq!(found, expected, "{id}");
        }
        for (id, property) in ontology.properties() {
            let loaded = restored.property(id).unwrap();
            assert_eq!(loaded.slot(), property.slot(), "{id}");
            assert_eq!(loaded.domains(), property.domains(), "{id}");
            assert_eq!(loaded.ranges(), property.ranges(), "{id}");
            assert_eq!(loaded.labels().len(), property.labels().len(), "{id}");
        }
    }

    #[test]
    fn reading_restores_individuals() {
        let mut ontology = library();
        let es = LanguageTag::new("es").unwrap();
        ontology.create_individual("Ana", "Estudiante").unwrap();
        ontology.create_individual("Rayuela", "Libro").unwrap();
        ontology.assign_data("Ana", "nombre", &json!("Ana"), &es).unwrap();
        ontology
            .assign_data("Ana", "fecha_registro", &json!("2023-02-01"), &es)
            .unwrap();
        ontology.assign_data("Ana", "label", &json!("Ana P."), &es).unwrap();
        ontology.relate("Ana", "toma_prestado", "Rayuela").unwrap();

        let restored = from_ntriples(ontology.id(), &to_ntriples(&ontology)).unwrap();
        assert_eq!(restored.individuals(), ontology.individuals());
    }

    #[test]
    fn region_tagged_labels_survive_a_reload() {
        let mut ontology = library();
        let brazilian = LanguageTag::new("pt-BR").unwrap();
        ontology.create_individual("Rayuela", "Libro").unwrap();
        ontology
            .assign_data("Rayuela", "label", &json!("O Jogo da Amarelinha"), &brazilian)
            .unwrap();

        let document = to_ntriples(&ontology);
        assert!(document.contains("\"O Jogo da Amarelinha\"@pt-br"));

        let restored = from_ntriples(ontology.id(), &document).unwrap();
        assert_eq!(restored.individuals(), ontology.individuals());
        let book = restored.individual_named("Rayuela").unwrap();
        assert_eq!(book.labels().get(&brazilian), Some("O Jogo da Amarelinha"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let base = Iri::new("http://uni.edu/biblioteca.owl#").unwrap();
        let err = from_ntriples(&base, "<a> <b> .").unwrap_err();
        assert!(matches!(err, RdfError::Parse(_)));
    }
}

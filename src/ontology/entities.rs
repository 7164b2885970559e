use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::value_objects::{Iri, IriError, LanguageTag, LanguageTagError, LocalizedTexts};
use super::values::{PropertySlot, PropertyValues, Value, ValueError};

/// Reserved property name that writes `rdfs:label` annotations on individuals.
pub const LABEL_PROPERTY: &str = "label";

/// Ontology class definition capturing parent relationships and metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    id: Iri,
    labels: LocalizedTexts,
    comments: LocalizedTexts,
    super_classes: BTreeSet<Iri>,
}

impl Class {
    /// Creates a new [`Class`] with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            labels: LocalizedTexts::new(),
            comments: LocalizedTexts::new(),
            super_classes: BTreeSet::new(),
        }
    }

    /// Sets the human friendly labels for the class.
    #[must_use]
    pub fn with_labels(mut self, labels: LocalizedTexts) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the textual descriptions for the class.
    #[must_use]
    pub fn with_comments(mut self, comments: LocalizedTexts) -> Self {
        self.comments = comments;
        self
    }

    /// Adds a new parent class relation.
    pub fn add_parent(&mut self, parent: Iri) -> bool {
        self.super_classes.insert(parent)
    }

    /// Returns the unique identifier of the class.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the local name of the class, e.g. `Libro`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
    }

    #[must_use]
    pub fn labels(&self) -> &LocalizedTexts {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LocalizedTexts {
        &mut self.labels
    }

    #[must_use]
    pub fn comments(&self) -> &LocalizedTexts {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut LocalizedTexts {
        &mut self.comments
    }

    /// Returns the parent classes in lexical order.
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<Iri> {
        &self.super_classes
    }
}

/// Ontology property definition supporting object and data properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    id: Iri,
    labels: LocalizedTexts,
    slot: PropertySlot,
    domains: BTreeSet<Iri>,
    ranges: BTreeSet<Iri>,
}

impl Property {
    /// Creates a new property bound to the given slot.
    #[must_use]
    pub fn new(id: Iri, slot: PropertySlot) -> Self {
        Self {
            id,
            labels: LocalizedTexts::new(),
            slot,
            domains: BTreeSet::new(),
            ranges: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: LocalizedTexts) -> Self {
        self.labels = labels;
        self
    }

    /// Declares that the property applies to the supplied domain class.
    pub fn add_domain(&mut self, class: Iri) -> bool {
        self.domains.insert(class)
    }

    /// Declares that the property links to individuals of the range class.
    pub fn add_range(&mut self, class: Iri) -> bool {
        self.ranges.insert(class)
    }

    /// Returns the property identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
    }

    #[must_use]
    pub fn labels(&self) -> &LocalizedTexts {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LocalizedTexts {
        &mut self.labels
    }

    /// Returns the property kind.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        if self.slot.is_reference() {
            PropertyKind::Object
        } else {
            PropertyKind::Data
        }
    }

    /// Returns the typed accessor bound to the property.
    #[must_use]
    pub fn slot(&self) -> PropertySlot {
        self.slot
    }

    /// Returns the registered domain classes.
    #[must_use]
    pub fn domains(&self) -> &BTreeSet<Iri> {
        &self.domains
    }

    /// Returns the registered range classes (object properties only).
    #[must_use]
    pub fn ranges(&self) -> &BTreeSet<Iri> {
        &self.ranges
    }
}

/// Classifies the type of values a property can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// Object properties link individuals.
    Object,
    /// Data properties capture literal values.
    Data,
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object => f.write_str("object property"),
            Self::Data => f.write_str("data property"),
        }
    }
}

/// An ontology individual containing class memberships and property values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Individual {
    id: Iri,
    types: Vec<Iri>,
    labels: LocalizedTexts,
    values: BTreeMap<Iri, PropertyValues>,
}

impl Individual {
    /// Creates a new individual with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            types: Vec::new(),
            labels: LocalizedTexts::new(),
            values: BTreeMap::new(),
        }
    }

    /// Declares that the individual is an instance of the given class.
    pub fn assert_type(&mut self, class: Iri) -> bool {
        if self.types.contains(&class) {
            return false;
        }
        self.types.push(class);
        true
    }

    /// Applies the mutation rule for `property`: a collection grows, a
    /// scalar is replaced, and an absent value takes the slot's first shape.
    pub fn assign(&mut self, property: &Property, value: Value) -> &PropertyValues {
        let slot = property.slot();
        self.values
            .entry(property.id().clone())
            .and_modify(|values| values.assign(value.clone()))
            .or_insert_with(|| PropertyValues::first(slot, value))
    }

    /// Adds an `rdfs:label` annotation.
    pub fn add_label(&mut self, lang: LanguageTag, text: impl Into<String>) -> bool {
        self.labels.push(lang, text)
    }

    /// Returns the identifier of the individual.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.local_name()
    }

    /// Returns the asserted types in assertion order.
    #[must_use]
    pub fn types(&self) -> &[Iri] {
        &self.types
    }

    #[must_use]
    pub fn labels(&self) -> &LocalizedTexts {
        &self.labels
    }

    /// Returns the property values keyed by property identifier.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<Iri, PropertyValues> {
        &self.values
    }

    #[must_use]
    pub fn value(&self, property: &Iri) -> Option<&PropertyValues> {
        self.values.get(property)
    }
}

/// Any named entity of the ontology.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Class(&'a Class),
    Property(&'a Property),
    Individual(&'a Individual),
}

/// Aggregates ontology classes, properties and individuals.
///
/// The ontology identifier doubles as the namespace: entity IRIs are the
/// identifier followed by the entity's local name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ontology {
    id: Iri,
    classes: BTreeMap<Iri, Class>,
    properties: BTreeMap<Iri, Property>,
    individuals: BTreeMap<Iri, Individual>,
}

impl Ontology {
    /// Creates a new ontology aggregate with the supplied namespace.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            classes: BTreeMap::new(),
            properties: BTreeMap::new(),
            individuals: BTreeMap::new(),
        }
    }

    /// Builds the IRI of `name` in this ontology's namespace.
    pub fn iri_for(&self, name: &str) -> Result<Iri, OntologyError> {
        Ok(Iri::from_local_name(&self.id, name)?)
    }

    /// Adds a class to the ontology, enforcing unique identifiers.
    pub fn add_class(&mut self, class: Class) -> Result<(), OntologyError> {
        let id = class.id().clone();
        if self.classes.contains_key(&id) {
            return Err(OntologyError::DuplicateClass(id));
        }
        self.classes.insert(id, class);
        Ok(())
    }

    /// Adds or replaces a class declaration.
    pub fn declare_class(&mut self, class: Class) {
        self.classes.insert(class.id().clone(), class);
    }

    /// Adds a property to the ontology, validating references to known classes.
    pub fn add_property(&mut self, property: Property) -> Result<(), OntologyError> {
        let id = property.id().clone();
        if self.properties.contains_key(&id) {
            return Err(OntologyError::DuplicateProperty(id));
        }
        self.check_property_classes(&property)?;
        self.properties.insert(id, property);
        Ok(())
    }

    /// Adds or replaces a property declaration, validating class references.
    pub fn declare_property(&mut self, property: Property) -> Result<(), OntologyError> {
        self.check_property_classes(&property)?;
        self.properties.insert(property.id().clone(), property);
        Ok(())
    }

    fn check_property_classes(&self, property: &Property) -> Result<(), OntologyError> {
        for class in property.domains().iter().chain(property.ranges()) {
            if !self.classes.contains_key(class) {
                return Err(OntologyError::MissingClass {
                    ontology: self.id.clone(),
                    class: class.clone(),
                });
            }
        }
        Ok(())
    }

    /// Adds an individual ensuring it references known classes and properties.
    pub fn add_individual(&mut self, individual: Individual) -> Result<(), OntologyError> {
        let id = individual.id().clone();
        if self.individuals.contains_key(&id) {
            return Err(OntologyError::DuplicateIndividual(individual.name().to_string()));
        }
        if self.classes.contains_key(&id) || self.properties.contains_key(&id) {
            return Err(OntologyError::NameTaken(individual.name().to_string()));
        }

        for class in individual.types() {
            if !self.classes.contains_key(class) {
                return Err(OntologyError::MissingClass {
                    ontology: self.id.clone(),
                    class: class.clone(),
                });
            }
        }

        for (property_id, values) in individual.values() {
            let Some(property) = self.properties.get(property_id) else {
                return Err(OntologyError::MissingProperty {
                    ontology: self.id.clone(),
                    property: property_id.clone(),
                });
            };
            let references = values.iter().all(|value| value.as_reference().is_some());
            let literals = values.iter().all(|value| value.as_reference().is_none());
            let consistent = match property.kind() {
                PropertyKind::Object => references,
                PropertyKind::Data => literals,
            };
            if !consistent {
                return Err(OntologyError::KindMismatch {
                    property: property.name().to_string(),
                    expected: property.kind(),
                });
            }
        }

        self.individuals.insert(id, individual);
        Ok(())
    }

    /// Resolves a local name to a class, property or individual.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<EntityRef<'_>> {
        let iri = self.iri_for(name).ok()?;
        if let Some(class) = self.classes.get(&iri) {
            return Some(EntityRef::Class(class));
        }
        if let Some(property) = self.properties.get(&iri) {
            return Some(EntityRef::Property(property));
        }
        self.individuals.get(&iri).map(EntityRef::Individual)
    }

    /// Looks up a class by local name.
    pub fn class_named(&self, name: &str) -> Result<&Class, OntologyError> {
        match self.resolve(name) {
            Some(EntityRef::Class(class)) => Ok(class),
            _ => Err(OntologyError::UnknownClass(name.to_string())),
        }
    }

    /// Looks up a property by local name.
    pub fn property_named(&self, name: &str) -> Result<&Property, OntologyError> {
        match self.resolve(name) {
            Some(EntityRef::Property(property)) => Ok(property),
            _ => Err(OntologyError::UnknownProperty(name.to_string())),
        }
    }

    /// Looks up an individual by local name.
    pub fn individual_named(&self, name: &str) -> Result<&Individual, OntologyError> {
        match self.resolve(name) {
            Some(EntityRef::Individual(individual)) => Ok(individual),
            _ => Err(OntologyError::UnknownIndividual(name.to_string())),
        }
    }

    fn individual_named_mut(&mut self, name: &str) -> Result<&mut Individual, OntologyError> {
        let iri = self
            .iri_for(name)
            .map_err(|_| OntologyError::UnknownIndividual(name.to_string()))?;
        self.individuals
            .get_mut(&iri)
            .ok_or_else(|| OntologyError::UnknownIndividual(name.to_string()))
    }

    /// Creates an individual of the named class.
    pub fn create_individual(
        &mut self,
        name: &str,
        class_name: &str,
    ) -> Result<&Individual, OntologyError> {
        let class = self.class_named(class_name)?.id().clone();
        let id = self.iri_for(name)?;
        match self.resolve(name) {
            Some(EntityRef::Individual(_)) => {
                return Err(OntologyError::DuplicateIndividual(name.to_string()))
            }
            Some(_) => return Err(OntologyError::NameTaken(name.to_string())),
            None => {}
        }
        let mut individual = Individual::new(id.clone());
        individual.assert_type(class);
        Ok(self.individuals.entry(id).or_insert(individual))
    }

    /// Assigns a data value to an individual.
    ///
    /// The reserved name [`LABEL_PROPERTY`] writes a label in `lang` instead
    /// of a property value.
    pub fn assign_data(
        &mut self,
        individual: &str,
        property: &str,
        raw: &JsonValue,
        lang: &LanguageTag,
    ) -> Result<(), OntologyError> {
        self.individual_named(individual)?;

        if property == LABEL_PROPERTY && self.property_named(property).is_err() {
            let text = PropertySlot::MultiText
                .coerce(raw)
                .map_err(|source| OntologyError::ValueMismatch {
                    property: property.to_string(),
                    source,
                })?;
            let target = self.individual_named_mut(individual)?;
            target.add_label(lang.clone(), text.to_string());
            return Ok(());
        }

        let definition = self.property_named(property)?.clone();
        if definition.kind() == PropertyKind::Object {
            return Err(OntologyError::KindMismatch {
                property: property.to_string(),
                expected: PropertyKind::Data,
            });
        }
        let value =
            definition
                .slot()
                .coerce(raw)
                .map_err(|source| OntologyError::ValueMismatch {
                    property: property.to_string(),
                    source,
                })?;
        self.individual_named_mut(individual)?
            .assign(&definition, value);
        Ok(())
    }

    /// Links `subject` to `object` through an object property.
    pub fn relate(
        &mut self,
        subject: &str,
        property: &str,
        object: &str,
    ) -> Result<(), OntologyError> {
        self.individual_named(subject)?;
        let target = self.individual_named(object)?.id().clone();
        let definition = self.property_named(property)?.clone();
        if definition.kind() == PropertyKind::Data {
            return Err(OntologyError::KindMismatch {
                property: property.to_string(),
                expected: PropertyKind::Object,
            });
        }
        self.individual_named_mut(subject)?
            .assign(&definition, Value::Reference(target));
        Ok(())
    }

    /// Returns `class` and every class that transitively specializes it.
    #[must_use]
    pub fn descendants_of(&self, class: &Iri) -> BTreeSet<Iri> {
        let mut result = BTreeSet::from([class.clone()]);
        let mut to_visit = VecDeque::from([class.clone()]);

        while let Some(current) = to_visit.pop_front() {
            for (id, candidate) in &self.classes {
                if candidate.parents().contains(&current) && result.insert(id.clone()) {
                    to_visit.push_back(id.clone());
                }
            }
        }
        result
    }

    /// Returns the individuals that are instances of `class` or of any of its
    /// subclasses, in identifier order.
    #[must_use]
    pub fn instances_of(&self, class: &Iri) -> Vec<&Individual> {
        let scope = self.descendants_of(class);
        self.individuals
            .values()
            .filter(|individual| individual.types().iter().any(|ty| scope.contains(ty)))
            .collect()
    }

    fn depth_of(&self, class: &Iri, visited: &mut BTreeSet<Iri>) -> usize {
        if !visited.insert(class.clone()) {
            return 0;
        }
        self.classes
            .get(class)
            .map(|definition| {
                definition
                    .parents()
                    .iter()
                    .map(|parent| 1 + self.depth_of(parent, visited))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Returns the deepest asserted class of an individual; ties keep the
    /// earliest assertion.
    #[must_use]
    pub fn most_specific_type<'a>(&self, individual: &'a Individual) -> Option<&'a Iri> {
        let mut best: Option<(&Iri, usize)> = None;
        for ty in individual.types() {
            let depth = self.depth_of(ty, &mut BTreeSet::new());
            if best.map_or(true, |(_, current)| depth > current) {
                best = Some((ty, depth));
            }
        }
        best.map(|(ty, _)| ty)
    }

    /// Returns the ontology identifier.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Retrieves a class by identifier.
    #[must_use]
    pub fn class(&self, id: &Iri) -> Option<&Class> {
        self.classes.get(id)
    }

    /// Retrieves a property by identifier.
    #[must_use]
    pub fn property(&self, id: &Iri) -> Option<&Property> {
        self.properties.get(id)
    }

    /// Retrieves an individual by identifier.
    #[must_use]
    pub fn individual(&self, id: &Iri) -> Option<&Individual> {
        self.individuals.get(id)
    }

    /// Returns all classes ordered by identifier.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<Iri, Class> {
        &self.classes
    }

    /// Returns all properties ordered by identifier.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<Iri, Property> {
        &self.properties
    }

    /// Returns all individuals ordered by identifier.
    #[must_use]
    pub fn individuals(&self) -> &BTreeMap<Iri, Individual> {
        &self.individuals
    }
}

/// Errors raised when manipulating an ontology aggregate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OntologyError {
    /// The supplied name cannot be turned into an entity IRI.
    #[error(transparent)]
    InvalidName(#[from] IriError),
    /// The supplied language tag is malformed.
    #[error(transparent)]
    Language(#[from] LanguageTagError),
    /// No class with that name exists.
    #[error("class `{0}` not found")]
    UnknownClass(String),
    /// No property with that name exists.
    #[error("property `{0}` not found")]
    UnknownProperty(String),
    /// No individual with that name exists.
    #[error("individual `{0}` not found")]
    UnknownIndividual(String),
    /// Attempted to add a class with an existing identifier.
    #[error("class `{0}` already exists")]
    DuplicateClass(Iri),
    /// Attempted to add a property with an existing identifier.
    #[error("property `{0}` already exists")]
    DuplicateProperty(Iri),
    /// Attempted to create an individual with an existing identifier.
    #[error("individual `{0}` already exists")]
    DuplicateIndividual(String),
    /// The name already identifies a class or a property.
    #[error("`{0}` already names a class or property")]
    NameTaken(String),
    /// Referenced class was not part of the ontology.
    #[error("class `{class}` does not exist in ontology `{ontology}`")]
    MissingClass { ontology: Iri, class: Iri },
    /// Referenced property was not part of the ontology.
    #[error("property `{property}` does not exist in ontology `{ontology}`")]
    MissingProperty { ontology: Iri, property: Iri },
    /// A value could not be stored in the property's slot.
    #[error("cannot assign `{property}`: {source}")]
    ValueMismatch {
        property: String,
        #[source]
        source: ValueError,
    },
    /// Data and object properties were mixed up.
    #[error("`{property}` is not a {expected}")]
    KindMismatch {
        property: String,
        expected: PropertyKind,
    },
}

impl OntologyError {
    /// Whether the error reports a name that does not resolve.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownClass(_) | Self::UnknownProperty(_) | Self::UnknownIndividual(_)
        )
    }

    /// Whether the error reports a value that does not fit its property.
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::ValueMismatch { .. } | Self::KindMismatch { .. })
    }
}

use crate::ontology::{Individual, Ontology};

use super::{SearchHit, SearchOrigin};

/// Text properties inspected after the identifier and the labels, in order.
pub const SEARCHABLE_PROPERTIES: [&str; 6] =
    ["titulo", "nombre", "descripcion", "carrera", "editorial", "autor"];

const FALLBACK_CLASS: &str = "Thing";

/// Case-insensitive substring search over individuals.
///
/// When `class_filter` names a class, only its instances (subclasses
/// included) are searched; any other filter searches every individual.
/// Hits are returned in identifier order.
#[must_use]
pub fn search(ontology: &Ontology, query: &str, class_filter: Option<&str>) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    let class = class_filter.and_then(|name| ontology.class_named(name).ok());
    let scope: Vec<&Individual> = match class {
        Some(class) => ontology.instances_of(class.id()),
        None => ontology.individuals().values().collect(),
    };

    scope
        .into_iter()
        .filter_map(|individual| {
            let description = describe_match(ontology, individual, &needle)?;
            Some(SearchHit {
                id: individual.name().to_string(),
                kind: ontology
                    .most_specific_type(individual)
                    .map_or(FALLBACK_CLASS, |ty| ty.local_name())
                    .to_string(),
                display_name: display_name(ontology, individual),
                description,
                origin: SearchOrigin::Local,
                image: None,
            })
        })
        .collect()
}

fn describe_match(ontology: &Ontology, individual: &Individual, needle: &str) -> Option<String> {
    if individual.name().to_lowercase().contains(needle) {
        return Some("Coincidencia en ID".to_string());
    }

    if let Some((_, label)) = individual
        .labels()
        .iter()
        .find(|(_, label)| label.to_lowercase().contains(needle))
    {
        return Some(format!("Coincidencia en etiqueta: {label}"));
    }

    for name in SEARCHABLE_PROPERTIES {
        let Ok(property) = ontology.property_named(name) else {
            continue;
        };
        let Some(values) = individual.value(property.id()) else {
            continue;
        };
        if let Some(text) = values
            .iter()
            .filter_map(|value| value.as_text())
            .find(|text| text.to_lowercase().contains(needle))
        {
            return Some(format!("Coincidencia en {name}: {text}"));
        }
    }

    None
}

/// Title, then name, then first label, then identifier.
fn display_name(ontology: &Ontology, individual: &Individual) -> String {
    ["titulo", "nombre"]
        .into_iter()
        .filter_map(|name| ontology.property_named(name).ok())
        .find_map(|property| individual.value(property.id())?.first_value())
        .map(ToString::to_string)
        .or_else(|| individual.labels().first().map(str::to_string))
        .unwrap_or_else(|| individual.name().to_string())
}

//! Library T-Box declared at startup.
//!
//! Declarations are upserts: labels and parents are merged into whatever a
//! previously persisted snapshot already holds, so running the bootstrap on
//! every start is idempotent.

use super::entities::{Class, Ontology, OntologyError, Property};
use super::value_objects::{LanguageTag, LocalizedTexts};
use super::values::PropertySlot;

type Labels = &'static [(&'static str, &'static str)];

struct ClassDecl {
    name: &'static str,
    parent: Option<&'static str>,
    labels: Labels,
    comments: Labels,
}

struct PropertyDecl {
    name: &'static str,
    slot: PropertySlot,
    domain: Option<&'static str>,
    range: Option<&'static str>,
    labels: Labels,
}

const fn class(name: &'static str, parent: Option<&'static str>, labels: Labels) -> ClassDecl {
    ClassDecl {
        name,
        parent,
        labels,
        comments: &[],
    }
}

const fn data(
    name: &'static str,
    slot: PropertySlot,
    domain: Option<&'static str>,
    labels: Labels,
) -> PropertyDecl {
    PropertyDecl {
        name,
        slot,
        domain,
        range: None,
        labels,
    }
}

const fn object(
    name: &'static str,
    domain: &'static str,
    range: Option<&'static str>,
    labels: Labels,
) -> PropertyDecl {
    PropertyDecl {
        name,
        slot: PropertySlot::References,
        domain: Some(domain),
        range,
        labels,
    }
}

const CLASSES: &[ClassDecl] = &[
    ClassDecl {
        name: "Persona",
        parent: None,
        labels: &[
            ("es", "Persona"),
            ("en", "Person"),
            ("qu", "Runa"),
            ("fr", "Personne"),
            ("de", "Person"),
        ],
        comments: &[("es", "Ser humano"), ("en", "Human being")],
    },
    class(
        "Organizacion",
        None,
        &[
            ("es", "Organización"),
            ("en", "Organization"),
            ("qu", "Tantanakuy"),
            ("fr", "Organisation"),
            ("de", "Organisation"),
        ],
    ),
    class(
        "Publicacion",
        None,
        &[
            ("es", "Publicación"),
            ("en", "Publication"),
            ("qu", "Qillqasqa"),
            ("fr", "Publication"),
            ("de", "Publikation"),
        ],
    ),
    class(
        "Usuario",
        Some("Persona"),
        &[
            ("es", "Usuario"),
            ("en", "User"),
            ("qu", "Ruwaq"),
            ("fr", "Utilisateur"),
            ("de", "Benutzer"),
        ],
    ),
    class(
        "Bibliotecario",
        Some("Persona"),
        &[
            ("es", "Bibliotecario"),
            ("en", "Librarian"),
            ("qu", "Mayt'u kamayuq"),
            ("fr", "Bibliothécaire"),
            ("de", "Bibliothekar"),
        ],
    ),
    class(
        "Biblioteca",
        Some("Organizacion"),
        &[
            ("es", "Biblioteca"),
            ("en", "Library"),
            ("qu", "Ñawinchana wasi"),
            ("fr", "Bibliothèque"),
            ("de", "Bibliothek"),
        ],
    ),
    class(
        "Editorial",
        Some("Organizacion"),
        &[
            ("es", "Editorial"),
            ("en", "Publisher"),
            ("qu", "Qillqa wasi"),
            ("fr", "Maison d'édition"),
            ("de", "Verlag"),
        ],
    ),
    class(
        "PublicacionPeriodica",
        Some("Publicacion"),
        &[
            ("es", "Publicación Periódica"),
            ("en", "Periodical"),
            ("qu", "Sapa kuti qillqa"),
            ("fr", "Périodique"),
            ("de", "Zeitschrift"),
        ],
    ),
    class(
        "Docente",
        Some("Usuario"),
        &[
            ("es", "Docente"),
            ("en", "Professor"),
            ("qu", "Yachachiq"),
            ("fr", "Enseignant"),
            ("de", "Dozent"),
        ],
    ),
    class(
        "Estudiante",
        Some("Usuario"),
        &[
            ("es", "Estudiante"),
            ("en", "Student"),
            ("qu", "Yachakuq"),
            ("fr", "Étudiant"),
            ("de", "Student"),
        ],
    ),
    class(
        "Libro",
        Some("Publicacion"),
        &[("es", "Libro"), ("en", "Book"), ("qu", "Mayt'u"), ("fr", "Livre"), ("de", "Buch")],
    ),
    class(
        "Revista",
        Some("PublicacionPeriodica"),
        &[
            ("es", "Revista"),
            ("en", "Magazine"),
            ("qu", "Revisita"),
            ("fr", "Magazine"),
            ("de", "Magazin"),
        ],
    ),
    class(
        "Periodico",
        Some("PublicacionPeriodica"),
        &[
            ("es", "Periódico"),
            ("en", "Newspaper"),
            ("qu", "Willakuy p'anqa"),
            ("fr", "Journal"),
            ("de", "Zeitung"),
        ],
    ),
];

const PROPERTIES: &[PropertyDecl] = &[
    data(
        "titulo",
        PropertySlot::MultiText,
        None,
        &[("es", "título"), ("en", "title"), ("qu", "suti"), ("fr", "titre"), ("de", "Titel")],
    ),
    data(
        "nombre",
        PropertySlot::MultiText,
        None,
        &[("es", "nombre"), ("en", "name"), ("qu", "suti"), ("fr", "nom"), ("de", "Name")],
    ),
    data(
        "anio_publicacion",
        PropertySlot::Integer,
        None,
        &[
            ("es", "año publicación"),
            ("en", "year"),
            ("qu", "wata"),
            ("fr", "année"),
            ("de", "Jahr"),
        ],
    ),
    data("codigo_sis", PropertySlot::SingleText, Some("Estudiante"), &[]),
    data("carrera", PropertySlot::MultiText, Some("Estudiante"), &[]),
    data("item_docente", PropertySlot::SingleText, Some("Docente"), &[]),
    data("departamento", PropertySlot::MultiText, Some("Docente"), &[]),
    data("id_empleado", PropertySlot::SingleText, Some("Bibliotecario"), &[]),
    data("turno", PropertySlot::SingleText, None, &[]),
    data("isbn", PropertySlot::SingleText, Some("Libro"), &[]),
    data("estado_libro", PropertySlot::SingleText, None, &[]),
    data("resumen", PropertySlot::MultiText, None, &[]),
    data("pais_origen", PropertySlot::SingleText, None, &[]),
    data("sitio_web", PropertySlot::SingleText, Some("Editorial"), &[]),
    data("descripcion", PropertySlot::MultiText, None, &[]),
    data("email", PropertySlot::SingleText, Some("Usuario"), &[]),
    data("fecha_registro", PropertySlot::Date, Some("Usuario"), &[]),
    object(
        "escribe",
        "Persona",
        Some("Publicacion"),
        &[
            ("es", "escribe"),
            ("en", "writes"),
            ("qu", "qillqan"),
            ("fr", "écrit"),
            ("de", "schreibt"),
        ],
    ),
    object(
        "publica",
        "Editorial",
        Some("Publicacion"),
        &[
            ("es", "publica"),
            ("en", "publishes"),
            ("qu", "ch'ipin"),
            ("fr", "publie"),
            ("de", "veröffentlicht"),
        ],
    ),
    object(
        "toma_prestado",
        "Usuario",
        Some("Libro"),
        &[
            ("es", "toma prestado"),
            ("en", "borrows"),
            ("qu", "mañakun"),
            ("fr", "emprunte"),
            ("de", "leiht aus"),
        ],
    ),
    object("gestiona", "Bibliotecario", None, &[]),
    object("trabaja_en", "Bibliotecario", Some("Biblioteca"), &[]),
];

fn merge_texts(target: &mut LocalizedTexts, texts: Labels) -> Result<(), OntologyError> {
    for (lang, text) in texts {
        target.push(LanguageTag::new(lang)?, *text);
    }
    Ok(())
}

/// Declares the library classes and properties on `ontology`.
///
/// # Errors
///
/// Fails when a persisted snapshot declares an entity under the same IRI
/// with incompatible references.
pub fn declare(ontology: &mut Ontology) -> Result<(), OntologyError> {
    for decl in CLASSES {
        let id = ontology.iri_for(decl.name)?;
        let mut class = ontology
            .class(&id)
            .cloned()
            .unwrap_or_else(|| Class::new(id));
        merge_texts(class.labels_mut(), decl.labels)?;
        merge_texts(class.comments_mut(), decl.comments)?;
        if let Some(parent) = decl.parent {
            class.add_parent(ontology.iri_for(parent)?);
        }
        ontology.declare_class(class);
    }

    for decl in PROPERTIES {
        let id = ontology.iri_for(decl.name)?;
        let mut property = Property::new(id.clone(), decl.slot);
        if let Some(existing) = ontology.property(&id) {
            *property.labels_mut() = existing.labels().clone();
            for domain in existing.domains() {
                property.add_domain(domain.clone());
            }
            for range in existing.ranges() {
                property.add_range(range.clone());
            }
        }
        merge_texts(property.labels_mut(), decl.labels)?;
        if let Some(domain) = decl.domain {
            property.add_domain(ontology.iri_for(domain)?);
        }
        if let Some(range) = decl.range {
            property.add_range(ontology.iri_for(range)?);
        }
        ontology.declare_property(property)?;
    }

    Ok(())
}

//! Bulk population of the store with sample books, authors, publishers and
//! library users.
//!
//! Books come from DBpedia when reachable and are completed with synthetic
//! records. Everything is written in a single batch and persisted once.

pub mod dbpedia;
pub mod synthetic;

use std::{fmt, time::Duration};

use chrono::{Duration as ChronoDuration, Utc};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use serde_json::{json, Value as JsonValue};

use crate::{
    config::PopulateSettings,
    ontology::{LanguageTag, Ontology, OntologyError, OntologyService, OntologyServiceError},
    search::{RemoteSearchError, SparqlClient},
};

const CAREERS: [&str; 6] = [
    "Sistemas",
    "Derecho",
    "Medicina",
    "Arquitectura",
    "Psicologia",
    "Civil",
];
const DEPARTMENTS: [&str; 4] = ["Ciencias Exactas", "Humanidades", "Salud", "Tecnología"];
const SHIFTS: [&str; 3] = ["Mañana", "Tarde", "Noche"];

const AVAILABLE: &str = "Disponible";
const BORROWED: &str = "Prestado";

/// Errors raised while populating the store.
#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    #[error("loan probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error(transparent)]
    Remote(#[from] RemoteSearchError),
    #[error(transparent)]
    Ontology(#[from] OntologyServiceError),
}

/// One book as fetched or generated, before it becomes individuals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub country: String,
}

/// How many individuals of each kind to create.
#[derive(Clone, Debug)]
pub struct PopulateOptions {
    pub books: usize,
    pub students: usize,
    pub teachers: usize,
    pub librarians: usize,
    pub loan_probability: f64,
    /// Skip DBpedia and generate every book.
    pub offline: bool,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            books: 200,
            students: 100,
            teachers: 50,
            librarians: 20,
            loan_probability: 0.7,
            offline: false,
            seed: None,
        }
    }
}

/// What a population run created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub fetched_books: usize,
    pub books: usize,
    pub authors: usize,
    pub publishers: usize,
    pub students: usize,
    pub teachers: usize,
    pub librarians: usize,
    pub loans: usize,
    pub total_individuals: usize,
}

impl fmt::Display for PopulateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "books:       {} ({} from DBpedia)",
            self.books, self.fetched_books
        )?;
        writeln!(f, "authors:     {}", self.authors)?;
        writeln!(f, "publishers:  {}", self.publishers)?;
        writeln!(f, "students:    {} ({} loans)", self.students, self.loans)?;
        writeln!(f, "teachers:    {}", self.teachers)?;
        writeln!(f, "librarians:  {}", self.librarians)?;
        write!(f, "individuals: {}", self.total_individuals)
    }
}

/// Maps accented vowels and `ñ` to ASCII and keeps only alphanumerics.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn identifier(text: &str, max: usize, suffix: u32) -> String {
    let mut id: String = sanitize(text).chars().take(max).collect();
    id.push_str(&suffix.to_string());
    id
}

/// Fetches books, completes them with synthetic ones and writes everything
/// in one batch.
///
/// # Errors
///
/// Fails on invalid options or when the batch cannot be applied or saved.
/// A failing DBpedia endpoint is logged and replaced by synthetic books.
pub async fn run(
    service: &OntologyService,
    settings: &PopulateSettings,
    options: &PopulateOptions,
) -> Result<PopulateSummary, PopulateError> {
    if !(0.0..=1.0).contains(&options.loan_probability) {
        return Err(PopulateError::InvalidProbability(options.loan_probability));
    }
    let mut rng = options
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    let mut records = if options.offline {
        Vec::new()
    } else {
        let client = SparqlClient::new(
            settings.endpoint.as_str(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        dbpedia::fetch_books(&client, options.books)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(
                    err.msg = %err,
                    err.detail = ?err,
                    "dbpedia unavailable, generating books"
                );
                Vec::new()
            })
    };
    records.truncate(options.books);
    let fetched_books = records.len();

    if records.len() < options.books {
        let missing = options.books - records.len();
        tracing::info!(missing, "filling with synthetic books");
        records.extend(synthetic::books(missing, &mut rng));
    }

    let mut summary = service
        .transact(|ontology| apply(ontology, &records, options, &mut rng))
        .await?;
    summary.fetched_books = fetched_books;
    tracing::info!(
        books = summary.books,
        students = summary.students,
        total = summary.total_individuals,
        "population finished"
    );
    Ok(summary)
}

/// Writes `records` and the generated users into `ontology`.
///
/// # Errors
///
/// Fails when the schema lacks one of the library classes or properties.
pub fn apply<R: Rng + ?Sized>(
    ontology: &mut Ontology,
    records: &[BookRecord],
    options: &PopulateOptions,
    rng: &mut R,
) -> Result<PopulateSummary, OntologyError> {
    let lang = LanguageTag::default();
    let mut summary = PopulateSummary::default();
    let mut books = Vec::with_capacity(records.len());

    for record in records {
        let suffix = rng.random_range(1000..=9999);
        let book = identifier(&record.title, 25, suffix);
        let author = identifier(&record.author, 20, suffix);
        let publisher = identifier(&record.publisher, 20, suffix);
        if ontology.individual_named(&book).is_ok() || book == author || book == publisher {
            tracing::debug!(book = %book, "book identifier already taken, skipping");
            continue;
        }

        if ontology.individual_named(&publisher).is_err() {
            ontology.create_individual(&publisher, "Editorial")?;
            ontology.assign_data(&publisher, "nombre", &json!(record.publisher), &lang)?;
            ontology.assign_data(&publisher, "pais_origen", &json!(record.country), &lang)?;
            summary.publishers += 1;
        }
        if ontology.individual_named(&author).is_err() {
            ontology.create_individual(&author, "Persona")?;
            ontology.assign_data(&author, "nombre", &json!(record.author), &lang)?;
            summary.authors += 1;
        }

        ontology.create_individual(&book, "Libro")?;
        ontology.assign_data(&book, "titulo", &json!(record.title), &lang)?;
        ontology.assign_data(
            &book,
            "anio_publicacion",
            &json!(rng.random_range(1950..=2023)),
            &lang,
        )?;
        ontology.assign_data(&book, "estado_libro", &json!(AVAILABLE), &lang)?;
        ontology.relate(&book, "escribe", &author)?;
        ontology.relate(&publisher, "publica", &book)?;

        books.push(book);
        summary.books += 1;
    }

    let today = Utc::now().date_naive();
    let mut next = 1;
    for _ in 0..options.students {
        let student = free_name(ontology, "Estudiante", &mut next);
        ontology.create_individual(&student, "Estudiante")?;
        ontology.assign_data(&student, "nombre", &json!(synthetic::person_name(rng)), &lang)?;
        ontology.assign_data(
            &student,
            "codigo_sis",
            &json!(rng.random_range(20_200_000_u32..=20_250_000).to_string()),
            &lang,
        )?;
        ontology.assign_data(&student, "carrera", &pick(&CAREERS, rng), &lang)?;
        ontology.assign_data(&student, "email", &json!(synthetic::email(rng)), &lang)?;
        let registered = today - ChronoDuration::days(rng.random_range(0..=4 * 365));
        ontology.assign_data(
            &student,
            "fecha_registro",
            &json!(registered.format("%Y-%m-%d").to_string()),
            &lang,
        )?;

        if !books.is_empty() && rng.random_bool(options.loan_probability) {
            let loans = rng.random_range(1..=2);
            for _ in 0..loans {
                let Some(book) = books.choose(rng) else {
                    break;
                };
                ontology.relate(&student, "toma_prestado", book)?;
                ontology.assign_data(book, "estado_libro", &json!(BORROWED), &lang)?;
                summary.loans += 1;
            }
        }
        summary.students += 1;
    }

    let mut next = 1;
    for _ in 0..options.teachers {
        let teacher = free_name(ontology, "Docente", &mut next);
        ontology.create_individual(&teacher, "Docente")?;
        ontology.assign_data(&teacher, "nombre", &json!(synthetic::person_name(rng)), &lang)?;
        ontology.assign_data(&teacher, "departamento", &pick(&DEPARTMENTS, rng), &lang)?;
        ontology.assign_data(
            &teacher,
            "item_docente",
            &json!(rng.random_range(1000_u32..=5000).to_string()),
            &lang,
        )?;
        summary.teachers += 1;
    }

    let mut next = 1;
    for _ in 0..options.librarians {
        let librarian = free_name(ontology, "Bibliotecario", &mut next);
        ontology.create_individual(&librarian, "Bibliotecario")?;
        ontology.assign_data(
            &librarian,
            "nombre",
            &json!(synthetic::person_name(rng)),
            &lang,
        )?;
        ontology.assign_data(&librarian, "turno", &pick(&SHIFTS, rng), &lang)?;
        ontology.assign_data(
            &librarian,
            "id_empleado",
            &json!(format!("BIB-{}", rng.random_range(100..=999))),
            &lang,
        )?;
        summary.librarians += 1;
    }

    summary.total_individuals = ontology.individuals().len();
    Ok(summary)
}

/// `{prefix}{n}` for the first `n >= next` not used yet, so repeated runs
/// add individuals instead of colliding with earlier ones.
fn free_name(ontology: &Ontology, prefix: &str, next: &mut usize) -> String {
    loop {
        let name = format!("{prefix}{next}");
        *next += 1;
        if ontology.individual_named(&name).is_err() {
            return name;
        }
    }
}

fn pick<R: Rng + ?Sized>(choices: &[&str], rng: &mut R) -> JsonValue {
    choices
        .choose(rng)
        .map_or(JsonValue::Null, |choice| json!(choice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{schema, Iri, PropertyValues, Value};

    fn library() -> Ontology {
        let mut ontology = Ontology::new(Iri::new("http://uni.edu/biblioteca.owl#").unwrap());
        schema::declare(&mut ontology).unwrap();
        ontology
    }

    fn records() -> Vec<BookRecord> {
        vec![
            BookRecord {
                title: "Cien años de soledad".to_string(),
                author: "Gabriel García Márquez".to_string(),
                publisher: "Sudamericana".to_string(),
                country: "Argentina".to_string(),
            },
            BookRecord {
                title: "Rayuela".to_string(),
                author: "Julio Cortázar".to_string(),
                publisher: "Sudamericana".to_string(),
                country: "Argentina".to_string(),
            },
        ]
    }

    fn options() -> PopulateOptions {
        PopulateOptions {
            books: 2,
            students: 4,
            teachers: 2,
            librarians: 1,
            loan_probability: 1.0,
            offline: true,
            seed: Some(1),
        }
    }

    #[test]
    fn sanitizing_strips_accents_and_symbols() {
        assert_eq!(sanitize("Cien años de soledad!"), "Cienanosdesoledad");
        assert_eq!(sanitize("Ñandú, el ave"), "Nanduelave");
        assert_eq!(identifier("Gabriel García Márquez", 20, 1234), "GabrielGarciaMarquez1234");
    }

    #[test]
    fn applies_books_and_users() {
        let mut ontology = library();
        let mut rng = StdRng::seed_from_u64(1);
        let summary = apply(&mut ontology, &records(), &options(), &mut rng).unwrap();

        assert_eq!(summary.books, 2);
        assert_eq!(summary.students, 4);
        assert_eq!(summary.teachers, 2);
        assert_eq!(summary.librarians, 1);
        assert!(summary.loans >= 4);
        assert_eq!(ontology.instances_of(&ontology.iri_for("Libro").unwrap()).len(), 2);
        assert!(ontology.individual_named("Estudiante4").is_ok());
        assert!(ontology.individual_named("Bibliotecario1").is_ok());

        let librarian = ontology.individual_named("Bibliotecario1").unwrap();
        let employee = ontology.property_named("id_empleado").unwrap();
        let Some(PropertyValues::Single(Value::Text(id))) = librarian.value(employee.id()) else {
            panic!("missing employee id");
        };
        assert!(id.starts_with("BIB-"));
    }

    #[test]
    fn borrowed_books_change_state() {
        let mut ontology = library();
        let mut rng = StdRng::seed_from_u64(3);
        apply(&mut ontology, &records(), &options(), &mut rng).unwrap();

        let state = ontology.property_named("estado_libro").unwrap().id().clone();
        let libro = ontology.iri_for("Libro").unwrap();
        let borrowed = ontology
            .instances_of(&libro)
            .into_iter()
            .filter(|book| {
                matches!(
                    book.value(&state),
                    Some(PropertyValues::Single(Value::Text(text))) if text == BORROWED
                )
            })
            .count();
        assert!(borrowed >= 1);
    }

    #[test]
    fn repeated_runs_add_new_users() {
        let mut ontology = library();
        let mut rng = StdRng::seed_from_u64(5);
        let options = PopulateOptions {
            books: 0,
            ..options()
        };
        apply(&mut ontology, &[], &options, &mut rng).unwrap();
        apply(&mut ontology, &[], &options, &mut rng).unwrap();
        assert!(ontology.individual_named("Estudiante8").is_ok());
        assert!(ontology.individual_named("Docente4").is_ok());
    }

    #[tokio::test]
    async fn offline_runs_persist_once() {
        let repository =
            std::sync::Arc::new(crate::ontology::InMemoryOntologyRepository::default());
        let service = OntologyService::open(
            repository.clone(),
            Iri::new("http://uni.edu/biblioteca.owl#").unwrap(),
        )
        .await
        .unwrap();

        let summary = run(&service, &PopulateSettings::default(), &options())
            .await
            .unwrap();
        assert_eq!(summary.fetched_books, 0);
        assert_eq!(summary.books, 2);
        assert_eq!(repository.saves(), 2);
    }

    #[tokio::test]
    async fn invalid_probabilities_are_rejected() {
        let service = OntologyService::open(
            std::sync::Arc::new(crate::ontology::InMemoryOntologyRepository::default()),
            Iri::new("http://uni.edu/biblioteca.owl#").unwrap(),
        )
        .await
        .unwrap();
        let options = PopulateOptions {
            loan_probability: 1.5,
            ..options()
        };
        let err = run(&service, &PopulateSettings::default(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, PopulateError::InvalidProbability(_)));
    }
}

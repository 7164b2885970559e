use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use oxigraph::{
    model::Term,
    sparql::{QueryResults, SparqlEvaluator},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::{
    config::{OntologyBackend, OntologySettings},
    ontology::{
        entities::{Individual, Ontology, OntologyError, PropertyKind},
        rdf::{self, RdfError},
        repositories::{OntologyRepository, OntologySnapshot, OntologySummary},
        schema,
        value_objects::{Iri, IriError, LanguageTag},
    },
};

/// Type alias simplifying repository trait object usage inside the service.
pub type RepositoryHandle =
    dyn OntologyRepository<Error = OntologyServiceError> + Send + Sync + 'static;

/// Class name reported for individuals without any asserted class.
const THING: &str = "Thing";

/// Owns the in-memory ontology and persists it after every mutation.
///
/// Writers hold the lock across the mutation and the save that follows it,
/// so concurrent requests never interleave on the aggregate.
pub struct OntologyService {
    repository: Arc<RepositoryHandle>,
    ontology: RwLock<Ontology>,
}

impl OntologyService {
    /// Opens the store: loads the persisted snapshot (or starts empty),
    /// declares the library schema on top of it and saves the result.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot cannot be loaded, parsed or saved.
    pub async fn open(
        repository: Arc<RepositoryHandle>,
        base: Iri,
    ) -> Result<Self, OntologyServiceError> {
        let mut ontology = match repository.load().await? {
            Some(snapshot) => {
                tracing::info!(location = %repository.location(), "loading existing ontology");
                snapshot.restore(&base)?
            }
            None => {
                tracing::info!(location = %repository.location(), "creating ontology from scratch");
                Ontology::new(base)
            }
        };
        schema::declare(&mut ontology)?;
        repository.save(&OntologySnapshot::from(&ontology)).await?;

        let summary = OntologySummary::from(&ontology);
        tracing::info!(
            classes = summary.class_count,
            properties = summary.property_count,
            individuals = summary.individual_count,
            "ontology initialized"
        );

        Ok(Self {
            repository,
            ontology: RwLock::new(ontology),
        })
    }

    /// Builds a service instance from configuration settings.
    ///
    /// # Errors
    ///
    /// Fails when the base IRI is invalid or the store cannot be opened.
    pub async fn from_config(settings: &OntologySettings) -> Result<Self, OntologyServiceError> {
        let base = Iri::new(settings.base_iri.as_str())?;
        let repository: Arc<RepositoryHandle> = match settings.backend {
            OntologyBackend::File => Arc::new(FileOntologyRepository::new(&settings.path)),
            OntologyBackend::InMemory => Arc::new(InMemoryOntologyRepository::default()),
        };
        Self::open(repository, base).await
    }

    /// Returns a clone of the repository handle.
    pub fn repository(&self) -> Arc<RepositoryHandle> {
        Arc::clone(&self.repository)
    }

    /// Acquires shared read access to the aggregate.
    pub async fn read(&self) -> RwLockReadGuard<'_, Ontology> {
        self.ontology.read().await
    }

    /// Runs `mutation` under the write lock and persists the whole store if
    /// it succeeds.
    ///
    /// Changes are not rolled back: when saving fails the in-memory mutation
    /// remains and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the mutation error, or the repository error raised while saving.
    pub async fn transact<T, F>(&self, mutation: F) -> Result<T, OntologyServiceError>
    where
        F: FnOnce(&mut Ontology) -> Result<T, OntologyError> + Send,
        T: Send,
    {
        let mut ontology = self.ontology.write().await;
        let output = mutation(&mut ontology)?;
        let snapshot = OntologySnapshot::from(&*ontology);
        self.repository.save(&snapshot).await?;
        Ok(output)
    }

    /// Creates an individual of the named class.
    pub async fn create_individual(
        &self,
        name: &str,
        class_name: &str,
    ) -> Result<(), OntologyServiceError> {
        self.transact(|ontology| ontology.create_individual(name, class_name).map(|_| ()))
            .await
    }

    /// Sets or appends a data value on an individual.
    pub async fn assign_data(
        &self,
        individual: &str,
        property: &str,
        value: &JsonValue,
        lang: &LanguageTag,
    ) -> Result<(), OntologyServiceError> {
        self.transact(|ontology| ontology.assign_data(individual, property, value, lang))
            .await
    }

    /// Links two individuals through an object property.
    pub async fn relate(
        &self,
        subject: &str,
        property: &str,
        object: &str,
    ) -> Result<(), OntologyServiceError> {
        self.transact(|ontology| ontology.relate(subject, property, object))
            .await
    }

    /// Describes the named individual.
    pub async fn describe(&self, name: &str) -> Result<IndividualView, OntologyServiceError> {
        let ontology = self.read().await;
        let individual = ontology.individual_named(name)?;
        Ok(IndividualView::new(&ontology, individual))
    }

    /// Describes every instance of the named class, subclasses included.
    ///
    /// Unknown class names yield an empty list.
    pub async fn instances_of(&self, class_name: &str) -> Vec<IndividualView> {
        let ontology = self.read().await;
        let Ok(class) = ontology.class_named(class_name) else {
            return Vec::new();
        };
        ontology
            .instances_of(class.id())
            .into_iter()
            .map(|individual| IndividualView::new(&ontology, individual))
            .collect()
    }

    /// Serializes the current state.
    pub async fn snapshot(&self) -> OntologySnapshot {
        OntologySnapshot::from(&*self.read().await)
    }

    pub async fn summary(&self) -> OntologySummary {
        OntologySummary::from(&*self.read().await)
    }

    /// Evaluates a SPARQL query against the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyServiceError::Sparql`] when the query cannot be
    /// parsed or evaluated.
    pub async fn sparql(&self, query: &str) -> Result<SparqlResults, OntologyServiceError> {
        let snapshot = self.snapshot().await;
        let store = rdf::load_store(&snapshot.document)?;
        evaluate(&store, query)
    }
}

/// Rendering of a term inside SPARQL results.
fn term_value(term: &Term) -> JsonValue {
    match term {
        Term::NamedNode(node) => JsonValue::String(node.as_str().to_string()),
        Term::Literal(literal) => JsonValue::String(literal.value().to_string()),
        other => JsonValue::String(other.to_string()),
    }
}

fn evaluate(
    store: &oxigraph::store::Store,
    query: &str,
) -> Result<SparqlResults, OntologyServiceError> {
    let results = SparqlEvaluator::new()
        .parse_query(query)
        .map_err(OntologyServiceError::sparql)?
        .on_store(store)
        .execute()
        .map_err(OntologyServiceError::sparql)?;
    match results {
        QueryResults::Solutions(solutions) => {
            let variables: Vec<String> = solutions
                .variables()
                .iter()
                .map(|variable| variable.as_str().to_string())
                .collect();
            let mut rows = Vec::new();
            for solution in solutions {
                let solution = solution.map_err(OntologyServiceError::sparql)?;
                let row = variables
                    .iter()
                    .map(|variable| {
                        solution
                            .get(variable.as_str())
                            .map_or(JsonValue::Null, term_value)
                    })
                    .collect();
                rows.push(row);
            }
            Ok(SparqlResults { variables, rows })
        }
        QueryResults::Boolean(answer) => Ok(SparqlResults {
            variables: Vec::new(),
            rows: vec![vec![JsonValue::Bool(answer)]],
        }),
        QueryResults::Graph(triples) => {
            let mut rows = Vec::new();
            for triple in triples {
                let triple = triple.map_err(OntologyServiceError::sparql)?;
                rows.push(vec![
                    term_value(&Term::from(triple.subject)),
                    JsonValue::String(triple.predicate.as_str().to_string()),
                    term_value(&triple.object),
                ]);
            }
            Ok(SparqlResults {
                variables: vec!["s".to_string(), "p".to_string(), "o".to_string()],
                rows,
            })
        }
    }
}

/// Tabular result of a SPARQL query.
///
/// `ASK` queries produce a single row holding the boolean answer; graph
/// queries produce one `s p o` row per triple.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SparqlResults {
    pub variables: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

/// Read model of an individual split into data values and relations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndividualView {
    pub id: String,
    /// Local name of the most specific asserted class.
    pub class: String,
    pub data: BTreeMap<String, Vec<String>>,
    pub relations: BTreeMap<String, Vec<String>>,
}

impl IndividualView {
    #[must_use]
    pub fn new(ontology: &Ontology, individual: &Individual) -> Self {
        let class = ontology
            .most_specific_type(individual)
            .map_or_else(|| THING.to_string(), |ty| ty.local_name().to_string());

        let mut data = BTreeMap::new();
        let mut relations = BTreeMap::new();
        for (property_id, values) in individual.values() {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            let target = match ontology.property(property_id).map(|p| p.kind()) {
                Some(PropertyKind::Object) => &mut relations,
                _ => &mut data,
            };
            target.insert(property_id.local_name().to_string(), rendered);
        }

        Self {
            id: individual.name().to_string(),
            class,
            data,
            relations,
        }
    }
}

/// Errors raised by ontology infrastructure components.
#[derive(Debug, thiserror::Error)]
pub enum OntologyServiceError {
    /// Domain validation failed when mutating the ontology aggregate.
    #[error(transparent)]
    Domain(#[from] OntologyError),
    /// The configured base IRI is invalid.
    #[error(transparent)]
    Iri(#[from] IriError),
    /// The persisted snapshot could not be read.
    #[error(transparent)]
    Snapshot(#[from] RdfError),
    /// The SPARQL query could not be parsed or evaluated.
    #[error("{0}")]
    Sparql(String),
    /// Accessing the snapshot file failed.
    #[error("failed to access ontology file `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl OntologyServiceError {
    fn sparql(err: impl std::fmt::Display) -> Self {
        Self::Sparql(err.to_string())
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Persists the snapshot in a single N-Triples file.
///
/// Saves write a sibling temporary file and rename it over the target.
#[derive(Clone, Debug)]
pub struct FileOntologyRepository {
    path: PathBuf,
}

impl FileOntologyRepository {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, document: &str) -> Result<(), OntologyServiceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| OntologyServiceError::io(parent, err))?;
        }
        let temporary = self.temporary_path();
        tokio::fs::write(&temporary, document.as_bytes())
            .await
            .map_err(|err| OntologyServiceError::io(&temporary, err))?;
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&temporary)
            .await
            .map_err(|err| OntologyServiceError::io(&temporary, err))?;
        file.sync_all()
            .await
            .map_err(|err| OntologyServiceError::io(&temporary, err))?;
        tokio::fs::rename(&temporary, &self.path)
            .await
            .map_err(|err| OntologyServiceError::io(&self.path, err))
    }
}

#[async_trait]
impl OntologyRepository for FileOntologyRepository {
    type Error = OntologyServiceError;

    async fn load(&self) -> Result<Option<OntologySnapshot>, Self::Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(document) => Ok(Some(OntologySnapshot { document })),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(OntologyServiceError::io(&self.path, err)),
        }
    }

    async fn save(&self, snapshot: &OntologySnapshot) -> Result<(), Self::Error> {
        self.write(&snapshot.document).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the snapshot in memory and counts saves.
#[derive(Debug, Default)]
pub struct InMemoryOntologyRepository {
    document: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl InMemoryOntologyRepository {
    /// Creates a repository pre-seeded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: OntologySnapshot) -> Self {
        Self {
            document: Mutex::new(Some(snapshot.document)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of saves performed so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Returns the last saved document.
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OntologyRepository for InMemoryOntologyRepository {
    type Error = OntologyServiceError;

    async fn load(&self) -> Result<Option<OntologySnapshot>, Self::Error> {
        Ok(self.document().map(|document| OntologySnapshot { document }))
    }

    async fn save(&self, snapshot: &OntologySnapshot) -> Result<(), Self::Error> {
        let mut guard = self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(snapshot.document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

//! # Configuration
//!
//! Settings are read from `config/{environment}.yaml` (or
//! `config/{environment}.local.yaml` when present). The file is first
//! rendered as a Tera template so values can come from the environment:
//!
//! ```yaml
//! server:
//!   port: {{ get_env(name="PORT", default="5150") }}
//! ```
//!
//! Set `BIBLIOTECA_CONFIG_FOLDER` to read the files from another folder.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{environment::Environment, logger, Error, Result};

static DEFAULT_FOLDER: OnceLock<PathBuf> = OnceLock::new();

fn default_folder() -> &'static PathBuf {
    DEFAULT_FOLDER.get_or_init(|| {
        std::env::var("BIBLIOTECA_CONFIG_FOLDER")
            .map_or_else(|_| PathBuf::from("config"), PathBuf::from)
    })
}

/// Main application configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub logger: Logger,
    pub server: Server,
    #[serde(default)]
    pub ontology: OntologySettings,
    #[serde(default)]
    pub remote_search: RemoteSearchSettings,
    #[serde(default)]
    pub i18n: I18nSettings,
    #[serde(default)]
    pub populate: PopulateSettings,
}

/// Logger configuration
///
/// Example (development):
/// ```yaml
/// logger:
///   enable: true
///   level: debug
///   format: compact
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Logger {
    /// Enable log write to stdout
    pub enable: bool,

    /// Set the logger level.
    pub level: logger::LogLevel,

    /// Set the logger format.
    pub format: logger::Format,

    /// Override the default filter with a custom `EnvFilter` directive.
    pub override_filter: Option<String>,

    /// Set this if you want to write log to file
    pub file_appender: Option<LoggerFileAppender>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: true,
            level: logger::LogLevel::Info,
            format: logger::Format::Compact,
            override_filter: None,
            file_appender: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggerFileAppender {
    /// Enable logger file appender
    pub enable: bool,

    /// Enable write log to file non-blocking
    #[serde(default)]
    pub non_blocking: bool,

    /// Set the logger file appender level.
    pub level: logger::LogLevel,

    /// Set the logger file appender format.
    pub format: logger::Format,

    /// Set the logger file appender rotation.
    pub rotation: logger::Rotation,

    /// Set the logger file appender dir
    ///
    /// default is `./logs`
    pub dir: Option<String>,

    /// Set log filename prefix
    pub filename_prefix: Option<String>,

    /// Set log filename suffix
    pub filename_suffix: Option<String>,

    /// Set the logger file appender keep max log files.
    pub max_log_files: usize,
}

/// Server configuration structure.
///
/// Example (development):
/// ```yaml
/// server:
///   port: {{ get_env(name="NODE_PORT", default=5150) }}
///   host: http://localhost
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Server {
    /// Address to bind the server to
    #[serde(default = "default_binding")]
    pub binding: String,
    /// The port on which the server should listen for incoming connections.
    pub port: u16,
    /// The webserver host
    pub host: String,
    #[serde(default)]
    pub cors: CorsSettings,
}

fn default_binding() -> String {
    "localhost".to_string()
}

impl Default for Server {
    fn default() -> Self {
        Self {
            binding: default_binding(),
            port: 5150,
            host: "http://localhost".to_string(),
            cors: CorsSettings::default(),
        }
    }
}

impl Server {
    #[must_use]
    pub fn full_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cross-origin settings. The frontend is served from another origin, so
/// the permissive policy is enabled by default.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsSettings {
    pub enable: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self { enable: true }
    }
}

/// Storage backend of the ontology store.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OntologyBackend {
    /// Single N-Triples file rewritten after every mutation.
    #[default]
    File,
    /// Nothing is written to disk.
    InMemory,
}

/// Ontology store settings.
///
/// ```yaml
/// ontology:
///   backend: file
///   path: biblioteca.nt
///   base_iri: "http://uni.edu/biblioteca.owl#"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OntologySettings {
    #[serde(default)]
    pub backend: OntologyBackend,
    #[serde(default = "default_ontology_path")]
    pub path: PathBuf,
    #[serde(default = "default_base_iri")]
    pub base_iri: String,
}

fn default_ontology_path() -> PathBuf {
    PathBuf::from("biblioteca.nt")
}

fn default_base_iri() -> String {
    "http://uni.edu/biblioteca.owl#".to_string()
}

impl Default for OntologySettings {
    fn default() -> Self {
        Self {
            backend: OntologyBackend::default(),
            path: default_ontology_path(),
            base_iri: default_base_iri(),
        }
    }
}

/// Remote knowledge base used by the online search.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteSearchSettings {
    pub enable: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub limit: usize,
}

impl Default for RemoteSearchSettings {
    fn default() -> Self {
        Self {
            enable: true,
            endpoint: "https://dbpedia.org/sparql".to_string(),
            timeout_secs: 15,
            limit: 10,
        }
    }
}

/// Languages offered by the translation endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nSettings {
    pub supported: Vec<String>,
    pub default: String,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            supported: ["es", "en", "qu", "fr", "de"]
                .into_iter()
                .map(String::from)
                .collect(),
            default: "es".to_string(),
        }
    }
}

/// Source of real book records for the `populate` command.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PopulateSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for PopulateSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://es.dbpedia.org/sparql".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Creates a new configuration instance based on the specified environment.
    ///
    /// # Errors
    ///
    /// Returns an error when no configuration file exists for the environment
    /// or when it cannot be rendered or parsed.
    pub fn new(env: &Environment) -> Result<Self> {
        Self::from_folder(env, default_folder().as_path())
    }

    /// Loads configuration settings from a folder for the specified
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error when no configuration file exists for the environment
    /// or when it cannot be rendered or parsed.
    pub fn from_folder(env: &Environment, path: &Path) -> Result<Self> {
        let files = [
            path.join(format!("{env}.local.yaml")),
            path.join(format!("{env}.yaml")),
        ];

        let selected_path = files.iter().find(|p| p.exists()).ok_or_else(|| {
            Error::Message(format!(
                "no configuration file found in folder: {}",
                path.display()
            ))
        })?;

        info!(selected_path =? selected_path, "loading environment from");

        let content = fs::read_to_string(selected_path)?;
        let rendered = render_string(&content)?;

        serde_yaml::from_str(&rendered)
            .map_err(|err| Error::YAMLFile(err, selected_path.to_string_lossy().to_string()))
    }
}

/// Renders a configuration template, exposing `get_env` to the template.
fn render_string(content: &str) -> Result<String> {
    let context = tera::Context::new();
    Ok(tera::Tera::one_off(content, &context, false)?)
}

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::Serialize;
use thiserror::Error;

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// The constructor rejects malformed identifiers in order to guarantee that
    /// every entity uses canonical identifiers.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Builds the IRI of an entity named `name` under the `base` namespace.
    ///
    /// Names are local identifiers such as `Libro` or `Estudiante1`; anything
    /// that would break out of the fragment (whitespace, `#`, `/`, `<`, ...)
    /// is rejected.
    pub fn from_local_name(base: &Iri, name: &str) -> Result<Self, IriError> {
        let invalid = name.is_empty()
            || name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '#' | '/' | '?' | '<' | '>' | '"'));
        if invalid {
            return Err(IriError::InvalidName {
                name: name.to_string(),
            });
        }
        Self::new(format!("{}{name}", base.as_str()))
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the local name, i.e. the text after the last `#` or `/`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.value
            .rsplit(['#', '/'])
            .next()
            .unwrap_or(self.value.as_str())
    }

    /// Converts the value object into an RDF named node.
    #[must_use]
    pub fn to_named_node(&self) -> NamedNode {
        NamedNode::new_unchecked(self.value.clone())
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
    /// The provided local name cannot be appended to the ontology namespace.
    #[error("invalid entity name: `{name}`")]
    InvalidName { name: String },
}

/// A BCP47-like language tag (`es`, `en`, `pt-BR`), kept in lowercase as RDF
/// stores compare tags case-insensitively and read them back lowercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parses a language tag: a 2-3 letter primary subtag optionally
    /// followed by alphanumeric subtags of up to 8 characters.
    pub fn new(value: &str) -> Result<Self, LanguageTagError> {
        let mut parts = value.split('-');
        let primary = parts.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(LanguageTagError(value.to_string()));
        }
        for part in parts {
            if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(LanguageTagError(value.to_string()));
            }
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Spanish, the language of the library schema.
impl Default for LanguageTag {
    fn default() -> Self {
        Self("es".to_string())
    }
}

impl Display for LanguageTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageTag {
    type Err = LanguageTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid language tag: `{0}`")]
pub struct LanguageTagError(pub String);

/// Language-tagged texts attached to an entity, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalizedTexts {
    entries: Vec<(LanguageTag, String)>,
}

impl LocalizedTexts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text in the given language, ignoring exact duplicates.
    pub fn push(&mut self, lang: LanguageTag, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.entries.iter().any(|(l, t)| *l == lang && *t == text) {
            return false;
        }
        self.entries.push((lang, text));
        true
    }

    /// Returns the first text recorded for `lang`.
    #[must_use]
    pub fn get(&self, lang: &LanguageTag) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, text)| text.as_str())
    }

    /// Returns the first text regardless of language.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.entries.first().map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LanguageTag, &str)> {
        self.entries.iter().map(|(lang, text)| (lang, text.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

//! Schema translations: every class and property name mapped to its label
//! in a requested language.

use std::collections::BTreeMap;

use crate::{
    config::I18nSettings,
    ontology::{LanguageTag, LocalizedTexts, Ontology},
};

/// Errors raised when resolving a translation language.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Idioma no soportado. Use: {}", .supported.join(", "))]
    Unsupported { supported: Vec<String> },
}

/// Languages the schema can be translated to.
#[derive(Clone, Debug)]
pub struct Languages {
    supported: Vec<LanguageTag>,
    default: LanguageTag,
}

impl Languages {
    /// Builds the language set from configuration, skipping malformed tags.
    #[must_use]
    pub fn from_config(settings: &I18nSettings) -> Self {
        let supported = settings
            .supported
            .iter()
            .filter_map(|code| match LanguageTag::new(code) {
                Ok(tag) => Some(tag),
                Err(err) => {
                    tracing::warn!(code = %code, err.msg = %err, "ignoring configured language");
                    None
                }
            })
            .collect();
        let default = LanguageTag::new(&settings.default).unwrap_or_else(|err| {
            tracing::warn!(err.msg = %err, "invalid default language, using `es`");
            LanguageTag::default()
        });
        Self { supported, default }
    }

    #[must_use]
    pub fn default_language(&self) -> &LanguageTag {
        &self.default
    }

    /// Resolves `code` against the supported languages.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Unsupported`] for any other code.
    pub fn resolve(&self, code: &str) -> Result<LanguageTag, TranslationError> {
        LanguageTag::new(code)
            .ok()
            .filter(|tag| self.supported.contains(tag))
            .ok_or_else(|| TranslationError::Unsupported {
                supported: self.supported.iter().map(ToString::to_string).collect(),
            })
    }

    /// Maps every class and property name to its label in `lang`, falling
    /// back to the default language and then to the raw name.
    #[must_use]
    pub fn translate(&self, ontology: &Ontology, lang: &LanguageTag) -> BTreeMap<String, String> {
        let pick = |name: &str, labels: &LocalizedTexts| {
            labels
                .get(lang)
                .or_else(|| labels.get(&self.default))
                .unwrap_or(name)
                .to_string()
        };

        let mut translations = BTreeMap::new();
        for class in ontology.classes().values() {
            translations.insert(class.name().to_string(), pick(class.name(), class.labels()));
        }
        for property in ontology.properties().values() {
            translations.insert(
                property.name().to_string(),
                pick(property.name(), property.labels()),
            );
        }
        translations
    }
}

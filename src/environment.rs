//! # Application Environment
//!
//! The environment selects which configuration file is loaded. It is read
//! from `BIBLIOTECA_ENV` and defaults to `development`.
//!
//! ```rust
//! use biblioteca::environment::Environment;
//!
//! let env: Environment = "qa".to_string().into();
//! assert_eq!(env.to_string(), "qa");
//! ```

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{config::Config, Result};

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const BIBLIOTECA_ENV: &str = "BIBLIOTECA_ENV";

impl From<String> for Environment {
    fn from(env: String) -> Self {
        Self::from_str(&env).unwrap_or(Self::Any(env))
    }
}

/// Reads the environment name from `BIBLIOTECA_ENV`.
#[must_use]
pub fn resolve_from_env() -> String {
    std::env::var(BIBLIOTECA_ENV).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string())
}

/// Application environment
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub enum Environment {
    #[serde(rename = "production")]
    Production,
    #[default]
    #[serde(rename = "development")]
    Development,
    #[serde(rename = "test")]
    Test,
    Any(String),
}

impl Environment {
    /// Load environment variables from local configuration
    ///
    /// # Errors
    ///
    /// Returns error if an error occurs during loading
    /// configuration file an parse the content into [`Config`] struct.
    pub fn load(&self) -> Result<Config> {
        Config::new(self)
    }

    /// Load environment variables from the given config path
    ///
    /// # Errors
    ///
    /// Returns error if an error occurs during loading
    /// configuration file an parse the content into [`Config`] struct.
    pub fn load_from_folder(&self, path: &Path) -> Result<Config> {
        Config::from_folder(self, path)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => "production".fmt(f),
            Self::Development => "development".fmt(f),
            Self::Test => "test".fmt(f),
            Self::Any(s) => s.fmt(f),
        }
    }
}

impl FromStr for Environment {
    type Err = &'static str;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            _ => Err(
                "error parsing environment: expected one of \"production\", \"development\", \"test\"",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!("production", Environment::Production.to_string());
        assert_eq!("development", Environment::Development.to_string());
        assert_eq!("test", Environment::Test.to_string());
        assert_eq!("qa", Environment::Any("qa".to_string()).to_string());
    }

    #[test]
    fn test_into() {
        let e: Environment = "production".to_string().into();
        assert_eq!(e, Environment::Production);
        let e: Environment = "custom".to_string().into();
        assert_eq!(e, Environment::Any("custom".to_string()));
    }
}

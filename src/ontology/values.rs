//! Typed property slots and the values they hold.
//!
//! Every property name is bound to a [`PropertySlot`] when the schema is
//! declared or loaded. The slot decides how raw request values are coerced
//! and which shape ([`PropertyValues::Single`] or [`PropertyValues::Many`])
//! the first assignment creates.

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::value_objects::Iri;

/// Date format accepted for [`PropertySlot::Date`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Typed accessor bound to a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertySlot {
    SingleText,
    MultiText,
    Integer,
    Date,
    References,
}

impl PropertySlot {
    /// Whether a first assignment starts a collection rather than a scalar.
    #[must_use]
    pub fn is_multi_valued(self) -> bool {
        matches!(self, Self::MultiText | Self::References)
    }

    /// Whether the slot links individuals.
    #[must_use]
    pub fn is_reference(self) -> bool {
        matches!(self, Self::References)
    }

    /// Kind of literal expected by the slot, used in error messages.
    #[must_use]
    pub fn expected(self) -> &'static str {
        match self {
            Self::SingleText | Self::MultiText => "text",
            Self::Integer => "integer",
            Self::Date => "date (YYYY-MM-DD)",
            Self::References => "individual",
        }
    }

    /// Coerces a raw JSON request value into a typed [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the JSON value cannot be represented by
    /// the slot. Reference slots never accept literals.
    pub fn coerce(self, raw: &JsonValue) -> Result<Value, ValueError> {
        let mismatch = || ValueError::Mismatch {
            expected: self.expected(),
            found: raw.to_string(),
        };
        match self {
            Self::SingleText | Self::MultiText => match raw {
                JsonValue::String(text) => Ok(Value::Text(text.clone())),
                JsonValue::Number(number) => Ok(Value::Text(number.to_string())),
                JsonValue::Bool(flag) => Ok(Value::Text(flag.to_string())),
                _ => Err(mismatch()),
            },
            Self::Integer => match raw {
                JsonValue::Number(number) => {
                    number.as_i64().map(Value::Integer).ok_or_else(mismatch)
                }
                JsonValue::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            Self::Date => match raw {
                JsonValue::String(text) => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            Self::References => Err(mismatch()),
        }
    }

    /// Parses the lexical form stored in a snapshot.
    pub fn parse_lexical(self, lexical: &str) -> Result<Value, ValueError> {
        self.coerce(&JsonValue::String(lexical.to_string()))
    }
}

/// A single property value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Reference(Iri),
}

impl Value {
    /// Returns the text when the value is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<&Iri> {
        match self {
            Self::Reference(iri) => Some(iri),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Reference(iri) => f.write_str(iri.local_name()),
        }
    }
}

/// Values held by an individual for one property.
///
/// The representation, not the declared cardinality, drives mutation: a
/// collection grows, a scalar is replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValues {
    Single(Value),
    Many(Vec<Value>),
}

impl PropertyValues {
    /// Creates the first representation for a slot.
    #[must_use]
    pub fn first(slot: PropertySlot, value: Value) -> Self {
        if slot.is_multi_valued() {
            Self::Many(vec![value])
        } else {
            Self::Single(value)
        }
    }

    /// Appends to a collection or overwrites a scalar.
    pub fn assign(&mut self, value: Value) {
        match self {
            Self::Many(values) => values.push(value),
            Self::Single(current) => *current = value,
        }
    }

    /// Iterates over every value in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        let values: &[Value] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        values.iter()
    }

    /// Returns the first value.
    #[must_use]
    pub fn first_value(&self) -> Option<&Value> {
        self.iter().next()
    }

    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// Errors raised while coercing raw values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected {expected} value, got {found}")]
    Mismatch {
        expected: &'static str,
        found: String,
    },
}

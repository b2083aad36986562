//! Additional metadata fields and their pyproject configuration.
//!
//! Projects declare extra core metadata fields in `pyproject.toml`:
//!
//! ```toml
//! [tool.setuptools-ext]
//! requires-external = ["C", "libpng (>=1.5)"]
//! supported-platform = "RedHat 8.3"
//! ```
//!
//! Keys are matched case-insensitively against a fixed allow-list and
//! normalized to the canonical header spelling. Unknown keys are ignored
//! with a warning, and a single string is coerced to a one-element list
//! (also with a warning).

use std::path::Path;

use toml::{Table, Value};

use crate::{Error, Result};

/// Name of the pyproject `[tool.*]` table holding the additional fields.
pub const TOOL_TABLE: &str = "setuptools-ext";

/// Core metadata fields that may be added, in canonical spelling.
pub const ALLOWED_FIELDS: [&str; 6] = [
    "Platform",
    "Supported-Platform",
    "Download-URL",
    "Requires-External",
    "Provides-Dist",
    "Obsoletes-Dist",
];

/// Returns the canonical spelling of an allowed field, ignoring ASCII case.
pub fn canonical_field(key: &str) -> Option<&'static str> {
    ALLOWED_FIELDS
        .iter()
        .copied()
        .find(|field| field.eq_ignore_ascii_case(key))
}

/// An ordered list of fields to add to `METADATA`, each with its values.
///
/// Field order is the merge order, so output stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraMetadata {
    fields: Vec<(String, Vec<String>)>,
}

impl ExtraMetadata {
    /// Creates an empty set of additions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the additions from a `pyproject.toml` file.
    pub fn from_pyproject_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_pyproject_str(&text)
    }

    /// Reads the additions from `pyproject.toml` contents.
    ///
    /// A missing `[tool.setuptools-ext]` table yields an empty result.
    pub fn from_pyproject_str(text: &str) -> Result<Self> {
        let document: Table = text.parse()?;
        let table = match document.get("tool").and_then(|tool| tool.get(TOOL_TABLE)) {
            Some(Value::Table(table)) => table,
            Some(other) => {
                return Err(Error::InvalidConfig {
                    key: format!("tool.{}", TOOL_TABLE),
                    reason: format!("expected a table, found {}", other.type_str()),
                });
            }
            None => return Ok(Self::new()),
        };
        Self::from_table(table)
    }

    /// Normalizes an already-parsed `[tool.setuptools-ext]` table.
    pub fn from_table(table: &Table) -> Result<Self> {
        let mut extra = Self::new();
        for (key, value) in table {
            let Some(field) = canonical_field(key) else {
                log::warn!("Ignoring unsupported option {} = {}", key, value);
                continue;
            };
            let values = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        other => Err(Error::InvalidConfig {
                            key: key.clone(),
                            reason: format!("expected strings, found {}", other.type_str()),
                        }),
                    })
                    .collect::<Result<Vec<_>>>()?,
                Value::String(s) => {
                    log::warn!("Coercing the value of {} from string to list", key);
                    vec![s.clone()]
                }
                other => {
                    return Err(Error::InvalidConfig {
                        key: key.clone(),
                        reason: format!(
                            "expected a string or an array of strings, found {}",
                            other.type_str()
                        ),
                    });
                }
            };
            extra.insert(field, values);
        }
        Ok(extra)
    }

    /// Sets the values for `field`, replacing earlier values in place.
    pub fn insert<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = values,
            None => self.fields.push((field.to_string(), values)),
        }
    }

    /// Appends one value to `field`, creating the field if needed.
    pub fn push(&mut self, field: &str, value: impl Into<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1.push(value.into()),
            None => self.fields.push((field.to_string(), vec![value.into()])),
        }
    }

    /// Returns the values for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterates over `(field, values)` in merge order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there is nothing to add.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, values)| values.is_empty())
    }
}

//! Value construction: declared type name to typed value.
//!
//! Two paths. Dates need the per-rule parse pattern, so `"date"` is routed
//! through a dedicated branch; every other type name is resolved in the
//! registry to a single-string factory.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::value::FieldValue;
use crate::error::{RowError, RowResult};

/// Type name routed through the date path.
pub const DATE_TYPE: &str = "date";

/// Factory building a typed value from a formatted string.
pub type Factory = Box<dyn Fn(&str) -> RowResult<FieldValue> + Send + Sync>;

/// Registry mapping declared type names to single-string factories.
///
/// Built-ins cover `integer`, `decimal`, and `string`. New names can be
/// registered without touching the engine; resolving an unregistered name
/// is a reportable [`RowError::UnknownType`], never a silent default.
/// Resolution happens per rule application, so a bad name in a rule shows
/// up at run time, not at load time.
pub struct ConstructorRegistry {
    factories: HashMap<String, Factory>,
}

impl ConstructorRegistry {
    /// Create a registry holding only the built-in factories.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register("integer", |input| {
            input
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| RowError::Format {
                    kind: "integer".into(),
                    value: input.into(),
                    reason: e.to_string(),
                })
        });

        registry.register("decimal", |input| {
            BigDecimal::from_str(input)
                .map(FieldValue::Decimal)
                .map_err(|e| RowError::Format {
                    kind: "decimal".into(),
                    value: input.into(),
                    reason: e.to_string(),
                })
        });

        registry.register("string", |input| Ok(FieldValue::Text(input.to_string())));

        registry
    }

    /// Register a factory under a type name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&str) -> RowResult<FieldValue> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Build a typed value from a formatted string.
    ///
    /// `date_format` is consulted only on the date path; date rules carry
    /// it from the rule set.
    pub fn construct(
        &self,
        type_name: &str,
        input: &str,
        date_format: Option<&str>,
    ) -> RowResult<FieldValue> {
        if type_name == DATE_TYPE {
            let pattern = date_format.ok_or_else(|| RowError::Format {
                kind: DATE_TYPE.into(),
                value: input.into(),
                reason: "no date format pattern".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(input, pattern).map_err(|source| RowError::DateParse {
                    value: input.into(),
                    pattern: pattern.into(),
                    source,
                })?;
            return Ok(FieldValue::Date(date));
        }

        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| RowError::UnknownType {
                name: type_name.into(),
            })?;
        factory(input)
    }
}

impl Default for ConstructorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// Factories are opaque closures; the registered names are the printable part.
impl fmt::Debug for ConstructorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConstructorRegistry")
            .field("types", &names)
            .finish()
    }
}

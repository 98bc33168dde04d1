//! Typed values and the target record seam.
//!
//! The engine talks to target types through [`TargetRecord`]: a record is a
//! bag of named fields, and `set_field` is the capability table mapping a
//! field name to the typed slot behind it.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::error::RuleError;

/// One row of untyped string cells from the CSV source.
pub type Row = Vec<String>;

/// A typed value produced by the value constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Whole number.
    Integer(i64),
    /// Arbitrary-precision decimal, scale preserved.
    Decimal(BigDecimal),
    /// Plain text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl FieldValue {
    /// Kind tag, used in diagnostics and mismatch errors.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Decimal(_) => FieldKind::Decimal,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }
}

/// Kind tag for [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    Text,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
            FieldKind::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// A mutable bag of named fields the engine populates.
///
/// One record is created per row (`Default`), mutated by each successful
/// rule application, and emitted even when some rules failed. `field_kind`
/// is the name side of the capability table: the engine resolves every
/// rule's field through it before building the value, so a bogus field
/// name surfaces even on rows whose cells would themselves fail.
/// `set_field` stores a value if its kind matches the slot; an unknown
/// name or a kind mismatch is a structural [`RuleError`], the signal that
/// the rule set does not fit this record type.
pub trait TargetRecord: Default {
    /// Kind accepted by the named field, or `None` for a field the record
    /// does not have.
    fn field_kind(field: &str) -> Option<FieldKind>;

    /// Set the named field to the given value.
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), RuleError>;
}

//! Error types for the rowcast transformation engine.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV source errors
//! - [`LoadError`] - rule set loading and compilation errors
//! - [`RowError`] - per-row data errors, recovered at single-rule granularity
//! - [`RuleError`] - structural rule set errors, fatal to an engine instance
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! [`RowError`] and [`RuleError`] are the two failure tiers of the engine:
//! a `RowError` marks bad data in one cell of one row and never stops the
//! batch, while a `RuleError` marks a rule set that cannot work against the
//! target record type and poisons every subsequent row the same way.

use thiserror::Error;

use crate::transform::dsl::value::FieldKind;

// =============================================================================
// CSV Source Errors
// =============================================================================

/// Errors while reading rows from a CSV source.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode input bytes.
    #[error("Failed to decode input: {0}")]
    EncodingError(String),

    /// Malformed CSV.
    #[error("Invalid CSV: {0}")]
    ParseError(#[from] csv::Error),

    /// Delimiter outside the ASCII range.
    #[error("Unsupported delimiter '{0}': not an ASCII character")]
    Delimiter(char),

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyFile,
}

// =============================================================================
// Rule Set Loading Errors
// =============================================================================

/// Errors while loading or compiling a rule set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the rules file.
    #[error("Failed to read rules: {0}")]
    IoError(#[from] std::io::Error),

    /// Rules are not valid JSON or do not match the expected shape.
    #[error("Invalid rules JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A filter pattern does not compile as a regex.
    #[error("Invalid filter pattern '{pattern}': {source}")]
    FilterError {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A date rule is missing its format pattern.
    #[error("Rule for field '{field}' builds a date but has no dateFormat")]
    MissingDateFormat { field: String },

    /// The rule set contains no rules.
    #[error("Rule set contains no transforms")]
    Empty,
}

// =============================================================================
// Row-Level Errors (data tier)
// =============================================================================

/// Per-row data errors.
///
/// These are recovered at single-rule granularity: the failure is reported
/// through the diagnostics sink, the target field stays unset, and
/// processing moves on to the next rule and the next row.
#[derive(Debug, Error)]
pub enum RowError {
    /// A template placeholder references a column the row does not have.
    #[error("column {index} out of range for row with {width} cells")]
    ColumnOutOfRange { index: usize, width: usize },

    /// The declared type name has no registered constructor.
    #[error("no value constructor registered for type '{name}'")]
    UnknownType { name: String },

    /// A formatted string cannot be coerced into the declared type.
    #[error("cannot build {kind} from '{value}': {reason}")]
    Format {
        kind: String,
        value: String,
        reason: String,
    },

    /// A formatted string does not parse against the declared date pattern.
    #[error("cannot parse date '{value}' with format '{pattern}': {source}")]
    DateParse {
        value: String,
        pattern: String,
        #[source]
        source: chrono::ParseError,
    },
}

// =============================================================================
// Rule Set Errors (structural tier)
// =============================================================================

/// Structural mismatches between the rule set and the target record type.
///
/// Fatal to the engine instance: every row would hit the same problem, so
/// processing stops rather than silently producing wrong results.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule names a field the target record does not have.
    #[error("target record has no field '{field}'")]
    UnknownField { field: String },

    /// The rule builds a value kind the named field does not accept.
    #[error("field '{field}' takes {expected}, not {actual}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`]
/// entry points. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV source error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Rule set loading error.
    #[error("Rules error: {0}")]
    Load(#[from] LoadError),

    /// Structural rule set error.
    #[error("Rules error: {0}")]
    Rules(#[from] RuleError),

    /// IO error outside the CSV/rules readers.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV source operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for rule set loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for per-rule value production.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for whole-engine operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

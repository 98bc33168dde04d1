//! # Rowcast - rule-driven CSV to record transformation
//!
//! Rowcast turns raw CSV rows into typed domain records. A declarative JSON
//! rule set names, for each record field, which cells to pick, how to format
//! them and which type to build, so new input layouts need a new rules file,
//! not new code.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│   Records   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (rule DSL)  │     │ (typed JSON)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowcast::{transform_file, TransformOptions};
//! use std::path::Path;
//!
//! fn main() {
//!     let outcome = transform_file(
//!         Path::new("orders.csv"),
//!         Path::new("rules.json"),
//!         &TransformOptions::default(),
//!     )
//!     .unwrap();
//!     println!("Built {} orders", outcome.orders.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types, one enum per failure tier
//! - [`diagnostics`] - Injectable sink for per-row failure reports
//! - [`models`] - Domain records ([`Order`])
//! - [`parser`] - CSV reading with encoding and delimiter auto-detection
//! - [`transform`] - Rule DSL, value construction, engine and pipeline

// Core modules
pub mod diagnostics;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

pub use transform::dsl;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError,
    CsvResult,
    LoadError,
    LoadResult,
    PipelineError,
    PipelineResult,
    RowError,
    RowResult,
    RuleError,
    RuleResult,
};

// =============================================================================
// Re-exports - Diagnostics
// =============================================================================

pub use diagnostics::{DiagnosticsSink, LogSink, RecordingSink};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::Order;

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    read_rows,
    CsvSource,
};

// =============================================================================
// Re-exports - DSL
// =============================================================================

pub use transform::dsl::{
    example_rules,
    proper_case,
    CaseMode,
    ConstructorRegistry,
    FieldKind,
    FieldValue,
    RecordTransformer,
    Row,
    Rule,
    RuleSet,
    TargetRecord,
    ValueSpec,
    DATE_TYPE,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    transform_bytes,
    transform_file,
    transform_source,
    CsvInfo,
    PipelineOutcome,
    TransformOptions,
};

//! DSL (Domain Specific Language) for CSV to record transformation
//!
//! This module provides:
//! - `rules`: Declarative mapping rules (what users write)
//! - `format`: Placeholder substitution, filters and case normalization
//! - `construct`: Typed value construction from formatted strings
//! - `executor`: Compile rule sets and run them row by row
//!
//! ## Usage Flow
//!
//! ```text
//! CSV → CsvSource rows → RuleSet → RecordTransformer → typed records
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowcast::dsl::{example_rules, RecordTransformer};
//! use rowcast::models::Order;
//!
//! // 1. Compile the rule set
//! let engine = RecordTransformer::<Order>::new(&example_rules())?;
//!
//! // 2. Run each row
//! let row = vec!["1000".into(), "2018".into(), "1".into(), "1".into(),
//!                "P-10001".into(), "ARUGoLA".into(), "5,250.50".into()];
//! let order = engine.transform_row(&row)?;
//! ```

pub mod construct;
pub mod executor;
pub mod format;
pub mod rules;
pub mod value;

// Re-exports for convenience
pub use construct::{ConstructorRegistry, Factory, DATE_TYPE};
pub use executor::RecordTransformer;
pub use format::{format, proper_case};
pub use rules::{example_rules, CaseMode, Rule, RuleSet, ValueSpec};
pub use value::{FieldKind, FieldValue, Row, TargetRecord};

//! Transformation module.
//!
//! This module handles CSV to record transformation:
//! - DSL: Mapping rules, value construction and the execution engine
//! - Pipeline: Main transformation pipeline

pub mod dsl;
pub mod pipeline;

pub use dsl::*;
pub use pipeline::*;

//! High-level pipeline API for CSV to order transformation.
//!
//! Combines the steps: read and decode the CSV, load and compile the rule
//! set, run every row through the engine, collect per-field failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use rowcast::pipeline::{transform_file, TransformOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = transform_file(
//!         Path::new("orders.csv"),
//!         Path::new("rules.json"),
//!         &TransformOptions::default(),
//!     )?;
//!
//!     println!("Built {} orders", outcome.orders.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::dsl::{RecordTransformer, RuleSet};
use crate::diagnostics::RecordingSink;
use crate::error::PipelineResult;
use crate::models::Order;
use crate::parser::CsvSource;

/// Options for the transformation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Transform rows on the rayon thread pool.
    pub parallel: bool,

    /// Cap on failure reports kept in the outcome. The count is always
    /// exact; only the retained messages are capped.
    pub max_failures: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_failures: 10,
        }
    }
}

/// Result of a complete transformation run.
#[derive(Debug, Serialize)]
pub struct PipelineOutcome {
    /// One order per input row, in input order.
    pub orders: Vec<Order>,

    /// Total number of per-field failures across all rows.
    pub failure_count: usize,

    /// First failure reports, up to `max_failures`.
    pub failures: Vec<String>,

    /// CSV parsing metadata.
    pub csv_info: CsvInfo,
}

/// CSV input information.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub row_count: usize,
}

/// Transform a CSV file with a rule set file.
///
/// This is the main entry point for the pipeline. It:
/// 1. Reads the CSV with encoding and delimiter auto-detection
/// 2. Loads and compiles the rule set
/// 3. Transforms every row into an [`Order`]
/// 4. Collects per-field failure reports
pub fn transform_file(
    csv_path: &Path,
    rules_path: &Path,
    options: &TransformOptions,
) -> PipelineResult<PipelineOutcome> {
    let rules = RuleSet::from_file(rules_path)?;
    let source = CsvSource::from_file(csv_path)?;
    transform_source(source, &rules, options)
}

/// Transform CSV bytes with an already-loaded rule set.
pub fn transform_bytes(
    bytes: &[u8],
    rules: &RuleSet,
    options: &TransformOptions,
) -> PipelineResult<PipelineOutcome> {
    let source = CsvSource::from_bytes(bytes)?;
    transform_source(source, rules, options)
}

/// Transform already-read rows.
pub fn transform_source(
    source: CsvSource,
    rules: &RuleSet,
    options: &TransformOptions,
) -> PipelineResult<PipelineOutcome> {
    log::info!(
        "read {} rows (encoding {}, delimiter '{}')",
        source.rows.len(),
        source.encoding,
        format_delimiter(source.delimiter)
    );

    let csv_info = CsvInfo {
        encoding: source.encoding.clone(),
        delimiter: source.delimiter,
        row_count: source.rows.len(),
    };

    let sink = Arc::new(RecordingSink::new());
    let engine = RecordTransformer::<Order>::new(rules)?.with_sink(sink.clone());

    let orders: Vec<Order> = if options.parallel {
        engine
            .transform_rows_parallel(&source.rows)
            .into_iter()
            .collect::<Result<_, _>>()?
    } else {
        engine
            .transform_rows(&source.rows)
            .collect::<Result<_, _>>()?
    };

    let messages = sink.messages();
    let failure_count = messages.len();
    if failure_count > 0 {
        log::warn!("{failure_count} field(s) could not be built");
    }
    log::info!("built {} orders", orders.len());

    Ok(PipelineOutcome {
        orders,
        failure_count,
        failures: messages
            .into_iter()
            .take(options.max_failures)
            .collect(),
        csv_info,
    })
}

/// Format delimiter for display.
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

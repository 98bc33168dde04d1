//! Reporting for per-row transform failures.
//!
//! Data-tier errors do not abort a batch; they are reported through a
//! [`DiagnosticsSink`] and the affected field is left unset. The engine
//! takes the sink as an injected dependency so callers can route reports
//! to the log, collect them for assertions, or forward them elsewhere.

use std::sync::Mutex;

use crate::error::RowError;
use crate::transform::dsl::value::Row;

/// Receiver for data-tier failures raised while transforming a row.
pub trait DiagnosticsSink: Send + Sync {
    /// Called once per failed rule application with the offending row.
    fn row_error(&self, error: &RowError, field: &str, row: &Row);
}

/// Default sink forwarding reports to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn row_error(&self, error: &RowError, field: &str, row: &Row) {
        log::warn!("error with {row:?}: field '{field}': {error}");
    }
}

/// Sink capturing formatted reports in memory.
///
/// Used by tests to assert on what was reported without a logger.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports captured so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn row_error(&self, error: &RowError, field: &str, row: &Row) {
        let message = format!("error with {row:?}: field '{field}': {error}");
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
    }
}

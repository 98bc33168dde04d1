//! Template formatting: placeholder substitution, deletion filters, case.
//!
//! Pure string pipeline, no side effects. Each step is exposed on its own;
//! [`format`] composes them in the order the engine applies them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::CaseMode;
use crate::error::{RowError, RowResult};

/// Matches `{i}` placeholders, `i` a zero-based column index.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

/// Full formatting pipeline: substitute placeholders, delete filter
/// matches, normalize case.
pub fn format(
    template: &str,
    filters: &[Regex],
    case: CaseMode,
    row: &[String],
) -> RowResult<String> {
    let substituted = substitute(template, row)?;
    let filtered = apply_filters(&substituted, filters);
    Ok(apply_case(&filtered, case))
}

/// Substitute `{i}` placeholders with row cells.
///
/// Every occurrence of a placeholder is replaced with the same cell value.
/// An index past the end of the row aborts this rule with
/// [`RowError::ColumnOutOfRange`]; a template with no placeholders passes
/// through unchanged.
pub fn substitute(template: &str, row: &[String]) -> RowResult<String> {
    let mut result = template.to_string();

    for caps in PLACEHOLDER.captures_iter(template) {
        let placeholder = &caps[0];
        let index = caps[1].parse::<usize>().unwrap_or(usize::MAX);

        match row.get(index) {
            Some(cell) => result = result.replace(placeholder, cell),
            None => {
                return Err(RowError::ColumnOutOfRange {
                    index,
                    width: row.len(),
                })
            }
        }
    }

    Ok(result)
}

/// Delete every match of each filter, in listed order.
///
/// A filter that matches nothing is a no-op.
pub fn apply_filters(input: &str, filters: &[Regex]) -> String {
    let mut result = input.to_string();
    for filter in filters {
        result = filter.replace_all(&result, "").into_owned();
    }
    result
}

/// Apply case normalization.
pub fn apply_case(input: &str, case: CaseMode) -> String {
    match case {
        CaseMode::None => input.to_string(),
        CaseMode::Proper => proper_case(input),
    }
}

/// First character uppercased, remainder lowercased. No-op on empty input.
pub fn proper_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
    }
}

//! Transform rule definitions.
//!
//! A rule set declares, field by field, how to build a target record from
//! the cells of one CSV row. It is loaded once and never mutated.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::error::LoadResult;

/// An ordered set of mapping rules, applied in listed order for every row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// The rules.
    pub transforms: Vec<Rule>,
}

/// One mapping instruction: which field to set and how to build its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Name of the target record field to set.
    #[serde(rename = "method")]
    pub field: String,

    /// Recipe for the value.
    #[serde(rename = "class")]
    pub value: ValueSpec,
}

/// Value recipe: declared type name plus the formatting steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSpec {
    /// Declared type name, resolved in the constructor registry.
    /// `"date"` takes the dedicated date path.
    pub name: String,

    /// Template with `{i}` placeholders referring to row cell indices.
    pub template: String,

    /// Regex patterns whose matches are deleted, in listed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,

    /// Case normalization applied after filtering.
    #[serde(default, skip_serializing_if = "CaseMode::is_none")]
    pub case: CaseMode,

    /// chrono strftime pattern; required when `name` is `"date"`.
    #[serde(default, rename = "dateFormat", skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

/// Case normalization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Leave the formatted string as is.
    #[default]
    None,
    /// First character uppercased, remainder lowercased.
    Proper,
}

impl CaseMode {
    fn is_none(&self) -> bool {
        matches!(self, CaseMode::None)
    }
}

impl RuleSet {
    /// Parse a rule set from a JSON string.
    pub fn from_json(json: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a rule set from a reader.
    pub fn from_reader<R: Read>(reader: R) -> LoadResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a rule set from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Rule {
    /// Create a rule for a field with a declared type and template.
    pub fn new(field: &str, type_name: &str, template: &str) -> Self {
        Self {
            field: field.to_string(),
            value: ValueSpec {
                name: type_name.to_string(),
                template: template.to_string(),
                filters: Vec::new(),
                case: CaseMode::None,
                date_format: None,
            },
        }
    }

    /// Add a deletion filter to the chain.
    pub fn with_filter(mut self, pattern: &str) -> Self {
        self.value.filters.push(pattern.to_string());
        self
    }

    /// Apply proper-case normalization to the formatted string.
    pub fn proper_case(mut self) -> Self {
        self.value.case = CaseMode::Proper;
        self
    }

    /// Set the date parse pattern.
    pub fn with_date_format(mut self, pattern: &str) -> Self {
        self.value.date_format = Some(pattern.to_string());
        self
    }
}

/// The standard orders rule set, used by the CLI `example-rules` command
/// and throughout the tests.
pub fn example_rules() -> RuleSet {
    RuleSet {
        transforms: vec![
            Rule::new("order_id", "integer", "{0}"),
            Rule::new("order_date", "date", "{1}-{2}-{3}").with_date_format("%Y-%m-%d"),
            Rule::new("product_id", "string", "{4}"),
            Rule::new("product_name", "string", "{5}").proper_case(),
            Rule::new("quantity", "decimal", "{6}").with_filter(","),
        ],
    }
}

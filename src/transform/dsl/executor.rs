//! Rule execution engine.
//!
//! Compiles a [`RuleSet`] once, then applies it row by row to build typed
//! records. Failures split into two tiers: data-tier errors are reported to
//! the diagnostics sink and leave the affected field unset, while structural
//! errors (a rule naming a field the record type does not have, or declaring
//! the wrong kind for it) abort the transform, since no row can ever satisfy
//! such a rule.

use std::fmt;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use regex::Regex;

use super::construct::{ConstructorRegistry, DATE_TYPE};
use super::format;
use super::rules::{CaseMode, Rule, RuleSet};
use super::value::{FieldValue, Row, TargetRecord};
use crate::diagnostics::{DiagnosticsSink, LogSink};
use crate::error::{LoadError, LoadResult, RowResult, RuleError, RuleResult};

/// A rule with its filters compiled and its date requirement checked.
#[derive(Debug)]
struct CompiledRule {
    field: String,
    type_name: String,
    template: String,
    filters: Vec<Regex>,
    case: CaseMode,
    date_format: Option<String>,
}

impl CompiledRule {
    fn compile(rule: &Rule) -> LoadResult<Self> {
        let mut filters = Vec::with_capacity(rule.value.filters.len());
        for pattern in &rule.value.filters {
            let regex = Regex::new(pattern).map_err(|source| LoadError::FilterError {
                pattern: pattern.clone(),
                source,
            })?;
            filters.push(regex);
        }

        if rule.value.name == DATE_TYPE && rule.value.date_format.is_none() {
            return Err(LoadError::MissingDateFormat {
                field: rule.field.clone(),
            });
        }

        Ok(Self {
            field: rule.field.clone(),
            type_name: rule.value.name.clone(),
            template: rule.value.template.clone(),
            filters,
            case: rule.value.case,
            date_format: rule.value.date_format.clone(),
        })
    }
}

/// Transform engine for one record type.
///
/// Compiling is separate from running so that a bad filter pattern or a
/// date rule without its parse pattern fails at load time, once, instead
/// of on every row.
pub struct RecordTransformer<T: TargetRecord> {
    rules: Vec<CompiledRule>,
    registry: ConstructorRegistry,
    sink: Arc<dyn DiagnosticsSink>,
    _record: PhantomData<fn() -> T>,
}

impl<T: TargetRecord> RecordTransformer<T> {
    /// Compile a rule set into a ready engine.
    pub fn new(rules: &RuleSet) -> LoadResult<Self> {
        if rules.transforms.is_empty() {
            return Err(LoadError::Empty);
        }
        let compiled = rules
            .transforms
            .iter()
            .map(CompiledRule::compile)
            .collect::<LoadResult<Vec<_>>>()?;
        Ok(Self {
            rules: compiled,
            registry: ConstructorRegistry::with_builtins(),
            sink: Arc::new(LogSink),
            _record: PhantomData,
        })
    }

    /// Load and compile a rule set from a JSON string.
    pub fn from_json(json: &str) -> LoadResult<Self> {
        Self::new(&RuleSet::from_json(json)?)
    }

    /// Load and compile a rule set from a reader.
    pub fn from_reader<R: Read>(reader: R) -> LoadResult<Self> {
        Self::new(&RuleSet::from_reader(reader)?)
    }

    /// Load and compile a rule set from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        Self::new(&RuleSet::from_file(path)?)
    }

    /// Swap in a registry with custom value constructors.
    pub fn with_registry(mut self, registry: ConstructorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Route data-tier failure reports to `sink` instead of the log.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Transform one row into a record.
    ///
    /// Rules apply in listed order. The target field is resolved before the
    /// value is built, so a rule naming a missing field aborts even on rows
    /// whose cells would also have failed. A data-tier failure is reported
    /// to the sink and leaves that field unset; the remaining rules still
    /// run, so one malformed cell costs one field, not the record.
    pub fn transform_row(&self, row: &Row) -> RuleResult<T> {
        let mut record = T::default();
        for rule in &self.rules {
            if T::field_kind(&rule.field).is_none() {
                return Err(RuleError::UnknownField {
                    field: rule.field.clone(),
                });
            }
            match self.build_value(rule, row) {
                Ok(value) => record.set_field(&rule.field, value)?,
                Err(error) => self.sink.row_error(&error, &rule.field, row),
            }
        }
        Ok(record)
    }

    fn build_value(&self, rule: &CompiledRule, row: &Row) -> RowResult<FieldValue> {
        let formatted = format::format(&rule.template, &rule.filters, rule.case, row)?;
        self.registry
            .construct(&rule.type_name, &formatted, rule.date_format.as_deref())
    }

    /// Transform rows lazily, yielding one `Result` per row.
    pub fn transform_rows<'a, I>(&'a self, rows: I) -> impl Iterator<Item = RuleResult<T>> + 'a
    where
        I: IntoIterator<Item = &'a Row>,
        I::IntoIter: 'a,
    {
        rows.into_iter().map(move |row| self.transform_row(row))
    }

    /// Transform a batch on the rayon thread pool.
    ///
    /// Output order matches input order.
    pub fn transform_rows_parallel(&self, rows: &[Row]) -> Vec<RuleResult<T>>
    where
        T: Send,
    {
        rows.par_iter().map(|row| self.transform_row(row)).collect()
    }
}

// The sink and the record marker carry no printable state.
impl<T: TargetRecord> fmt::Debug for RecordTransformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordTransformer")
            .field("rules", &self.rules)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use crate::models::Order;
    use crate::transform::dsl::rules::example_rules;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn engine_with_recorder() -> (RecordTransformer<Order>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let engine = RecordTransformer::<Order>::new(&example_rules())
            .unwrap()
            .with_sink(sink.clone());
        (engine, sink)
    }

    #[test]
    fn test_transform_row_builds_full_order() {
        let (engine, sink) = engine_with_recorder();
        let order = engine
            .transform_row(&row(&[
                "1000", "2018", "1", "1", "P-10001", "ARUGoLA", "5,250.50",
            ]))
            .unwrap();

        assert_eq!(order.order_id, Some(1000));
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(order.product_id.as_deref(), Some("P-10001"));
        assert_eq!(order.product_name.as_deref(), Some("Arugola"));
        assert_eq!(order.quantity.unwrap().to_string(), "5250.50");
        assert_eq!(order.unit, "kg");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_transform_rows_over_batch() {
        let (engine, sink) = engine_with_recorder();
        let rows = vec![
            row(&[
                "1000", "2018", "1", "1", "P-10001", "Arugola", "5,250.50", "Lorem", "Ipsum", "",
            ]),
            row(&[
                "1001", "2019", "1", "1", "P-10001", "Arugola", "500.00", "Lorem", "Ipsum", "",
            ]),
        ];

        let orders: Vec<Order> = engine
            .transform_rows(&rows)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, Some(1000));
        assert_eq!(orders[0].quantity.as_ref().unwrap().to_string(), "5250.50");
        assert_eq!(orders[1].order_id, Some(1001));
        assert_eq!(orders[1].order_date, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(orders[1].quantity.as_ref().unwrap().to_string(), "500.00");
        // cells past the ones the rules reference are simply ignored
        assert_eq!(orders[1].product_name.as_deref(), Some("Arugola"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_bad_order_id_leaves_field_unset() {
        let (engine, sink) = engine_with_recorder();
        let order = engine
            .transform_row(&row(&[
                "one Hundred",
                "2018",
                "1",
                "1",
                "P-10001",
                "ARUGoLA",
                "5,250.50",
            ]))
            .unwrap();

        assert_eq!(order.order_id, None);
        assert_eq!(order.product_name.as_deref(), Some("Arugola"));

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("one Hundred"));
    }

    #[test]
    fn test_bad_date_does_not_stop_later_rules() {
        // bad year, bad month, bad day
        let bad_dates = [
            row(&["1000", "Year", "1", "1", "P-10001", "ARUGoLA", "5,250.50"]),
            row(&["1000", "2018", "Jan", "1", "P-10001", "ARUGoLA", "5,250.50"]),
            row(&["1000", "2018", "1", "First", "P-10001", "ARUGoLA", "5,250.50"]),
        ];

        for bad in &bad_dates {
            let (engine, sink) = engine_with_recorder();
            let order = engine.transform_row(bad).unwrap();

            assert_eq!(order.order_id, Some(1000));
            assert_eq!(order.order_date, None);
            assert_eq!(order.product_id.as_deref(), Some("P-10001"));
            assert_eq!(order.product_name.as_deref(), Some("Arugola"));
            assert_eq!(order.quantity.as_ref().unwrap().to_string(), "5250.50");
            assert_eq!(sink.messages().len(), 1);
        }
    }

    #[test]
    fn test_bad_quantity_reports_offending_value() {
        let (engine, sink) = engine_with_recorder();
        let order = engine
            .transform_row(&row(&[
                "1000", "2018", "1", "1", "P-10001", "ARUGoLA", "5.250.50",
            ]))
            .unwrap();

        assert_eq!(order.quantity, None);
        assert_eq!(order.order_id, Some(1000));

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("quantity"));
        assert!(messages[0].contains("5.250.50"));
    }

    #[test]
    fn test_short_row_sets_what_it_can() {
        let (engine, sink) = engine_with_recorder();
        let order = engine.transform_row(&row(&["1000", "2018"])).unwrap();

        assert_eq!(order.order_id, Some(1000));
        assert_eq!(order.order_date, None);
        assert_eq!(order.product_id, None);
        assert_eq!(order.product_name, None);
        assert_eq!(order.quantity, None);
        // order_date, product_id, product_name and quantity each hit a
        // missing column
        assert_eq!(sink.messages().len(), 4);
    }

    #[test]
    fn test_unknown_field_is_fatal() {
        let rules = RuleSet {
            transforms: vec![Rule::new("bogus_field", "string", "{0}")],
        };
        let engine = RecordTransformer::<Order>::new(&rules).unwrap();

        let err = engine.transform_row(&row(&["x"])).unwrap_err();
        assert!(err.to_string().contains("bogus_field"));
    }

    #[test]
    fn test_unknown_field_fatal_even_when_template_fails() {
        // a one-cell row cannot satisfy {9}, but the bogus field has to
        // abort the transform, not hide behind the missing column
        let rules = RuleSet {
            transforms: vec![Rule::new("bogus_field", "string", "{9}")],
        };
        let engine = RecordTransformer::<Order>::new(&rules).unwrap();

        let err = engine.transform_row(&row(&["only"])).unwrap_err();
        match err {
            RuleError::UnknownField { field } => assert_eq!(field, "bogus_field"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_declared_kind_is_fatal() {
        let rules = RuleSet {
            transforms: vec![Rule::new("order_id", "string", "{0}")],
        };
        let engine = RecordTransformer::<Order>::new(&rules).unwrap();

        let err = engine.transform_row(&row(&["1000"])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("order_id"));
        assert!(msg.contains("integer"));
    }

    #[test]
    fn test_unknown_type_name_is_row_tier() {
        let rules = RuleSet {
            transforms: vec![
                Rule::new("order_id", "integer", "{0}"),
                Rule::new("quantity", "complex", "{1}"),
            ],
        };
        let sink = Arc::new(RecordingSink::new());
        let engine = RecordTransformer::<Order>::new(&rules)
            .unwrap()
            .with_sink(sink.clone());

        let order = engine.transform_row(&row(&["1000", "1+2i"])).unwrap();

        assert_eq!(order.order_id, Some(1000));
        assert_eq!(order.quantity, None);
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("complex"));
    }

    #[test]
    fn test_empty_rule_set_fails_compile() {
        let rules = RuleSet {
            transforms: Vec::new(),
        };
        let err = RecordTransformer::<Order>::new(&rules).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_bad_filter_pattern_fails_compile() {
        let rules = RuleSet {
            transforms: vec![Rule::new("product_id", "string", "{0}").with_filter("[")],
        };
        let err = RecordTransformer::<Order>::new(&rules).unwrap_err();
        match err {
            LoadError::FilterError { pattern, .. } => assert_eq!(pattern, "["),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_date_rule_requires_format() {
        let rules = RuleSet {
            transforms: vec![Rule::new("order_date", "date", "{1}")],
        };
        let err = RecordTransformer::<Order>::new(&rules).unwrap_err();
        match err {
            LoadError::MissingDateFormat { field } => assert_eq!(field, "order_date"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_wire_format() {
        let json = r#"{
            "transforms": [
                { "method": "order_id", "class": { "name": "integer", "template": "{0}" } },
                {
                    "method": "order_date",
                    "class": {
                        "name": "date",
                        "template": "{1}-{2}-{3}",
                        "dateFormat": "%Y-%m-%d"
                    }
                },
                {
                    "method": "quantity",
                    "class": { "name": "decimal", "template": "{4}", "filters": [","] }
                }
            ]
        }"#;
        let engine = RecordTransformer::<Order>::from_json(json).unwrap();

        let order = engine
            .transform_row(&row(&["1000", "2018", "1", "1", "5,250.50"]))
            .unwrap();

        assert_eq!(order.order_id, Some(1000));
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(order.quantity.unwrap().to_string(), "5250.50");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (engine, _sink) = engine_with_recorder();
        let rows = vec![
            row(&["1000", "2018", "1", "1", "P-10001", "ARUGoLA", "5,250.50"]),
            row(&[
                "2000",
                "2017",
                "12",
                "12",
                "P-10002",
                "iceberg lettuce",
                "500.00",
            ]),
        ];

        let sequential: Vec<Order> = engine
            .transform_rows(&rows)
            .collect::<Result<_, _>>()
            .unwrap();
        let parallel: Vec<Order> = engine
            .transform_rows_parallel(&rows)
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_engine_is_debug_printable() {
        let engine = RecordTransformer::<Order>::new(&example_rules()).unwrap();
        let dump = format!("{engine:?}");
        assert!(dump.contains("order_id"));
        assert!(dump.contains("integer"));
    }

    #[test]
    fn test_custom_registry_constructor() {
        let rules = RuleSet {
            transforms: vec![Rule::new("product_name", "upper", "{0}")],
        };
        let mut registry = ConstructorRegistry::with_builtins();
        registry.register("upper", |input| {
            Ok(FieldValue::Text(input.to_uppercase()))
        });
        let engine = RecordTransformer::<Order>::new(&rules)
            .unwrap()
            .with_registry(registry);

        let order = engine.transform_row(&row(&["arugola"])).unwrap();
        assert_eq!(order.product_name.as_deref(), Some("ARUGOLA"));
    }
}

//! Domain records produced by the transform engine.
//!
//! - [`Order`] - Purchase order assembled field by field from one CSV row

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RuleError;
use crate::transform::dsl::value::{FieldKind, FieldValue, TargetRecord};

/// A purchase order assembled from one CSV row.
///
/// Every mapped field is optional; a rule that fails on a given row leaves
/// its field unset rather than discarding the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    /// Numeric order identifier.
    pub order_id: Option<i64>,
    /// Date the order was placed.
    pub order_date: Option<NaiveDate>,
    /// Product code, e.g. `P-10001`.
    pub product_id: Option<String>,
    /// Display name of the product.
    pub product_name: Option<String>,
    /// Ordered quantity, exact decimal.
    pub quantity: Option<BigDecimal>,
    /// Unit of measure. Orders are always quoted in kilograms.
    pub unit: String,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: None,
            order_date: None,
            product_id: None,
            product_name: None,
            quantity: None,
            unit: "kg".to_string(),
        }
    }
}

impl TargetRecord for Order {
    fn field_kind(field: &str) -> Option<FieldKind> {
        match field {
            "order_id" => Some(FieldKind::Integer),
            "order_date" => Some(FieldKind::Date),
            "product_id" | "product_name" => Some(FieldKind::Text),
            "quantity" => Some(FieldKind::Decimal),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), RuleError> {
        match (field, value) {
            ("order_id", FieldValue::Integer(v)) => self.order_id = Some(v),
            ("order_date", FieldValue::Date(v)) => self.order_date = Some(v),
            ("product_id", FieldValue::Text(v)) => self.product_id = Some(v),
            ("product_name", FieldValue::Text(v)) => self.product_name = Some(v),
            ("quantity", FieldValue::Decimal(v)) => self.quantity = Some(v),
            (field, value) => match Self::field_kind(field) {
                Some(expected) => {
                    return Err(RuleError::KindMismatch {
                        field: field.to_string(),
                        expected,
                        actual: value.kind(),
                    });
                }
                None => {
                    return Err(RuleError::UnknownField {
                        field: field.to_string(),
                    });
                }
            },
        }
        Ok(())
    }
}

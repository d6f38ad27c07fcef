//! Output types: the structured record produced by one extraction call.
//!
//! The guiding rule is *partial failure is data*. An [`ExtractionResult`]
//! always contains an entry for every field the rule set declares — a field
//! that did not match is present with status [`FieldStatus::NotFound`], a
//! field whose captured text refused to coerce is present with
//! [`FieldStatus::TypeError`], and a table row with the wrong shape is kept
//! with [`RowStatus::Malformed`]. Downstream consumers branch on status,
//! never on absence.
//!
//! Everything here derives `Serialize`, so the result maps directly onto
//! the JSON document the invoking service returns.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A typed value extracted for one field or cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Trimmed text; internal newlines of multiline captures are collapsed
    /// to single `\n`.
    Text(String),
    /// Locale-normalised number (thousands stripped, decimal is `.`).
    Number(f64),
    /// Serialises as an ISO-8601 date (`2025-03-19`).
    Date(NaiveDate),
}

impl FieldValue {
    /// The text payload, if this is a [`FieldValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric payload, if this is a [`FieldValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The date payload, if this is a [`FieldValue::Date`].
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// Outcome tag for one scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// A pattern matched and the value coerced to the declared type.
    Matched,
    /// No pattern matched (or matching was abandoned on budget). Expected
    /// for optional fields; not an error.
    NotFound,
    /// A pattern matched but the captured text failed type coercion.
    TypeError,
}

/// Byte span of the raw match within the *normalized* input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One scalar field's extraction outcome: value, status and raw-match span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOutcome {
    pub status: FieldStatus,
    /// `None` unless `status` is [`FieldStatus::Matched`].
    pub value: Option<FieldValue>,
    /// Span of the full pattern match (context included), when one matched.
    /// Present for `TypeError` too, so callers can inspect what was seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl FieldOutcome {
    /// A `NotFound` outcome with no value and no span.
    pub fn not_found() -> Self {
        Self {
            status: FieldStatus::NotFound,
            value: None,
            span: None,
        }
    }
}

/// Outcome tag for one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Token count matched the mapped columns and every cell coerced.
    Ok,
    /// Token count mismatched or at least one cell failed coercion; the row
    /// is kept with the cells that could be mapped, the rest null.
    Malformed,
}

/// Outcome tag for the whole line-item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// A header line was found; rows (possibly zero) follow it.
    Found,
    /// No line satisfied the start keywords; `rows` is empty. Scalar
    /// extraction is unaffected.
    TableNotFound,
}

/// One line-item row: cell values keyed by column field name.
///
/// The map holds exactly the columns whose header was present on this
/// document (see [`TableOutcome::columns`]); a cell that could not be
/// filled is `None`, never missing from the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRecord {
    pub status: RowStatus,
    pub cells: BTreeMap<String, Option<FieldValue>>,
}

/// The table part of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutcome {
    pub status: TableStatus,
    /// Column field names in the left-to-right order the header line
    /// established. Columns whose header was absent are excluded.
    pub columns: Vec<String>,
    pub rows: Vec<RowRecord>,
}

impl TableOutcome {
    /// The outcome reported when no header line was found.
    pub fn not_found() -> Self {
        Self {
            status: TableStatus::TableNotFound,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// The complete record for one input document.
///
/// Created fresh per extraction call and owned solely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// One entry per declared general field, keyed by field name. Always
    /// complete: a rule that produced nothing is present as `not_found`.
    pub fields: BTreeMap<String, FieldOutcome>,
    pub table: TableOutcome,
}

impl ExtractionResult {
    /// Convenience accessor: the outcome for `name`, if declared.
    pub fn field(&self, name: &str) -> Option<&FieldOutcome> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&FieldStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(
            serde_json::to_string(&FieldStatus::TypeError).unwrap(),
            "\"type_error\""
        );
        assert_eq!(
            serde_json::to_string(&TableStatus::TableNotFound).unwrap(),
            "\"table_not_found\""
        );
        assert_eq!(
            serde_json::to_string(&RowStatus::Malformed).unwrap(),
            "\"malformed\""
        );
    }

    #[test]
    fn values_serialize_untagged() {
        assert_eq!(
            serde_json::to_string(&FieldValue::Number(20865.78)).unwrap(),
            "20865.78"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Text("abc".into())).unwrap(),
            "\"abc\""
        );
        let d = NaiveDate::from_ymd_opt(2025, 3, 19).unwrap();
        assert_eq!(
            serde_json::to_string(&FieldValue::Date(d)).unwrap(),
            "\"2025-03-19\""
        );
    }

    #[test]
    fn outcome_omits_span_when_absent() {
        let json = serde_json::to_string(&FieldOutcome::not_found()).unwrap();
        assert!(!json.contains("span"), "got: {json}");
        assert!(json.contains("\"value\":null"), "got: {json}");
    }
}

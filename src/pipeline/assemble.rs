//! Record assembly: merge scalar outcomes and the table outcome into one
//! [`ExtractionResult`].
//!
//! A pure merge with one guarantee layered on top: the result carries an
//! entry for *every* declared scalar field, so downstream consumers branch
//! on status, never on key absence. The extractors already produce one
//! outcome per rule; the backfill here makes the guarantee hold by
//! construction rather than by convention.

use crate::output::{ExtractionResult, FieldOutcome, TableOutcome};
use crate::ruleset::RuleSet;
use std::collections::BTreeMap;

/// Merge per-field outcomes and the table outcome.
///
/// Any declared field missing from `fields` is backfilled as `not_found`.
pub fn assemble(
    ruleset: &RuleSet,
    fields: Vec<(String, FieldOutcome)>,
    table: TableOutcome,
) -> ExtractionResult {
    let mut map: BTreeMap<String, FieldOutcome> = fields.into_iter().collect();
    for name in ruleset.field_names() {
        map.entry(name.to_string())
            .or_insert_with(FieldOutcome::not_found);
    }
    ExtractionResult { fields: map, table }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{FieldStatus, FieldValue};
    use crate::ruleset::RuleSet;

    fn two_field_ruleset() -> RuleSet {
        RuleSet::from_json(
            r#"{"general_fields": [
                {"field_name": "A", "patterns": ["a"]},
                {"field_name": "B", "patterns": ["b"]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn every_declared_field_present() {
        let rs = two_field_ruleset();
        // Only A produced an outcome; B must still appear.
        let fields = vec![(
            "A".to_string(),
            FieldOutcome {
                status: FieldStatus::Matched,
                value: Some(FieldValue::Text("x".into())),
                span: None,
            },
        )];
        let result = assemble(&rs, fields, TableOutcome::not_found());
        assert_eq!(result.fields.len(), 2);
        assert_eq!(result.fields["B"].status, FieldStatus::NotFound);
        assert_eq!(result.fields["A"].status, FieldStatus::Matched);
    }

    #[test]
    fn table_outcome_passed_through() {
        let rs = two_field_ruleset();
        let result = assemble(&rs, vec![], TableOutcome::not_found());
        assert_eq!(
            result.table.status,
            crate::output::TableStatus::TableNotFound
        );
    }
}

//! Scalar field extraction: ordered patterns, first match wins.
//!
//! The ordering contract is deliberate and strict: rule authors put their
//! most specific pattern first and generic fallbacks after, so the first
//! pattern that matches is used *exclusively* — later patterns are never
//! consulted, even when one of them would produce a longer match, and even
//! when the winning match then fails type coercion. Reordering "for a
//! better match" would silently change documents that today extract
//! correctly.
//!
//! The extracted value is the pattern's first capturing group (the
//! surrounding pattern text is context, not output). A pattern without any
//! capturing group yields its whole match.

use crate::output::{FieldOutcome, FieldStatus, Span};
use crate::ruleset::FieldRule;
use tracing::{debug, warn};

/// Run every rule against the normalized text, in declaration order.
///
/// Infallible by design: each rule yields exactly one [`FieldOutcome`],
/// whatever the input looks like.
pub fn extract_fields(rules: &[FieldRule], text: &str) -> Vec<(String, FieldOutcome)> {
    rules
        .iter()
        .map(|rule| (rule.name().to_string(), extract_field(rule, text)))
        .collect()
}

/// Apply one rule's patterns in order; first match wins.
pub fn extract_field(rule: &FieldRule, text: &str) -> FieldOutcome {
    for pattern in rule.patterns() {
        let captures = match pattern.captures(text) {
            Ok(Some(caps)) => caps,
            Ok(None) => continue,
            Err(e) => {
                // Backtrack budget exhausted (or another runtime fault):
                // abandon this pattern rather than stall the caller.
                warn!(
                    field = rule.name(),
                    pattern = pattern.as_str(),
                    error = %e,
                    "match abandoned"
                );
                continue;
            }
        };

        let Some(whole) = captures.get(0) else {
            continue;
        };
        let raw = captures.get(1).unwrap_or(whole);
        let span = Span {
            start: whole.start(),
            end: whole.end(),
        };

        return match rule.parser().parse(raw.as_str()) {
            Some(value) => FieldOutcome {
                status: FieldStatus::Matched,
                value: Some(value),
                span: Some(span),
            },
            None => {
                debug!(
                    field = rule.name(),
                    raw = raw.as_str(),
                    "match found but coercion failed"
                );
                FieldOutcome {
                    status: FieldStatus::TypeError,
                    value: None,
                    span: Some(span),
                }
            }
        };
    }

    FieldOutcome::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FieldValue;
    use crate::ruleset::{FieldRuleConfig, RuleConfig, RuleSet, ValueType};

    fn ruleset(fields: Vec<FieldRuleConfig>) -> RuleSet {
        RuleSet::from_config(RuleConfig {
            version: 1,
            general_fields: fields,
            table_fields: None,
        })
        .unwrap()
    }

    fn field(name: &str, patterns: &[&str]) -> FieldRuleConfig {
        FieldRuleConfig {
            field_name: name.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            value_type: ValueType::String,
            decimal_separator: None,
            thousands_separator: None,
            date_format: None,
            multiline: false,
        }
    }

    #[test]
    fn first_match_wins_over_longer_later_match() {
        // p2 would capture more, but p1 matches and must win.
        let rs = ruleset(vec![field(
            "Ref",
            &[r"Commande\s+(\d{4})", r"Commande\s+(\d+)"],
        )]);
        let out = extract_field(&rs.fields()[0], "Commande 4801377867");
        assert_eq!(out.status, FieldStatus::Matched);
        assert_eq!(out.value, Some(FieldValue::Text("4801".into())));
    }

    #[test]
    fn later_pattern_used_when_first_misses() {
        let rs = ruleset(vec![field(
            "Ref",
            &[r"Bestellung\s+(\d+)", r"Commande\s+(\d+)"],
        )]);
        let out = extract_field(&rs.fields()[0], "Commande 4801377867");
        assert_eq!(out.value, Some(FieldValue::Text("4801377867".into())));
    }

    #[test]
    fn no_match_is_not_found() {
        let rs = ruleset(vec![field("SIRET", &[r"SIRET\s*:\s*(\d+)"])]);
        let out = extract_field(&rs.fields()[0], "no identifiers here");
        assert_eq!(out.status, FieldStatus::NotFound);
        assert_eq!(out.value, None);
        assert_eq!(out.span, None);
    }

    #[test]
    fn coercion_failure_is_type_error_and_stops_pattern_list() {
        // First pattern matches but captures text that is not a number;
        // the second pattern would capture a clean number. First match
        // wins regardless.
        let mut f = field("Total", &[r"Total\s+(\S+)", r"Total\s+\S+\s+(\d+)"]);
        f.value_type = ValueType::Float;
        let rs = ruleset(vec![f]);
        let out = extract_field(&rs.fields()[0], "Total abc 42");
        assert_eq!(out.status, FieldStatus::TypeError);
        assert_eq!(out.value, None);
        assert!(out.span.is_some());
    }

    #[test]
    fn capture_group_not_whole_match() {
        let rs = ruleset(vec![field("Ref", &[r"Commande\s+(\d+)"])]);
        let out = extract_field(&rs.fields()[0], "Commande 4801377867 du 19/03");
        assert_eq!(out.value, Some(FieldValue::Text("4801377867".into())));
        // span covers the whole match, context included
        let span = out.span.unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, "Commande 4801377867".len());
    }

    #[test]
    fn groupless_pattern_falls_back_to_whole_match() {
        let rs = ruleset(vec![field("Marker", &[r"EXEMPLAIRE DUPLICATA"])]);
        let out = extract_field(&rs.fields()[0], "x EXEMPLAIRE DUPLICATA x");
        assert_eq!(
            out.value,
            Some(FieldValue::Text("EXEMPLAIRE DUPLICATA".into()))
        );
    }

    #[test]
    fn multiline_capture_bounded_by_lookahead() {
        let mut f = field(
            "Adresse",
            &[r"Adresse de livraison\s*:\s*\n(.+?)(?=\n\s*\n|\z)"],
        );
        f.multiline = true;
        let rs = ruleset(vec![f]);
        let text = "Adresse de livraison :\n12 rue des Acacias\n33000 Bordeaux\n\nPos   Codet";
        let out = extract_field(&rs.fields()[0], text);
        assert_eq!(
            out.value,
            Some(FieldValue::Text("12 rue des Acacias\n33000 Bordeaux".into()))
        );
    }

    #[test]
    fn exhausted_match_budget_reports_not_found() {
        // Nested quantifiers plus a lookahead force the backtracking
        // engine; against a long run of 'a' with no trailing 'b' the
        // pattern blows through a tiny budget immediately. The field must
        // come back not_found instead of hanging or erroring.
        let config = RuleConfig {
            version: 1,
            general_fields: vec![field("Greedy", &[r"(?=a)(a+)+b"])],
            table_fields: None,
        };
        let rs = RuleSet::from_config_with_budget(config, 100).unwrap();
        let input = "a".repeat(64);
        let out = extract_field(&rs.fields()[0], &input);
        assert_eq!(out.status, FieldStatus::NotFound);
        assert_eq!(out.value, None);
    }

    #[test]
    fn budget_does_not_affect_sane_patterns() {
        let config = RuleConfig {
            version: 1,
            general_fields: vec![field("Ref", &[r"Commande\s+(\d+)"])],
            table_fields: None,
        };
        let rs = RuleSet::from_config_with_budget(config, 100).unwrap();
        let out = extract_field(&rs.fields()[0], "Commande 4801377867");
        assert_eq!(out.status, FieldStatus::Matched);
    }

    #[test]
    fn extract_fields_keeps_declaration_order() {
        let rs = ruleset(vec![
            field("B", &[r"b"]),
            field("A", &[r"a"]),
        ]);
        let outcomes = extract_fields(rs.fields(), "a b");
        assert_eq!(outcomes[0].0, "B");
        assert_eq!(outcomes[1].0, "A");
    }
}

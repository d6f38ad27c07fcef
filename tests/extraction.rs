//! End-to-end tests: a realistic French purchase order extracted with a
//! realistic rule file.
//!
//! The fixture pair (`fixtures/rules.json` / `fixtures/commande.txt`)
//! mirrors the documents this engine was built for: scalar fields above a
//! line-item table, French number and date formats, a terminator line
//! carrying the order total.

use chrono::NaiveDate;
use docfields::{extract, FieldStatus, FieldValue, RowStatus, RuleSet, TableStatus};

const RULES: &str = include_str!("fixtures/rules.json");
const COMMANDE: &str = include_str!("fixtures/commande.txt");

fn ruleset() -> RuleSet {
    RuleSet::from_json(RULES).expect("fixture rules must load")
}

#[test]
fn every_declared_field_is_present_in_result() {
    let rs = ruleset();
    let result = extract(&rs, COMMANDE);
    for name in [
        "CMDRefEnedis",
        "CMDDateCommande",
        "DuhaldeSIRET",
        "TotalHT",
        "AdresseLivraison",
    ] {
        assert!(result.fields.contains_key(name), "missing field {name}");
    }
    // and even on garbage input
    let empty = extract(&rs, "lorem ipsum");
    assert_eq!(empty.fields.len(), result.fields.len());
}

#[test]
fn scalar_fields_extract_with_types() {
    let result = extract(&ruleset(), COMMANDE);

    let reference = &result.fields["CMDRefEnedis"];
    assert_eq!(reference.status, FieldStatus::Matched);
    assert_eq!(
        reference.value,
        Some(FieldValue::Text("4801377867".into()))
    );
    assert!(reference.span.is_some());

    assert_eq!(
        result.fields["CMDDateCommande"].value,
        Some(FieldValue::Date(
            NaiveDate::from_ymd_opt(2025, 3, 19).unwrap()
        ))
    );

    assert_eq!(
        result.fields["DuhaldeSIRET"].value,
        Some(FieldValue::Text("123 456 789 00012".into()))
    );
}

#[test]
fn locale_float_total() {
    // `20.865,78 EUR` with decimal ',' and thousands '.' is 20865.78.
    let result = extract(&ruleset(), COMMANDE);
    let total = &result.fields["TotalHT"];
    assert_eq!(total.status, FieldStatus::Matched);
    assert_eq!(total.value, Some(FieldValue::Number(20865.78)));
}

#[test]
fn multiline_address_bounded_by_blank_line() {
    let result = extract(&ruleset(), COMMANDE);
    assert_eq!(
        result.fields["AdresseLivraison"].value,
        Some(FieldValue::Text(
            "Poste source de Floirac\n12 rue des Acacias\n33270 Floirac".into()
        ))
    );
}

#[test]
fn missing_siret_is_not_found_others_still_populate() {
    let without_siret: String = COMMANDE
        .lines()
        .filter(|l| !l.starts_with("SIRET"))
        .collect::<Vec<_>>()
        .join("\n");
    let result = extract(&ruleset(), &without_siret);

    let siret = &result.fields["DuhaldeSIRET"];
    assert_eq!(siret.status, FieldStatus::NotFound);
    assert_eq!(siret.value, None);

    assert_eq!(result.fields["CMDRefEnedis"].status, FieldStatus::Matched);
    assert_eq!(result.fields["TotalHT"].status, FieldStatus::Matched);
}

#[test]
fn table_rows_extract_typed_cells() {
    let result = extract(&ruleset(), COMMANDE);
    assert_eq!(result.table.status, TableStatus::Found);
    assert_eq!(result.table.rows.len(), 3);
    assert_eq!(
        result.table.columns,
        vec![
            "CMDCodetPosition",
            "CMDCodet",
            "CMDCodetNom",
            "CMDCodetQuantity",
            "CMDCodetUnitPrice",
            "CMDCodetTotalLinePrice",
        ]
    );

    let first = &result.table.rows[0];
    assert_eq!(first.status, RowStatus::Ok);
    assert_eq!(
        first.cells["CMDCodet"],
        Some(FieldValue::Text("7395078".into()))
    );
    assert_eq!(
        first.cells["CMDCodetNom"],
        Some(FieldValue::Text("Tableau monobloc extensible".into()))
    );
    assert_eq!(
        first.cells["CMDCodetUnitPrice"],
        Some(FieldValue::Number(10000.0))
    );

    let last = &result.table.rows[2];
    assert_eq!(
        last.cells["CMDCodetTotalLinePrice"],
        Some(FieldValue::Number(5865.78))
    );
}

#[test]
fn terminator_line_is_not_a_row() {
    let result = extract(&ruleset(), COMMANDE);
    for row in &result.table.rows {
        let nom = row.cells["CMDCodetNom"].as_ref().and_then(|v| v.as_text());
        assert!(
            !nom.unwrap_or_default().contains("Total"),
            "terminator leaked into rows: {row:?}"
        );
    }
}

#[test]
fn header_without_pos_and_codet_excludes_those_columns() {
    // Same rules, reduced header: Pos and Codet labels absent from this
    // document, so those two columns vanish from every row.
    let text = "\
Quantité   Désignation                     P.U. HT     Montant HT
1          Tableau monobloc extensible     10.000,00   10.000,00
Total HT de la commande   10.000,00 EUR";
    let result = extract(&ruleset(), text);
    assert_eq!(result.table.status, TableStatus::Found);
    assert_eq!(
        result.table.columns,
        vec![
            "CMDCodetQuantity",
            "CMDCodetNom",
            "CMDCodetUnitPrice",
            "CMDCodetTotalLinePrice",
        ]
    );
    let row = &result.table.rows[0];
    assert!(!row.cells.contains_key("CMDCodetPosition"));
    assert!(!row.cells.contains_key("CMDCodet"));
    assert_eq!(
        row.cells["CMDCodetNom"],
        Some(FieldValue::Text("Tableau monobloc extensible".into()))
    );
}

#[test]
fn short_row_is_malformed_not_dropped() {
    let text = "\
Pos   Codet     Désignation                     Quantité
001   7395078   Tableau monobloc extensible     1
002   6424704   TR 400
Total HT";
    let result = extract(&ruleset(), text);
    assert_eq!(result.table.rows.len(), 2, "no row silently dropped");
    let short = &result.table.rows[1];
    assert_eq!(short.status, RowStatus::Malformed);
    assert_eq!(short.cells["CMDCodetQuantity"], None);
    assert_eq!(
        short.cells["CMDCodetNom"],
        Some(FieldValue::Text("TR 400".into()))
    );
}

#[test]
fn result_serializes_to_transportable_json() {
    let result = extract(&ruleset(), COMMANDE);
    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();

    assert_eq!(json["fields"]["TotalHT"]["status"], "matched");
    assert_eq!(json["fields"]["TotalHT"]["value"], 20865.78);
    assert_eq!(json["fields"]["CMDDateCommande"]["value"], "2025-03-19");
    assert_eq!(json["table"]["status"], "found");
    assert_eq!(json["table"]["rows"][0]["status"], "ok");
    assert_eq!(
        json["table"]["rows"][0]["cells"]["CMDCodet"],
        "7395078"
    );
}

#[test]
fn crlf_input_extracts_identically() {
    let crlf = COMMANDE.replace('\n', "\r\n");
    let a = extract(&ruleset(), COMMANDE);
    let b = extract(&ruleset(), &crlf);
    assert_eq!(a, b);
}

//! Line-item table extraction.
//!
//! A three-state machine over the normalized lines:
//!
//! ```text
//! SeekingHeader ──header line──▶ InTable ──terminator/EOF──▶ Done
//! ```
//!
//! * `SeekingHeader` — scan until one line matches at least
//!   `min_start_keywords` of the start keywords. That line also decides, for
//!   this document, which declared columns are present and in what
//!   left-to-right order: a column participates only if its `header_pattern`
//!   matches somewhere in the header line. An absent column is excluded
//!   from every row, not an error — suppliers drop columns between form
//!   revisions.
//! * `InTable` — every non-blank line is one row until a line matches an
//!   end keyword (the terminator itself is not a row) or input runs out.
//!   Rows are never silently dropped: a row whose token count does not fit
//!   the mapped columns is emitted with status `malformed` and nulls for
//!   whatever could not be filled. Partial data is more useful downstream
//!   than silence.
//! * `Done` — terminal. Only the first header occurrence is authoritative;
//!   a repeated per-page header later in the document is ignored.
//!
//! Tokenization: columns on these forms are separated by runs of spaces, so
//! a row splits on gaps of two or more spaces/tabs; that keeps single
//! spaces inside a description intact. When that yields a single token for
//! a multi-column table (some text layers emit single-space gaps), the row
//! falls back to splitting on any whitespace.

use crate::output::{FieldValue, RowRecord, RowStatus, TableOutcome, TableStatus};
use crate::pipeline::coerce::ValueParser;
use crate::ruleset::{ColumnRule, TableRule};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Run the table state machine over the normalized text.
///
/// Every *non-blank* line between the header and the terminator produces
/// exactly one row; whitespace-only lines carry no tokens and are not
/// rows. Nothing else is ever dropped.
pub fn extract_table(rule: &TableRule, text: &str) -> TableOutcome {
    let mut lines = text.lines();

    // SeekingHeader: the first satisfying line wins; it fixes the column
    // order for the whole document.
    let Some(present) = lines
        .by_ref()
        .find(|line| is_header_line(rule, line))
        .map(|header| present_columns(rule, header))
    else {
        debug!("no table header found");
        return TableOutcome::not_found();
    };
    debug!(
        columns = present.len(),
        declared = rule.columns().len(),
        "table header found"
    );

    // InTable: consume rows until a terminator or EOF.
    let mut rows: Vec<RowRecord> = Vec::new();
    for line in lines {
        if rule.end_keywords().iter().any(|re| re.is_match(line)) {
            break; // Done; terminator is not part of the table
        }
        if line.trim().is_empty() {
            continue;
        }
        rows.push(map_row(&present, line));
    }

    TableOutcome {
        status: TableStatus::Found,
        columns: present.iter().map(|c| c.name().to_string()).collect(),
        rows,
    }
}

/// Does this line satisfy enough start keywords to be the header?
fn is_header_line(rule: &TableRule, line: &str) -> bool {
    let hits = rule
        .start_keywords()
        .iter()
        .filter(|re| re.is_match(line))
        .count();
    hits >= rule.min_start_keywords()
}

/// Declared columns whose header pattern matches this header line, ordered
/// by where they matched (left to right).
fn present_columns<'a>(rule: &'a TableRule, header_line: &str) -> Vec<&'a ColumnRule> {
    let mut found: Vec<(usize, &ColumnRule)> = rule
        .columns()
        .iter()
        .filter_map(|col| {
            col.header()
                .find(header_line)
                .map(|m| (m.start(), col))
        })
        .collect();
    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, col)| col).collect()
}

static RE_COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Split a row into column tokens.
fn tokenize(line: &str, expected: usize) -> Vec<&str> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = RE_COLUMN_GAP
        .split(trimmed)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() <= 1 && expected > 1 {
        trimmed.split_whitespace().collect()
    } else {
        tokens
    }
}

/// Map one row line onto the columns present in this document.
fn map_row(columns: &[&ColumnRule], line: &str) -> RowRecord {
    let tokens = tokenize(line, columns.len());
    let mut malformed = tokens.len() != columns.len();
    let mut cells: BTreeMap<String, Option<FieldValue>> = BTreeMap::new();

    let overflow = tokens.len() > columns.len();
    for (i, col) in columns.iter().enumerate() {
        let last = i + 1 == columns.len();
        let value = if last && overflow && matches!(col.parser(), ValueParser::Text { .. }) {
            // Extra tokens usually mean a description split on an internal
            // multi-space gap; keep the text rather than truncating it.
            Some(tokens[i..].join(" "))
        } else {
            tokens.get(i).map(|t| t.to_string())
        };

        let parsed = match value {
            Some(raw) => {
                let parsed = col.parser().parse(&raw);
                if parsed.is_none() {
                    malformed = true;
                }
                parsed
            }
            None => None,
        };
        cells.insert(col.name().to_string(), parsed);
    }

    RowRecord {
        status: if malformed {
            RowStatus::Malformed
        } else {
            RowStatus::Ok
        },
        cells,
    }
}

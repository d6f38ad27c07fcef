//! Type coercion: turn a captured substring into a typed [`FieldValue`].
//!
//! The declared `type` of a rule is decoded *once*, at load time, into a
//! [`ValueParser`] variant holding only its relevant parameters. Use-sites
//! (scalar fields and table cells alike) just call [`ValueParser::parse`];
//! no code outside this module ever branches on a type string.
//!
//! Coercion failure is not an error: `parse` returns `None` and the caller
//! records a `type_error` status for that field or cell.

use crate::output::FieldValue;
use crate::ruleset::ValueType;
use chrono::NaiveDate;

/// Default decimal separator of the source locale (French documents).
pub const DEFAULT_DECIMAL_SEPARATOR: char = ',';
/// Default thousands separator of the source locale.
pub const DEFAULT_THOUSANDS_SEPARATOR: char = '.';
/// Default date format of the source locale.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Locale-specific number formatting: which characters group thousands and
/// mark the decimal point in the *source* text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal: char,
    pub thousands: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal: DEFAULT_DECIMAL_SEPARATOR,
            thousands: DEFAULT_THOUSANDS_SEPARATOR,
        }
    }
}

impl NumberFormat {
    /// Parse a locale-formatted number: strip the thousands separator
    /// entirely, replace the decimal separator with `.`, then parse.
    ///
    /// Returns `None` when non-numeric residue remains — the caller
    /// surfaces that as `type_error`, never as a hard failure.
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let mut canonical = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            if ch == self.thousands {
                continue;
            }
            if ch == self.decimal {
                canonical.push('.');
            } else {
                canonical.push(ch);
            }
        }
        canonical.parse::<f64>().ok()
    }

    /// Format `value` back into the source locale (inverse of [`parse`]):
    /// grouped integer digits, locale decimal separator.
    ///
    /// Round-trips: `parse(&format(v)) == Some(v)` for every finite `v`
    /// this crate produces, since formatting uses the shortest exact
    /// decimal representation.
    ///
    /// [`parse`]: NumberFormat::parse
    pub fn format(&self, value: f64) -> String {
        let canonical = value.to_string();
        let (sign, rest) = match canonical.strip_prefix('-') {
            Some(r) => ("-", r),
            None => ("", canonical.as_str()),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (rest, None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        let digits: Vec<char> = int_part.chars().collect();
        for (i, ch) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands);
            }
            grouped.push(*ch);
        }

        match frac_part {
            Some(f) => format!("{sign}{grouped}{}{f}", self.decimal),
            None => format!("{sign}{grouped}"),
        }
    }
}

/// Tagged-variant parser: one variant per declared value type, each holding
/// only its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueParser {
    /// Trim; multiline captures additionally get internal blank lines
    /// dropped and line breaks collapsed to single `\n`.
    Text { multiline: bool },
    /// Locale-aware numeric parsing.
    Number(NumberFormat),
    /// chrono format string, e.g. `%d/%m/%Y`.
    Date { format: String },
}

impl ValueParser {
    /// Fold a raw rule's type and optional parameters into the right
    /// variant, applying source-locale defaults.
    pub fn from_config(
        value_type: ValueType,
        decimal_separator: Option<char>,
        thousands_separator: Option<char>,
        date_format: Option<&str>,
        multiline: bool,
    ) -> Self {
        match value_type {
            ValueType::String => ValueParser::Text { multiline },
            ValueType::Float => ValueParser::Number(NumberFormat {
                decimal: decimal_separator.unwrap_or(DEFAULT_DECIMAL_SEPARATOR),
                thousands: thousands_separator.unwrap_or(DEFAULT_THOUSANDS_SEPARATOR),
            }),
            ValueType::Date => ValueParser::Date {
                format: date_format.unwrap_or(DEFAULT_DATE_FORMAT).to_string(),
            },
        }
    }

    /// Coerce a captured substring. `None` means the capture does not
    /// conform to the declared type (`type_error` at the call site).
    pub fn parse(&self, raw: &str) -> Option<FieldValue> {
        match self {
            ValueParser::Text { multiline } => {
                Some(FieldValue::Text(clean_text(raw, *multiline)))
            }
            ValueParser::Number(format) => format.parse(raw).map(FieldValue::Number),
            ValueParser::Date { format } => NaiveDate::parse_from_str(raw.trim(), format)
                .ok()
                .map(FieldValue::Date),
        }
    }
}

/// Trim; for multiline captures, trim every line and collapse blank-line
/// runs so the value carries single `\n` separators only.
fn clean_text(raw: &str, multiline: bool) -> String {
    let trimmed = raw.trim();
    if !multiline {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! Error types for the docfields library.
//!
//! Only *configuration* problems are real errors here: without a valid
//! [`crate::RuleSet`] there is nothing to extract, so [`ConfigError`] is
//! fatal and returned as `Err` from the loader.
//!
//! Everything that can go wrong while extracting — a pattern that does not
//! match, a captured value that will not coerce to its declared type, a
//! table row with the wrong shape — is *expected* on real documents and is
//! captured as data instead: see [`crate::output::FieldStatus`],
//! [`crate::output::TableStatus`] and [`crate::output::RowStatus`]. One bad
//! field never aborts extraction of the rest of the document, and the
//! caller always receives a complete [`crate::output::ExtractionResult`].

use thiserror::Error;

/// Fatal errors raised while loading or validating a rule set.
///
/// Field-level and row-level failures are statuses inside
/// [`crate::output::ExtractionResult`], never variants here.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rule document is not valid JSON, or a field carries an
    /// unsupported `type` (serde rejects the unknown enum variant).
    #[error("Rule configuration is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    /// A pattern failed to compile as a regular expression.
    #[error("Pattern for {context} does not compile: `{pattern}`\n{detail}")]
    BadPattern {
        /// Which slot the pattern came from, e.g. `field 'TotalHT'` or
        /// `table start keyword #2`.
        context: String,
        pattern: String,
        detail: String,
    },

    /// Two rules (general fields and table columns combined) share a name.
    #[error("Duplicate field name '{name}': field names must be unique across general fields and table columns")]
    DuplicateField { name: String },

    /// A general field rule declares no patterns at all.
    #[error("Field '{field}' has an empty pattern list; every rule needs at least one pattern")]
    EmptyPatterns { field: String },

    /// The table rule has no start keywords, so a header can never be found.
    #[error("Table rule has no start_keywords; the header row would be undetectable")]
    NoStartKeywords,

    /// The table rule declares no columns.
    #[error("Table rule has no columns")]
    NoColumns,

    /// A float rule ends up with the same character as decimal and
    /// thousands separator (defaults included), which would make the
    /// decimal separator unreachable: the thousands separator is stripped
    /// before the decimal is read.
    #[error("Field '{field}' uses '{separator}' as both decimal and thousands separator; set both explicitly to distinct characters")]
    SeparatorClash { field: String, separator: char },
}

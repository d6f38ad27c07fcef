//! # docfields
//!
//! Rule-driven structured field extraction from OCR'd document text.
//!
//! ## Why this crate?
//!
//! Semi-structured business documents — purchase orders, invoices, delivery
//! notes — carry the same fields in roughly the same places, but OCR output
//! is just text. Hard-coding one parser per supplier does not scale.
//! Instead this crate compiles a *declarative rule file* (patterns, types,
//! table delimiters, authored in JSON by whoever knows the document) and
//! applies it to raw text, producing a typed record plus line-item rows,
//! with a per-field status for everything that did not extract cleanly.
//!
//! OCR itself, PDF rendering, HTTP serving and persistence are external
//! collaborators: this crate consumes plain text and a rule set, nothing
//! else.
//!
//! ## Pipeline Overview
//!
//! ```text
//! rules.json ──▶ RuleSet (compiled once, shared read-only)
//!                   │
//! text ──▶ normalize ─┬─▶ scalar fields (first-match-wins patterns)
//!                     └─▶ line-item table (header/terminator state machine)
//!                                 │
//!                                 ▼
//!                          ExtractionResult
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use docfields::{extract, RuleSet};
//!
//! fn main() -> Result<(), docfields::ConfigError> {
//!     let ruleset = RuleSet::from_json(
//!         r#"{"general_fields": [
//!             {"field_name": "TotalHT",
//!              "patterns": ["Total HT[^\\d]*([\\d.,]+)"],
//!              "type": "float",
//!              "decimal_separator": ",",
//!              "thousands_separator": "."}
//!         ]}"#,
//!     )?;
//!     let result = extract(&ruleset, "Total HT de la commande 20.865,78 EUR");
//!     assert_eq!(
//!         result.fields["TotalHT"].value.as_ref().and_then(|v| v.as_number()),
//!         Some(20865.78)
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Only a malformed rule file is an error ([`ConfigError`], fatal at load).
//! During extraction nothing is raised: a pattern that does not match is
//! `not_found`, a match that will not coerce is `type_error`, a misshapen
//! table row is `malformed` but kept — the caller always receives a
//! complete [`ExtractionResult`] and branches on status.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docfields` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docfields = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod ruleset;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use error::ConfigError;
pub use extract::{extract, extract_with, ExtractOptions};
pub use output::{
    ExtractionResult, FieldOutcome, FieldStatus, FieldValue, RowRecord, RowStatus, Span,
    TableOutcome, TableStatus,
};
pub use ruleset::{RuleConfig, RuleSet, ValueType};

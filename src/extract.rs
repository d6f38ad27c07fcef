//! Top-level extraction entry points.
//!
//! The engine is stateless and side-effect free per invocation: it reads an
//! immutable [`RuleSet`] and an immutable input text and produces a fresh
//! [`ExtractionResult`]. Share one `RuleSet` by reference across as many
//! threads as you like — scheduling is entirely the caller's business, and
//! nothing here blocks, suspends, or needs cancellation support.

use crate::output::{ExtractionResult, FieldStatus, TableOutcome};
use crate::pipeline::{assemble, fields, normalize, table};
use crate::ruleset::RuleSet;
use tracing::{debug, info};

/// Per-call knobs, all forwarded to the text normalizer.
///
/// # Example
/// ```rust
/// use docfields::ExtractOptions;
///
/// let options = ExtractOptions::default().join_hyphenated(true);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    join_hyphenated: bool,
    collapse_spaces: bool,
}

impl ExtractOptions {
    /// Join hyphenation-broken words before matching. Default: off.
    pub fn join_hyphenated(mut self, v: bool) -> Self {
        self.join_hyphenated = v;
        self
    }

    /// Collapse in-line whitespace runs before matching. Default: off.
    /// Leave off when the rule set has a table: the row tokenizer needs
    /// multi-space gaps as column boundaries.
    pub fn collapse_spaces(mut self, v: bool) -> Self {
        self.collapse_spaces = v;
        self
    }

    fn normalize_options(&self) -> normalize::NormalizeOptions {
        normalize::NormalizeOptions {
            join_hyphenated: self.join_hyphenated,
            collapse_spaces: self.collapse_spaces,
        }
    }
}

/// Extract every declared field and the line-item table from `text`.
///
/// This is the primary entry point for the library. It never fails: partial
/// failure is expressed through per-field and per-row statuses inside the
/// result, and the result always contains every declared field name.
pub fn extract(ruleset: &RuleSet, text: &str) -> ExtractionResult {
    extract_with(ruleset, text, &ExtractOptions::default())
}

/// [`extract`] with explicit [`ExtractOptions`].
pub fn extract_with(ruleset: &RuleSet, text: &str, options: &ExtractOptions) -> ExtractionResult {
    debug!(
        chars = text.len(),
        rules = ruleset.fields().len(),
        "starting extraction"
    );

    // ── Step 1: Normalize once; both extractors read the same text ───────
    let normalized = normalize::normalize(text, &options.normalize_options());

    // ── Step 2: Scalar fields ────────────────────────────────────────────
    let field_outcomes = fields::extract_fields(ruleset.fields(), &normalized);

    // ── Step 3: Line-item table (independent of step 2) ──────────────────
    let table_outcome = match ruleset.table() {
        Some(rule) => table::extract_table(rule, &normalized),
        // A rule set without a table rule reports an empty, not-found table.
        None => TableOutcome::not_found(),
    };

    // ── Step 4: Assemble ─────────────────────────────────────────────────
    let result = assemble::assemble(ruleset, field_outcomes, table_outcome);

    let matched = result
        .fields
        .values()
        .filter(|f| f.status == FieldStatus::Matched)
        .count();
    info!(
        matched,
        declared = result.fields.len(),
        rows = result.table.rows.len(),
        "extraction complete"
    );

    result
}

//! Pipeline stages for rule-driven field extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap heuristics (e.g. the row tokenizer) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ fields ──┐
//! normalize ─┤            ├─▶ assemble
//!            └─▶ table  ──┘
//! ```
//!
//! 1. [`normalize`] — canonicalise line endings and whitespace so patterns
//!    written against one newline convention behave identically regardless
//!    of the OCR backend's quirks
//! 2. [`fields`]  — first-match-wins scalar extraction over the ordered
//!    pattern lists
//! 3. [`table`]   — the header/terminator state machine producing line-item
//!    rows
//! 4. [`coerce`]  — shared type coercion (locale numerics, dates), used by
//!    both extractors
//! 5. [`assemble`] — pure merge into the final [`crate::output::ExtractionResult`]
//!
//! Stages 2 and 3 both read the same normalized text and are independent:
//! a missing table never affects scalar fields and vice versa.

pub mod assemble;
pub mod coerce;
pub mod fields;
pub mod normalize;
pub mod table;

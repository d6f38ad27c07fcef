//! Text normalisation: canonicalise raw OCR/text-layer output before rule
//! application.
//!
//! OCR backends disagree on line endings, leave trailing spaces on lines,
//! and sometimes break words across lines with a hyphen. Rules are written
//! against one canonical convention (`\n` line breaks, no trailing
//! whitespace), so every input passes through here exactly once before
//! either extractor sees it.
//!
//! Every pass is a pure `&str → String` function and the whole pipeline is
//! idempotent: `normalize(normalize(x)) == normalize(x)`. Match spans in
//! the output refer to this normalized text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Knobs for the optional normalisation passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Join hyphenation-broken words: a line ending in `-` is merged with
    /// the next line's first word (`exten-\nsible` → `extensible`).
    /// Off by default: product codes legitimately end in `-` on some forms.
    pub join_hyphenated: bool,

    /// Collapse runs of spaces/tabs inside a line down to one space.
    /// Off by default: the table tokenizer relies on multi-space gaps as
    /// column boundaries.
    pub collapse_spaces: bool,
}

/// Normalise `raw` according to `options`.
///
/// Passes, in order: line-ending normalisation (CRLF/CR → LF), optional
/// dehyphenation, per-line trailing-whitespace trim, optional in-line
/// whitespace collapsing.
pub fn normalize(raw: &str, options: &NormalizeOptions) -> String {
    let s = normalize_line_endings(raw);
    let s = if options.join_hyphenated {
        join_hyphenated(&s)
    } else {
        s
    };
    let lines = s.lines().map(str::trim_end);
    if options.collapse_spaces {
        lines
            .map(|l| RE_SPACE_RUN.replace_all(l, " ").into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        lines.collect::<Vec<_>>().join("\n")
    }
}

fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

// Letter, hyphen, line break, optional indent, letter. Matching letters on
// both sides keeps hyphens that end a code or a lone dash line intact.
static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{L})").unwrap());

fn join_hyphenated(input: &str) -> String {
    // A single replace pass consumes the letter after each break, so a
    // chain of one-letter fragments ("a-\nb-\nc") leaves every second
    // break unjoined. Iterate to a fixpoint so one normalize call settles.
    let mut joined = input.to_string();
    loop {
        let next = RE_HYPHEN_BREAK.replace_all(&joined, "$1$2");
        if next == joined {
            return joined;
        }
        joined = next.into_owned();
    }
}

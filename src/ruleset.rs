//! Rule model and loader.
//!
//! Rules arrive as a declarative JSON document (the shape the original
//! operators author by hand) and are decoded in two steps:
//!
//! 1. [`RuleConfig`] — the raw serde model, one struct per JSON object.
//!    Decoding already rejects unknown `type` strings, because the value
//!    type is an enum, not a free-form string.
//! 2. [`RuleSet`] — the compiled, immutable model the engine runs against:
//!    every pattern compiled, every rule's type-specific parameters folded
//!    into a tagged [`ValueParser`] variant so no use-site ever branches on
//!    a type string.
//!
//! A `RuleSet` is loaded once (a single attempt, no retry — the caller
//! decides whether to fail startup or keep a previous set) and shared
//! read-only by every extraction call; nothing mutates it afterwards.
//!
//! ## Pattern engines
//!
//! General-field patterns compile with `fancy_regex`: rule authors bound
//! multiline captures with zero-width lookahead (`(?=…)`) so the capture
//! stops at the next labelled block without consuming it, and the `regex`
//! crate rejects look-around. Table start/end keywords and column header
//! patterns are scanned against every line of every document, so they use
//! the plain `regex` crate: linear-time matching, no look-around needed.

use crate::error::ConfigError;
use crate::pipeline::coerce::{
    ValueParser, DEFAULT_DECIMAL_SEPARATOR, DEFAULT_THOUSANDS_SEPARATOR,
};
use serde::Deserialize;
use std::collections::HashSet;

/// Work budget per pattern application before a match attempt is abandoned
/// and the field reported as not found. Generous for sane rules; a
/// pathological pattern on a pathological document hits it quickly instead
/// of stalling the whole service.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

// ── Raw configuration (serde) ────────────────────────────────────────────

/// Top-level rule document as authored in JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Rule-format version. Currently informational.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Scalar field rules, in declaration order.
    #[serde(default)]
    pub general_fields: Vec<FieldRuleConfig>,
    /// Line-item table rule, if the document type has one.
    #[serde(default)]
    pub table_fields: Option<TableConfig>,
}

fn default_version() -> u32 {
    1
}

/// Declared value type of a field or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Float,
    Date,
}

/// One scalar field rule as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRuleConfig {
    pub field_name: String,
    /// Ordered candidate patterns; the first that matches wins.
    pub patterns: Vec<String>,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    /// Decimal separator of the source locale. Default `,`.
    pub decimal_separator: Option<char>,
    /// Thousands separator of the source locale. Default `.`.
    pub thousands_separator: Option<char>,
    /// chrono format string for `date` fields. Default `%d/%m/%Y`.
    pub date_format: Option<String>,
    /// Allow the capture to span lines (`.` matches `\n`).
    #[serde(default)]
    pub multiline: bool,
}

/// The line-item table rule as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Regex fragments identifying the header row.
    pub start_keywords: Vec<String>,
    /// Patterns terminating the table (terminator not included).
    #[serde(default)]
    pub end_keywords: Vec<String>,
    /// How many start keywords one line must match to count as the header.
    #[serde(default = "default_min_start")]
    pub min_start_keywords: usize,
    /// Declared columns in canonical order.
    pub columns: Vec<ColumnConfig>,
}

fn default_min_start() -> usize {
    1
}

/// One table column as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub field_name: String,
    /// Matched against the header line to locate this column's position.
    pub header_pattern: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    pub decimal_separator: Option<char>,
    pub thousands_separator: Option<char>,
    pub date_format: Option<String>,
}

// ── Compiled model ───────────────────────────────────────────────────────

/// One compiled scalar field rule.
#[derive(Debug)]
pub struct FieldRule {
    name: String,
    patterns: Vec<fancy_regex::Regex>,
    parser: ValueParser,
}

impl FieldRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[fancy_regex::Regex] {
        &self.patterns
    }

    pub fn parser(&self) -> &ValueParser {
        &self.parser
    }
}

/// One compiled table column.
#[derive(Debug)]
pub struct ColumnRule {
    name: String,
    header: regex::Regex,
    parser: ValueParser,
}

impl ColumnRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &regex::Regex {
        &self.header
    }

    pub fn parser(&self) -> &ValueParser {
        &self.parser
    }
}

/// The compiled table rule.
#[derive(Debug)]
pub struct TableRule {
    start_keywords: Vec<regex::Regex>,
    end_keywords: Vec<regex::Regex>,
    min_start_keywords: usize,
    columns: Vec<ColumnRule>,
}

impl TableRule {
    pub fn start_keywords(&self) -> &[regex::Regex] {
        &self.start_keywords
    }

    pub fn end_keywords(&self) -> &[regex::Regex] {
        &self.end_keywords
    }

    pub fn min_start_keywords(&self) -> usize {
        self.min_start_keywords
    }

    pub fn columns(&self) -> &[ColumnRule] {
        &self.columns
    }
}

/// An immutable, validated, compiled rule set.
///
/// Construct with [`RuleSet::from_json`] or [`RuleSet::from_config`], then
/// share by reference across as many concurrent extraction calls as you
/// like — nothing here is mutated after load.
#[derive(Debug)]
pub struct RuleSet {
    version: u32,
    fields: Vec<FieldRule>,
    table: Option<TableRule>,
}

impl RuleSet {
    /// Parse and compile a JSON rule document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuleConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// Compile an already-decoded [`RuleConfig`] with the default match
    /// work budget.
    pub fn from_config(config: RuleConfig) -> Result<Self, ConfigError> {
        Self::from_config_with_budget(config, DEFAULT_BACKTRACK_LIMIT)
    }

    /// Compile with an explicit per-pattern backtrack budget.
    ///
    /// The budget is baked into the compiled patterns: a match attempt that
    /// exceeds it is abandoned and the field reports `not_found` instead of
    /// stalling the caller.
    pub fn from_config_with_budget(
        config: RuleConfig,
        backtrack_limit: usize,
    ) -> Result<Self, ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for f in &config.general_fields {
            if !seen.insert(f.field_name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    name: f.field_name.clone(),
                });
            }
        }
        if let Some(table) = &config.table_fields {
            for c in &table.columns {
                if !seen.insert(c.field_name.as_str()) {
                    return Err(ConfigError::DuplicateField {
                        name: c.field_name.clone(),
                    });
                }
            }
        }

        let fields = config
            .general_fields
            .iter()
            .map(|f| compile_field(f, backtrack_limit))
            .collect::<Result<Vec<_>, _>>()?;

        let table = config.table_fields.as_ref().map(compile_table).transpose()?;

        Ok(Self {
            version: config.version,
            fields,
            table,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Scalar field rules in declaration order.
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn table(&self) -> Option<&TableRule> {
        self.table.as_ref()
    }

    /// All declared scalar field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ── Compilation helpers ──────────────────────────────────────────────────

/// A float rule whose effective separators (declared or defaulted) collide
/// would strip its own decimal point; reject it up front.
fn check_separators(
    name: &str,
    value_type: ValueType,
    decimal: Option<char>,
    thousands: Option<char>,
) -> Result<(), ConfigError> {
    if value_type != ValueType::Float {
        return Ok(());
    }
    let decimal = decimal.unwrap_or(DEFAULT_DECIMAL_SEPARATOR);
    let thousands = thousands.unwrap_or(DEFAULT_THOUSANDS_SEPARATOR);
    if decimal == thousands {
        return Err(ConfigError::SeparatorClash {
            field: name.to_string(),
            separator: decimal,
        });
    }
    Ok(())
}

fn compile_field(config: &FieldRuleConfig, budget: usize) -> Result<FieldRule, ConfigError> {
    if config.patterns.is_empty() {
        return Err(ConfigError::EmptyPatterns {
            field: config.field_name.clone(),
        });
    }
    check_separators(
        &config.field_name,
        config.value_type,
        config.decimal_separator,
        config.thousands_separator,
    )?;

    let patterns = config
        .patterns
        .iter()
        .map(|p| {
            // Multiline rules get dot-matches-newline so a non-greedy
            // capture bounded by a lookahead can span lines.
            let source = if config.multiline {
                format!("(?s){p}")
            } else {
                p.clone()
            };
            fancy_regex::RegexBuilder::new(&source)
                .backtrack_limit(budget)
                .build()
                .map_err(|e| ConfigError::BadPattern {
                    context: format!("field '{}'", config.field_name),
                    pattern: p.clone(),
                    detail: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FieldRule {
        name: config.field_name.clone(),
        patterns,
        parser: ValueParser::from_config(
            config.value_type,
            config.decimal_separator,
            config.thousands_separator,
            config.date_format.as_deref(),
            config.multiline,
        ),
    })
}

fn compile_table(config: &TableConfig) -> Result<TableRule, ConfigError> {
    if config.start_keywords.is_empty() {
        return Err(ConfigError::NoStartKeywords);
    }
    if config.columns.is_empty() {
        return Err(ConfigError::NoColumns);
    }

    let compile_line_pattern = |pattern: &str, context: String| {
        regex::Regex::new(pattern).map_err(|e| ConfigError::BadPattern {
            context,
            pattern: pattern.to_string(),
            detail: e.to_string(),
        })
    };

    let start_keywords = config
        .start_keywords
        .iter()
        .enumerate()
        .map(|(i, p)| compile_line_pattern(p, format!("table start keyword #{}", i + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let end_keywords = config
        .end_keywords
        .iter()
        .enumerate()
        .map(|(i, p)| compile_line_pattern(p, format!("table end keyword #{}", i + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let columns = config
        .columns
        .iter()
        .map(|c| {
            check_separators(
                &c.field_name,
                c.value_type,
                c.decimal_separator,
                c.thousands_separator,
            )?;
            Ok(ColumnRule {
                name: c.field_name.clone(),
                header: compile_line_pattern(
                    &c.header_pattern,
                    format!("column '{}'", c.field_name),
                )?,
                parser: ValueParser::from_config(
                    c.value_type,
                    c.decimal_separator,
                    c.thousands_separator,
                    c.date_format.as_deref(),
                    false,
                ),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    // Requiring more keyword hits than keywords exist would make the header
    // undetectable; clamp rather than error so rules stay portable.
    let min_start_keywords = config.min_start_keywords.clamp(1, start_keywords.len());

    Ok(TableRule {
        start_keywords,
        end_keywords,
        min_start_keywords,
        columns,
    })
}

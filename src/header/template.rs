//! # Header Templates
//!
//! Loading and rendering of the raw header template text. A template is plain
//! text with an optional `{{year}}` placeholder; lines carrying the
//! placeholder become "variable" lines that the matching engine accepts with
//! any concrete year or year range in that position.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;

use crate::header::text;
use crate::verbose_log;

/// Placeholder accepted in template lines.
pub const YEAR_VAR: &str = "{{year}}";

/// What a `{{year}}` position accepts when matching an existing header:
/// a four-digit year, a year range, or a comma-separated list of years.
const YEAR_PATTERN: &str = "\\d{4}(?:\\s*[-,]\\s*\\d{4})*";

/// Data used to fill out a header template.
pub struct TemplateData {
  /// The copyright year rendered into `{{year}}` positions.
  pub year: String,
}

impl TemplateData {
  /// Create template data, defaulting the year to the current one.
  pub fn new(year: Option<String>) -> Self {
    let year = year.unwrap_or_else(|| chrono::Local::now().year().to_string());
    Self { year }
  }
}

/// A raw header template.
#[derive(Debug, Clone)]
pub struct HeaderTemplate {
  raw: String,
}

impl HeaderTemplate {
  /// Create a template from text already in memory.
  pub fn new(raw: &str) -> Self {
    Self { raw: raw.to_string() }
  }

  /// Load a template from a file.
  pub fn load(path: &Path) -> Result<Self> {
    verbose_log!("Loading header template from: {}", path.display());

    let raw =
      fs::read_to_string(path).with_context(|| format!("Failed to read header template file: {}", path.display()))?;

    Ok(Self { raw })
  }

  /// The template text exactly as loaded.
  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// Content lines of the template, with a single trailing blank line
  /// stripped (trailing-newline normalization).
  pub fn lines(&self) -> Vec<&str> {
    let mut lines: Vec<&str> = self.raw.lines().collect();
    if let Some(last) = lines.last()
      && text::is_blank(last)
    {
      lines.pop();
    }
    lines
  }
}

/// Substitute template placeholders with concrete values.
pub fn substitute(line: &str, data: &TemplateData) -> String {
  line.replace(YEAR_VAR, &data.year)
}

/// True iff the line carries a placeholder and therefore matches by pattern
/// rather than literal equality.
pub fn is_variable(line: &str) -> bool {
  line.contains(YEAR_VAR)
}

/// Build the interior of the wildcard pattern for a variable line: literal
/// text around the placeholder, a year expression at the placeholder.
///
/// Returns `None` for non-variable lines. The caller anchors the pattern.
pub fn variable_pattern(line: &str) -> Option<String> {
  if !is_variable(line) {
    return None;
  }

  let mut pattern = String::new();
  let mut rest = line;
  while let Some(idx) = rest.find(YEAR_VAR) {
    pattern.push_str(&regex::escape(&rest[..idx]));
    pattern.push_str(YEAR_PATTERN);
    rest = &rest[idx + YEAR_VAR.len()..];
  }
  pattern.push_str(&regex::escape(rest));

  Some(pattern)
}

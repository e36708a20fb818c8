//! # Comment Header Formats
//!
//! This module defines how a license header is delimited and decorated for one
//! comment syntax, and the registry that picks a format for a given file.
//!
//! A [`CommentHeaderFormat`] is an immutable value: a start pattern that
//! recognizes the first header line, an optional end pattern for block styles,
//! the literal per-line prefix, and an optional skip pattern for lines that are
//! transparent to the scan (shebangs, XML declarations). Formats are built once
//! at startup and shared read-only across all worker threads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::header::text;

/// Errors raised while building formats or compiling header templates.
///
/// These are configuration errors: deterministic, fatal at startup, and
/// surfaced before any file is touched.
#[derive(Debug, Error)]
pub enum HeaderError {
  /// The header template contained no content lines.
  #[error("header template is empty")]
  EmptyTemplate,

  /// A comment style was structurally unusable.
  #[error("invalid comment style '{style}': {reason}")]
  InvalidStyle { style: String, reason: String },

  /// A start/end/skip pattern failed to compile.
  #[error("invalid pattern for comment style '{style}'")]
  InvalidPattern {
    style: String,
    #[source]
    source: regex::Error,
  },

  /// A mapping referenced a style name that is not registered.
  #[error("unknown comment style '{style}'")]
  UnknownStyle { style: String },

  /// A rendered header line would not be recognized when scanned back.
  #[error("rendered header line '{line}' would not be recognized when scanning the header back")]
  UnmatchableLine { line: String },
}

/// How a header block is delimited and decorated for one comment syntax.
#[derive(Debug)]
pub struct CommentHeaderFormat {
  name: String,
  start: Regex,
  end: Option<Regex>,
  skip: Option<Regex>,
  open: Option<String>,
  prefix: String,
  close: Option<String>,
}

impl CommentHeaderFormat {
  /// Create a line-comment format: every header line starts with `prefix`
  /// and the block has no explicit terminator.
  ///
  /// The start pattern is derived from the prefix. A line style with an
  /// all-whitespace prefix is rejected because nothing would bound the
  /// header block.
  ///
  /// # Arguments
  ///
  /// * `name` - Registry name for the style (e.g. "slashes")
  /// * `prefix` - The prefix for each line (e.g. "// " or "# ")
  pub fn line(name: &str, prefix: &str) -> Result<Self, HeaderError> {
    let anchor = prefix.trim_end();
    if anchor.is_empty() {
      return Err(HeaderError::InvalidStyle {
        style: name.to_string(),
        reason: "line styles need a non-empty prefix to bound the header block".to_string(),
      });
    }

    let start = compile(name, &format!("^\\s*{}", regex::escape(anchor)))?;

    Ok(Self {
      name: name.to_string(),
      start,
      end: None,
      skip: None,
      open: None,
      prefix: prefix.to_string(),
      close: None,
    })
  }

  /// Create a block-comment format with literal open/close wrapper lines.
  ///
  /// Start and end patterns are derived from the wrapper literals. The
  /// prefix may be empty for styles whose block is bounded by the close
  /// marker alone.
  ///
  /// # Arguments
  ///
  /// * `name` - Registry name for the style (e.g. "block")
  /// * `open` - The line that opens the block (e.g. "/*")
  /// * `prefix` - The prefix for each content line (e.g. " * ")
  /// * `close` - The line that closes the block (e.g. " */")
  pub fn block(name: &str, open: &str, prefix: &str, close: &str) -> Result<Self, HeaderError> {
    if open.trim().is_empty() || close.trim().is_empty() {
      return Err(HeaderError::InvalidStyle {
        style: name.to_string(),
        reason: "block styles need non-empty open and close markers".to_string(),
      });
    }

    let start = compile(name, &format!("^\\s*{}", regex::escape(open.trim())))?;
    let end = compile(name, &format!("{}\\s*$", regex::escape(close.trim())))?;

    Ok(Self {
      name: name.to_string(),
      start,
      end: Some(end),
      skip: None,
      open: Some(open.to_string()),
      prefix: prefix.to_string(),
      close: Some(close.to_string()),
    })
  }

  /// Replace the derived start pattern with an explicit one.
  pub fn with_start(mut self, pattern: &str) -> Result<Self, HeaderError> {
    self.start = compile(&self.name, pattern)?;
    Ok(self)
  }

  /// Replace the derived end pattern with an explicit one.
  pub fn with_end(mut self, pattern: &str) -> Result<Self, HeaderError> {
    self.end = Some(compile(&self.name, pattern)?);
    Ok(self)
  }

  /// Attach a skip pattern for lines that are transparent to the scan.
  pub fn with_skip(mut self, pattern: &str) -> Result<Self, HeaderError> {
    self.skip = Some(compile(&self.name, pattern)?);
    Ok(self)
  }

  /// Registry name of this style.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Pattern matching the first line of a header block.
  pub const fn start(&self) -> &Regex {
    &self.start
  }

  /// Pattern marking the last line of a header block, if the style has an
  /// explicit terminator.
  pub const fn end(&self) -> Option<&Regex> {
    self.end.as_ref()
  }

  /// Skip pattern, if configured.
  pub const fn skip(&self) -> Option<&Regex> {
    self.skip.as_ref()
  }

  /// Literal line that opens the block, for block styles.
  pub fn open(&self) -> Option<&str> {
    self.open.as_deref()
  }

  /// Literal prefix each content line is decorated with.
  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// Literal line that closes the block, for block styles.
  pub fn close(&self) -> Option<&str> {
    self.close.as_deref()
  }

  /// True iff the line matches the start pattern.
  pub fn matches_start(&self, line: &str) -> bool {
    self.start.is_match(line)
  }

  /// True iff an end pattern is configured and the line matches it.
  pub fn matches_end(&self, line: &str) -> bool {
    self.end.as_ref().is_some_and(|pattern| pattern.is_match(line))
  }

  /// True iff a skip pattern is configured and the line matches it.
  ///
  /// A missing pattern never matches, so skip handling is a no-op for
  /// styles without one.
  pub fn matches_skip(&self, line: &str) -> bool {
    self.skip.as_ref().is_some_and(|pattern| pattern.is_match(line))
  }

  /// Prefix continuation rule: does this line extend a header block?
  ///
  /// Lines inside a block must start with the prefix (ignoring its trailing
  /// whitespace, so bare "//" or " *" lines qualify). Styles with an empty
  /// prefix accept any line, leaving the end pattern to bound the block.
  pub fn matches_prefix(&self, line: &str) -> bool {
    line.starts_with(self.prefix.trim_end())
  }
}

fn compile(style: &str, pattern: &str) -> Result<Regex, HeaderError> {
  Regex::new(pattern).map_err(|source| HeaderError::InvalidPattern {
    style: style.to_string(),
    source,
  })
}

/// Registry of comment header formats keyed by style name, with filename and
/// extension tables selecting a style per file.
#[derive(Debug, Default)]
pub struct FormatRegistry {
  styles: HashMap<String, Arc<CommentHeaderFormat>>,
  extensions: HashMap<String, String>,
  filenames: HashMap<String, String>,
}

impl FormatRegistry {
  /// Build the builtin registry.
  ///
  /// Covers the common languages; files that resolve to no style are
  /// skipped by the caller rather than guessed at.
  pub fn builtin() -> Result<Self, HeaderError> {
    let mut registry = Self::default();

    registry.register_style(CommentHeaderFormat::block("block", "/*", " * ", " */")?);
    registry.register_style(CommentHeaderFormat::block("javadoc", "/**", " * ", " */")?);
    registry.register_style(CommentHeaderFormat::line("slashes", "// ")?);
    registry.register_style(CommentHeaderFormat::line("hash", "# ")?.with_skip("^#!")?);
    registry.register_style(
      CommentHeaderFormat::block("xml", "<!--", " ", "-->")?.with_skip("^\\s*<\\?xml.*\\?>\\s*$")?,
    );
    registry.register_style(CommentHeaderFormat::line("semicolons", ";; ")?);
    registry.register_style(CommentHeaderFormat::line("percent", "% ")?);
    registry.register_style(CommentHeaderFormat::line("dashes", "-- ")?);
    registry.register_style(CommentHeaderFormat::line("batch", ":: ")?);
    registry.register_style(CommentHeaderFormat::block("jinja", "{#", "", "#}")?);
    registry.register_style(CommentHeaderFormat::block("caml", "(**", "   ", "*)")?);

    let table: &[(&str, &[&str])] = &[
      ("block", &["c", "h", "gv", "java", "scala", "kt", "kts"]),
      ("javadoc", &["js", "mjs", "cjs", "jsx", "tsx", "ts", "css", "scss", "sass"]),
      (
        "slashes",
        &[
          "cc", "cpp", "cs", "go", "hcl", "hh", "hpp", "m", "mm", "proto", "rs", "swift", "dart", "groovy", "v", "sv",
          "php",
        ],
      ),
      (
        "hash",
        &[
          "py", "sh", "yaml", "yml", "rb", "tcl", "tf", "bzl", "pl", "pp", "toml", "cmake", "dockerfile",
        ],
      ),
      ("semicolons", &["el", "lisp", "clj", "scm"]),
      ("percent", &["erl", "tex"]),
      ("dashes", &["hs", "sql", "sdl", "lua", "elm"]),
      ("batch", &["bat", "cmd"]),
      ("xml", &["html", "xml", "svg", "vue", "wxi", "wxl", "wxs"]),
      ("jinja", &["j2"]),
      ("caml", &["ml", "mli", "mll", "mly"]),
    ];
    for (style, exts) in table {
      for ext in *exts {
        registry.extensions.insert((*ext).to_string(), (*style).to_string());
      }
    }

    for name in ["cmakelists.txt", "dockerfile", "makefile"] {
      registry.filenames.insert(name.to_string(), "hash".to_string());
    }

    Ok(registry)
  }

  /// Register a style, replacing any existing style with the same name.
  pub fn register_style(&mut self, format: CommentHeaderFormat) {
    self.styles.insert(format.name().to_string(), Arc::new(format));
  }

  /// Map a file extension (lowercase) to a registered style.
  pub fn map_extension(&mut self, extension: &str, style: &str) -> Result<(), HeaderError> {
    if !self.styles.contains_key(style) {
      return Err(HeaderError::UnknownStyle {
        style: style.to_string(),
      });
    }
    self.extensions.insert(extension.to_lowercase(), style.to_string());
    Ok(())
  }

  /// Map an exact file name (lowercase) to a registered style.
  pub fn map_filename(&mut self, filename: &str, style: &str) -> Result<(), HeaderError> {
    if !self.styles.contains_key(style) {
      return Err(HeaderError::UnknownStyle {
        style: style.to_string(),
      });
    }
    self.filenames.insert(filename.to_lowercase(), style.to_string());
    Ok(())
  }

  /// Look up a style by name.
  pub fn get(&self, name: &str) -> Option<Arc<CommentHeaderFormat>> {
    self.styles.get(name).cloned()
  }

  /// Select the format for a file.
  ///
  /// Exact filename mappings win over extension mappings; both are matched
  /// case-insensitively. `None` means the file type is unsupported and the
  /// caller should skip the file.
  pub fn resolve(&self, path: &Path) -> Option<Arc<CommentHeaderFormat>> {
    let file_name = path
      .file_name()
      .and_then(|name| name.to_str())
      .unwrap_or("")
      .to_lowercase();

    if let Some(style) = self.filenames.get(&file_name) {
      return self.styles.get(style).cloned();
    }

    let extension = text::file_extension(&file_name)?;
    self.extensions.get(extension).and_then(|style| self.styles.get(style)).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_line_format_derives_start() {
    let format = CommentHeaderFormat::line("slashes", "// ").unwrap();
    assert!(format.matches_start("// Licensed"));
    assert!(format.matches_start("  // indented"));
    assert!(!format.matches_start("Licensed"));
    assert!(format.end().is_none());
  }

  #[test]
  fn test_line_format_rejects_blank_prefix() {
    let err = CommentHeaderFormat::line("bare", "   ").unwrap_err();
    assert!(matches!(err, HeaderError::InvalidStyle { .. }));
  }

  #[test]
  fn test_block_format_derives_both_patterns() {
    let format = CommentHeaderFormat::block("block", "/*", " * ", " */").unwrap();
    assert!(format.matches_start("/*"));
    assert!(format.matches_end(" */"));
    assert!(format.matches_end("*/"));
    assert!(!format.matches_end("* content"));
  }

  #[test]
  fn test_block_format_rejects_empty_markers() {
    let err = CommentHeaderFormat::block("broken", "", " * ", " */").unwrap_err();
    assert!(matches!(err, HeaderError::InvalidStyle { .. }));
  }

  #[test]
  fn test_matches_skip_without_pattern() {
    let format = CommentHeaderFormat::line("slashes", "// ").unwrap();
    assert!(!format.matches_skip("#!/bin/sh"));
  }

  #[test]
  fn test_matches_skip_shebang() {
    let format = CommentHeaderFormat::line("hash", "# ").unwrap().with_skip("^#!").unwrap();
    assert!(format.matches_skip("#!/usr/bin/env python3"));
    assert!(!format.matches_skip("# comment"));
  }

  #[test]
  fn test_matches_prefix_trims_trailing_space() {
    let format = CommentHeaderFormat::block("block", "/*", " * ", " */").unwrap();
    assert!(format.matches_prefix(" * content"));
    assert!(format.matches_prefix(" *"));
    assert!(!format.matches_prefix("content"));
  }

  #[test]
  fn test_matches_prefix_empty_accepts_everything() {
    let format = CommentHeaderFormat::block("jinja", "{#", "", "#}").unwrap();
    assert!(format.matches_prefix("anything at all"));
  }

  #[test]
  fn test_invalid_override_pattern() {
    let result = CommentHeaderFormat::line("slashes", "// ").unwrap().with_start("([unclosed");
    assert!(matches!(result, Err(HeaderError::InvalidPattern { .. })));
  }

  #[test]
  fn test_registry_resolves_by_extension() {
    let registry = FormatRegistry::builtin().unwrap();
    assert_eq!(registry.resolve(Path::new("src/main.rs")).unwrap().name(), "slashes");
    assert_eq!(registry.resolve(Path::new("script.py")).unwrap().name(), "hash");
    assert_eq!(registry.resolve(Path::new("Main.java")).unwrap().name(), "block");
    assert_eq!(registry.resolve(Path::new("app.ts")).unwrap().name(), "javadoc");
    assert_eq!(registry.resolve(Path::new("core.clj")).unwrap().name(), "semicolons");
  }

  #[test]
  fn test_registry_resolves_by_filename() {
    let registry = FormatRegistry::builtin().unwrap();
    assert_eq!(registry.resolve(Path::new("sub/Dockerfile")).unwrap().name(), "hash");
    assert_eq!(registry.resolve(Path::new("CMakeLists.txt")).unwrap().name(), "hash");
  }

  #[test]
  fn test_registry_extension_is_case_insensitive() {
    let registry = FormatRegistry::builtin().unwrap();
    assert_eq!(registry.resolve(Path::new("Window.JAVA")).unwrap().name(), "block");
  }

  #[test]
  fn test_registry_unknown_extension() {
    let registry = FormatRegistry::builtin().unwrap();
    assert!(registry.resolve(Path::new("image.png")).is_none());
    assert!(registry.resolve(Path::new("README")).is_none());
  }

  #[test]
  fn test_registry_rejects_mapping_to_unknown_style() {
    let mut registry = FormatRegistry::builtin().unwrap();
    let err = registry.map_extension("zig", "nope").unwrap_err();
    assert!(matches!(err, HeaderError::UnknownStyle { .. }));
  }

  #[test]
  fn test_registry_custom_style_mapping() {
    let mut registry = FormatRegistry::builtin().unwrap();
    registry.register_style(CommentHeaderFormat::line("exclamations", "!! ").unwrap());
    registry.map_extension("f90", "exclamations").unwrap();
    assert_eq!(registry.resolve(Path::new("solver.f90")).unwrap().name(), "exclamations");
  }
}

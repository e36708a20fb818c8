//! # Prepared Headers
//!
//! The header template compiler and the matching/update engine.
//!
//! A [`PreparedHeader`] is compiled once per (template, format) pair: the
//! exact rendered line sequence to write into conforming files, plus the
//! matchers used to recognize existing headers, with variable lines (those
//! carrying a `{{year}}` placeholder) matched by pattern instead of literal
//! equality. Compilation verifies that the rendered header would be
//! recognized by its own matchers, so a freshly written header always passes
//! a subsequent check.
//!
//! The engine itself is a single forward pass over the file's leading lines:
//! no backtracking, no cross-file state, and no mutation until the full
//! replacement content has been computed.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;

use crate::encoding::Charset;
use crate::header::format::{CommentHeaderFormat, HeaderError};
use crate::header::template::{self, HeaderTemplate, TemplateData};
use crate::header::text;

/// Outcome of a file-level update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
  /// The file was rewritten with a fresh header.
  Changed,
  /// The file already conformed; nothing was written.
  Unchanged,
}

/// Where a file's head stands relative to the expected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
  /// The expected header is present.
  Ok,
  /// No header-like block was found at the head of the file.
  Missing,
  /// A header-like block was found but does not satisfy the matchers.
  Stale,
}

/// How one header line is compared against a file line.
#[derive(Debug)]
enum LineMatcher {
  /// The file line must equal this text exactly.
  Literal(String),
  /// The file line must satisfy this anchored pattern (variable lines).
  Wildcard(Regex),
}

impl LineMatcher {
  fn matches(&self, line: &str) -> bool {
    match self {
      Self::Literal(text) => line == text,
      Self::Wildcard(pattern) => pattern.is_match(line),
    }
  }
}

/// Result of scanning a file's head for an existing header-like block.
#[derive(Debug)]
struct HeadScan {
  /// Indices of skip-matched preamble lines (shebang, XML declaration)
  /// found before the header position. Preserved verbatim on rewrite.
  preamble: Vec<usize>,
  /// Index of the first retained line; where the body starts when no
  /// header block was found.
  head_start: usize,
  /// Line range `[start, end)` of the detected header-like block.
  block: Option<(usize, usize)>,
  /// Whether the head satisfies the prepared header.
  matches: bool,
}

/// A compiled header: rendered lines plus matchers, bound to one comment
/// header format. Immutable and freely shared across worker threads.
#[derive(Debug)]
pub struct PreparedHeader {
  format: Arc<CommentHeaderFormat>,
  rendered_lines: Vec<String>,
  match_lines: Vec<LineMatcher>,
}

impl PreparedHeader {
  /// Compile a template under a comment header format.
  ///
  /// Renders every template line (substituting `{{year}}` from `data`),
  /// synthesizes the open/close wrapper lines for block styles, and builds
  /// one matcher per rendered line. Variable lines get an anchored wildcard
  /// accepting any year or year range in the placeholder position.
  ///
  /// # Errors
  ///
  /// Fails with a [`HeaderError`] when the template is empty, a pattern does
  /// not compile, or the rendered header would not be recognized when
  /// scanned back (start/end patterns not satisfied by the wrapper lines, a
  /// content line colliding with the end or skip pattern, or a year value
  /// the wildcard would reject). These are configuration errors: raised
  /// once, before any file is touched.
  pub fn compile(
    template: &HeaderTemplate,
    format: Arc<CommentHeaderFormat>,
    data: &TemplateData,
  ) -> Result<Self, HeaderError> {
    let content = template.lines();
    if content.iter().all(|line| text::is_blank(line)) {
      return Err(HeaderError::EmptyTemplate);
    }

    let mut rendered_lines = Vec::with_capacity(content.len() + 2);
    let mut match_lines = Vec::with_capacity(content.len() + 2);

    if let Some(open) = format.open() {
      rendered_lines.push(open.to_string());
      match_lines.push(LineMatcher::Literal(open.to_string()));
    }

    for raw in &content {
      let line = text::strip_trailing(raw);
      let rendered = decorate(format.prefix(), &template::substitute(line, data));

      let matcher = match template::variable_pattern(line) {
        Some(interior) => {
          let pattern = format!("^{}{}$", regex::escape(format.prefix()), interior);
          let wildcard = Regex::new(&pattern).map_err(|source| HeaderError::InvalidPattern {
            style: format.name().to_string(),
            source,
          })?;
          LineMatcher::Wildcard(wildcard)
        }
        None => LineMatcher::Literal(rendered.clone()),
      };

      rendered_lines.push(rendered);
      match_lines.push(matcher);
    }

    if let Some(close) = format.close() {
      rendered_lines.push(close.to_string());
      match_lines.push(LineMatcher::Literal(close.to_string()));
    }

    let prepared = Self {
      format,
      rendered_lines,
      match_lines,
    };
    prepared.verify_recognizable()?;
    Ok(prepared)
  }

  /// Compile-time guarantee that a written header passes a later check.
  fn verify_recognizable(&self) -> Result<(), HeaderError> {
    let format = self.format.as_ref();

    let first = &self.rendered_lines[0];
    if !format.matches_start(first) {
      return Err(HeaderError::InvalidStyle {
        style: format.name().to_string(),
        reason: format!("start pattern does not match the rendered opening line '{first}'"),
      });
    }

    if format.end().is_some() {
      // The terminator must sit on the last line and only there, or the
      // scan would cut the block short on its own output.
      let last_idx = self.rendered_lines.len() - 1;
      if !format.matches_end(&self.rendered_lines[last_idx]) {
        return Err(HeaderError::InvalidStyle {
          style: format.name().to_string(),
          reason: "end pattern does not match the rendered closing line".to_string(),
        });
      }
      for line in &self.rendered_lines[..last_idx] {
        if format.matches_end(line) {
          return Err(HeaderError::UnmatchableLine { line: line.clone() });
        }
      }
    }

    for (rendered, matcher) in self.rendered_lines.iter().zip(&self.match_lines) {
      if format.matches_skip(rendered) || !matcher.matches(rendered) {
        return Err(HeaderError::UnmatchableLine { line: rendered.clone() });
      }
    }

    Ok(())
  }

  /// The format this header was compiled against.
  pub fn format(&self) -> &CommentHeaderFormat {
    &self.format
  }

  /// The exact lines written into a conforming file.
  pub fn rendered_lines(&self) -> &[String] {
    &self.rendered_lines
  }

  /// Does the content's head conform to this header?
  ///
  /// Single forward pass: leading blank lines and skip-matched lines are
  /// transparent, the first retained line must satisfy the start pattern,
  /// then file and template lines are walked in lockstep. With an end
  /// pattern configured the scan keeps going until the terminator even
  /// after a content mismatch; the terminator search is never cut short.
  pub fn check_content(&self, content: &str) -> bool {
    let lines = text::split_lines(content);
    self.scan(&lines).matches
  }

  /// Classify the content's head: conforming, missing, or stale.
  ///
  /// A head whose first retained line does not satisfy the start pattern has
  /// no header at all; one that opens a block which then fails the matchers
  /// is stale. Same scan as [`check_content`](Self::check_content).
  pub fn inspect_content(&self, content: &str) -> HeaderStatus {
    let lines = text::split_lines(content);
    let scan = self.scan(&lines);
    if scan.matches {
      HeaderStatus::Ok
    } else if scan.block.is_some() {
      HeaderStatus::Stale
    } else {
      HeaderStatus::Missing
    }
  }

  /// Compute the replacement content for a non-conforming file.
  ///
  /// Returns `None` when the head already satisfies the matchers (the
  /// wildcard-equal policy: a header differing only in its variable lines
  /// is left untouched). Otherwise the detected header-like block is
  /// removed, the rendered header is prepended with exactly one blank
  /// separator line before the remaining content, and skip-matched preamble
  /// lines stay above the new header. The body is preserved byte-for-byte;
  /// the inserted block uses the file's own line terminator.
  pub fn rewrite(&self, content: &str) -> Option<String> {
    let lines = text::split_lines(content);
    let scan = self.scan(&lines);
    if scan.matches {
      return None;
    }

    let eol = text::detect_eol(content);
    let rendered_len: usize = self.rendered_lines.iter().map(|line| line.len() + eol.len()).sum();
    let mut out = String::with_capacity(rendered_len + content.len() + 2 * eol.len());

    for &idx in &scan.preamble {
      out.push_str(lines[idx].text);
      out.push_str(eol);
    }
    if !scan.preamble.is_empty() {
      out.push_str(eol);
    }

    for line in &self.rendered_lines {
      out.push_str(line);
      out.push_str(eol);
    }

    let body_start = match scan.block {
      // A single blank after the removed block is folded into the
      // separator we add; anything beyond it belongs to the body.
      Some((_, end)) if end < lines.len() && text::is_blank(lines[end].text) => end + 1,
      Some((_, end)) => end,
      None => scan.head_start,
    };

    if body_start < lines.len() {
      out.push_str(eol);
      out.push_str(&content[lines[body_start].start..]);
    }

    Some(out)
  }

  /// Check a file on disk under the given charset.
  ///
  /// Never mutates the file. Read or decode failures carry the file path in
  /// their context.
  pub fn check(&self, path: &Path, charset: &Charset) -> Result<bool> {
    let document = charset.read(path)?;
    Ok(self.check_content(document.text()))
  }

  /// Update a file on disk under the given charset.
  ///
  /// Writes only when the content changes, and then atomically: the full
  /// replacement is computed first and written through a temporary file in
  /// the same directory. A file reported [`UpdateOutcome::Unchanged`] is
  /// bit-identical to its pre-call state.
  pub fn update(&self, path: &Path, charset: &Charset) -> Result<UpdateOutcome> {
    let document = charset.read(path)?;
    match self.rewrite(document.text()) {
      Some(replacement) => {
        charset.write(path, &replacement, document.has_bom())?;
        Ok(UpdateOutcome::Changed)
      }
      None => Ok(UpdateOutcome::Unchanged),
    }
  }

  /// Scan the file head once, classifying preamble, header block, and the
  /// match verdict. Shared by check and update; linear in the scanned
  /// prefix, no backtracking.
  fn scan(&self, lines: &[text::Line<'_>]) -> HeadScan {
    let format = self.format.as_ref();

    let mut preamble = Vec::new();
    let mut idx = 0;
    loop {
      idx = text::skip_blank_lines(lines, idx);
      if idx < lines.len() && format.matches_skip(lines[idx].text) {
        preamble.push(idx);
        idx += 1;
        continue;
      }
      break;
    }

    if idx >= lines.len() || !format.matches_start(lines[idx].text) {
      return HeadScan {
        preamble,
        head_start: idx,
        block: None,
        matches: false,
      };
    }

    let block_start = idx;
    let mut template_idx = 0;
    let mut lines_match = true;
    let mut end_found = false;

    if format.end().is_some() {
      // Block style: consume prefix-continued lines until the terminator,
      // accumulating mismatches instead of failing fast.
      while idx < lines.len() {
        let line = lines[idx].text;
        if idx > block_start {
          if format.matches_skip(line) {
            idx += 1;
            continue;
          }
          if !format.matches_prefix(line) && !format.matches_end(line) {
            // The block is broken; the body starts here.
            break;
          }
        }
        if template_idx < self.match_lines.len() {
          if !self.match_lines[template_idx].matches(line) {
            lines_match = false;
          }
          template_idx += 1;
        }
        idx += 1;
        if format.matches_end(line) {
          end_found = true;
          break;
        }
      }

      let matches = lines_match && end_found && template_idx == self.match_lines.len();
      HeadScan {
        preamble,
        head_start: block_start,
        block: Some((block_start, idx)),
        matches,
      }
    } else {
      // Line style: the block spans at most the template length.
      while idx < lines.len() && template_idx < self.match_lines.len() {
        let line = lines[idx].text;
        if idx > block_start {
          if format.matches_skip(line) {
            idx += 1;
            continue;
          }
          if !format.matches_prefix(line) {
            break;
          }
        }
        if !self.match_lines[template_idx].matches(line) {
          lines_match = false;
        }
        template_idx += 1;
        idx += 1;
      }

      let matches = lines_match && template_idx == self.match_lines.len();
      HeadScan {
        preamble,
        head_start: block_start,
        block: Some((block_start, idx)),
        matches,
      }
    }
  }
}

/// Decorate one template content line with the format's prefix. Empty lines
/// render as the bare prefix with trailing whitespace trimmed.
fn decorate(prefix: &str, content: &str) -> String {
  if content.is_empty() {
    prefix.trim_end().to_string()
  } else {
    let mut line = String::with_capacity(prefix.len() + content.len());
    line.push_str(prefix);
    line.push_str(content);
    line
  }
}

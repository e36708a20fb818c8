//! # Text Utilities
//!
//! Small pure helpers for line classification and file-name handling used by
//! the header matching engine. All functions borrow their input; nothing here
//! allocates unless the caller asks for owned data.

/// Extract the extension from a file name.
///
/// Returns the substring after the last `.`, or `None` when the name contains
/// no dot. The match is taken from the right, so `archive.tar.gz` yields
/// `gz` and `.gitignore` yields `gitignore`.
pub fn file_extension(name: &str) -> Option<&str> {
  name.rfind('.').map(|idx| &name[idx + 1..])
}

/// Strip leading whitespace from a line.
///
/// Returns the empty string when the line is entirely whitespace. The result
/// borrows from the input, so no allocation occurs.
pub fn strip_leading(line: &str) -> &str {
  line.trim_start()
}

/// Strip trailing whitespace from a line.
///
/// Returns the empty string when the line is entirely whitespace.
pub fn strip_trailing(line: &str) -> &str {
  line.trim_end()
}

/// A line is blank when stripping leading whitespace leaves nothing.
pub fn is_blank(line: &str) -> bool {
  strip_leading(line).is_empty()
}

/// A physical line inside a larger buffer.
///
/// `text` is the logical content without its terminator (`\n` or `\r\n`);
/// `start` is the byte offset of the line within the buffer and `next` the
/// offset where the following line begins. Slicing the original buffer at
/// `start..` reproduces the rest of the file byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
  pub text: &'a str,
  pub start: usize,
  pub next: usize,
}

/// Split a buffer into physical lines, tracking byte offsets.
///
/// Terminators are `\n` and `\r\n`; a final line without a terminator is
/// still produced. The empty buffer yields no lines.
pub fn split_lines(content: &str) -> Vec<Line<'_>> {
  let mut lines = Vec::new();
  let mut start = 0;

  for raw in content.split_inclusive('\n') {
    let next = start + raw.len();
    let text = match raw.strip_suffix('\n') {
      Some(stripped) => stripped.strip_suffix('\r').unwrap_or(stripped),
      None => raw,
    };
    lines.push(Line { text, start, next });
    start = next;
  }

  lines
}

/// Advance past blank lines starting at `from`.
///
/// Returns the index of the first non-blank line at or after `from`, or
/// `lines.len()` when only blank lines remain.
pub fn skip_blank_lines(lines: &[Line<'_>], from: usize) -> usize {
  let mut idx = from;
  while idx < lines.len() && is_blank(lines[idx].text) {
    idx += 1;
  }
  idx
}

/// Detect the dominant line terminator of a buffer.
///
/// Returns `"\r\n"` when the first terminator in the buffer is a CRLF pair,
/// otherwise `"\n"` (including for buffers with no terminator at all).
pub fn detect_eol(content: &str) -> &'static str {
  match content.find('\n') {
    Some(idx) if idx > 0 && content.as_bytes()[idx - 1] == b'\r' => "\r\n",
    _ => "\n",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_file_extension_simple() {
    assert_eq!(file_extension("main.rs"), Some("rs"));
    assert_eq!(file_extension("lib.tar.gz"), Some("gz"));
  }

  #[test]
  fn test_file_extension_none() {
    assert_eq!(file_extension("Makefile"), None);
    assert_eq!(file_extension(""), None);
  }

  #[test]
  fn test_file_extension_leading_dot() {
    assert_eq!(file_extension(".gitignore"), Some("gitignore"));
  }

  #[test]
  fn test_file_extension_trailing_dot() {
    assert_eq!(file_extension("weird."), Some(""));
  }

  #[test]
  fn test_strip_leading() {
    assert_eq!(strip_leading("  text"), "text");
    assert_eq!(strip_leading("text  "), "text  ");
    assert_eq!(strip_leading("   "), "");
    assert_eq!(strip_leading(""), "");
  }

  #[test]
  fn test_strip_trailing() {
    assert_eq!(strip_trailing("text  "), "text");
    assert_eq!(strip_trailing("  text"), "  text");
    assert_eq!(strip_trailing("\t \t"), "");
  }

  #[test]
  fn test_is_blank() {
    assert!(is_blank(""));
    assert!(is_blank("   \t"));
    assert!(!is_blank(" x "));
  }

  #[test]
  fn test_split_lines_tracks_offsets() {
    let lines = split_lines("ab\ncd\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], Line { text: "ab", start: 0, next: 3 });
    assert_eq!(lines[1], Line { text: "cd", start: 3, next: 6 });
  }

  #[test]
  fn test_split_lines_no_trailing_newline() {
    let lines = split_lines("ab\ncd");
    assert_eq!(lines[1], Line { text: "cd", start: 3, next: 5 });
  }

  #[test]
  fn test_split_lines_crlf() {
    let lines = split_lines("ab\r\ncd\r\n");
    assert_eq!(lines[0].text, "ab");
    assert_eq!(lines[0].next, 4);
    assert_eq!(lines[1].text, "cd");
  }

  #[test]
  fn test_split_lines_empty() {
    assert!(split_lines("").is_empty());
  }

  #[test]
  fn test_skip_blank_lines() {
    let lines = split_lines("\n  \ncode\n");
    assert_eq!(skip_blank_lines(&lines, 0), 2);
    assert_eq!(skip_blank_lines(&lines, 2), 2);
  }

  #[test]
  fn test_skip_blank_lines_exhausted() {
    let lines = split_lines("\n\n");
    assert_eq!(skip_blank_lines(&lines, 0), 2);
  }

  #[test]
  fn test_detect_eol() {
    assert_eq!(detect_eol("a\nb\n"), "\n");
    assert_eq!(detect_eol("a\r\nb\r\n"), "\r\n");
    assert_eq!(detect_eol("no newline"), "\n");
    assert_eq!(detect_eol(""), "\n");
  }
}

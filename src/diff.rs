//! # Diff Module
//!
//! Renders line diffs between a file's original content and the content a
//! header update would produce, for preview output and consolidated diff
//! files.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use similar::{ChangeTag, TextDiff};

/// Render a sign-prefixed line diff between two contents.
///
/// Each line is prefixed with `-`, `+` or a space, in the style of a unified
/// diff body without hunk headers.
pub fn render_diff(original: &str, updated: &str) -> String {
  let diff = TextDiff::from_lines(original, updated);
  let mut rendered = String::new();

  for change in diff.iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    rendered.push_str(sign);
    rendered.push_str(change.as_str().unwrap_or(""));
  }

  rendered
}

/// Where header change diffs go.
///
/// Diffs can be shown on stderr, appended to a consolidated diff file, or
/// both. With neither destination set the processor skips diff rendering
/// entirely.
pub struct DiffOptions {
  /// Whether to show diffs on stderr
  pub show: bool,

  /// Path of a file collecting the diffs of all changed files
  pub save_path: Option<PathBuf>,
}

impl DiffOptions {
  pub fn new(show: bool, save_path: Option<PathBuf>) -> Self {
    Self { show, save_path }
  }

  /// True when at least one destination is configured.
  pub const fn enabled(&self) -> bool {
    self.show || self.save_path.is_some()
  }

  /// Render and deliver the diff for one file.
  ///
  /// Multiple diffs appended to the same save file form a single
  /// consolidated diff. A failure to write the save file is reported on
  /// stderr without failing the file's processing.
  pub fn emit(&self, path: &Path, original: &str, updated: &str) -> Result<()> {
    if !self.enabled() {
      return Ok(());
    }

    let mut rendered = format!("Diff for {}:\n", path.display());
    rendered.push_str(&render_diff(original, updated));
    rendered.push('\n');

    if self.show {
      eprint!("{}", rendered);
    }

    if let Some(ref save_path) = self.save_path {
      let file_result = OpenOptions::new().create(true).append(true).open(save_path);

      match file_result {
        Ok(mut file) => {
          if let Err(e) = file.write_all(rendered.as_bytes()) {
            eprintln!("Error writing to diff file: {}", e);
          }
        }
        Err(e) => {
          eprintln!("Error opening diff file: {}", e);
        }
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_diff_header_insertion() {
    let original = "fn main() {}\n";
    let updated = "// Licensed under MIT\n\nfn main() {}\n";

    let rendered = render_diff(original, updated);

    assert!(rendered.contains("+// Licensed under MIT\n"));
    assert!(rendered.contains(" fn main() {}\n"));
    assert!(!rendered.contains("-fn main() {}\n"));
  }

  #[test]
  fn test_render_diff_header_replacement() {
    let original = "// Licensed under GPL\n\nfn main() {}\n";
    let updated = "// Licensed under MIT\n\nfn main() {}\n";

    let rendered = render_diff(original, updated);

    assert!(rendered.contains("-// Licensed under GPL\n"));
    assert!(rendered.contains("+// Licensed under MIT\n"));
  }

  #[test]
  fn test_render_diff_equal_content() {
    let content = "fn main() {}\n";
    let rendered = render_diff(content, content);

    assert_eq!(rendered, " fn main() {}\n");
  }
}

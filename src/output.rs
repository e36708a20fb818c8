//! # Output Module
//!
//! This module centralizes all user-facing output for the licenser tool.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileAction, FileReport, RunSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/has header
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing header/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Ignored/skipped
  pub const IGNORED: &str = "-";
  /// Header replaced
  pub const REPLACED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Checking N files..." or "Processing N files..." message.
///
/// - In modify mode: "Processing N files..."
/// - In check mode: "Checking N files..."
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  let files_word = if file_count == 1 { "file" } else { "files" };

  println!("{} {} {}...", verb, file_count, files_word);
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the list of files missing license headers.
///
/// Shows up to `limit` files (or `DEFAULT_FILE_LIST_LIMIT` if None).
/// In verbose mode, shows all files.
/// Files are sorted alphabetically by path.
pub fn print_missing_files(files: &[&FileReport], workspace_root: Option<&Path>, limit: Option<usize>) {
  if files.is_empty() {
    return;
  }

  // Sort files alphabetically by path
  let mut sorted_files: Vec<_> = files.to_vec();
  sorted_files.sort_by(|a, b| a.path.cmp(&b.path));

  if is_quiet() {
    // In quiet mode, just print the file paths (for scripting)
    for file in &sorted_files {
      let display_path = make_relative_path(&file.path, workspace_root);
      println!("{}", display_path);
    }
    return;
  }

  let count = sorted_files.len();
  let header = format!(
    "{} {} {} missing license headers:",
    symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
    count,
    if count == 1 { "file" } else { "files" }
  );
  println!("{}", header);

  let show_all = is_verbose();
  let effective_limit = if show_all {
    count
  } else {
    limit.unwrap_or(DEFAULT_FILE_LIST_LIMIT)
  };

  for file in sorted_files.iter().take(effective_limit) {
    let display_path = make_relative_path(&file.path, workspace_root);
    println!("  {}", display_path);
  }

  if !show_all && count > effective_limit {
    let remaining = count - effective_limit;
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      remaining
    );
  }
}

/// Print the list of files whose headers are stale.
///
/// Shows up to `limit` files (or `DEFAULT_FILE_LIST_LIMIT` if None).
/// In verbose mode, shows all files.
/// Files are sorted alphabetically by path.
pub fn print_stale_files(files: &[&FileReport], workspace_root: Option<&Path>, limit: Option<usize>) {
  if files.is_empty() {
    return;
  }

  // Sort files alphabetically by path
  let mut sorted_files: Vec<_> = files.to_vec();
  sorted_files.sort_by(|a, b| a.path.cmp(&b.path));

  if is_quiet() {
    // In quiet mode, just print the file paths (for scripting)
    for file in &sorted_files {
      let display_path = make_relative_path(&file.path, workspace_root);
      println!("{}", display_path);
    }
    return;
  }

  let count = sorted_files.len();
  let header = format!(
    "{} {} {} with stale headers:",
    symbols::REPLACED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    count,
    if count == 1 { "file" } else { "files" }
  );
  println!("{}", header);

  let show_all = is_verbose();
  let effective_limit = if show_all {
    count
  } else {
    limit.unwrap_or(DEFAULT_FILE_LIST_LIMIT)
  };

  for file in sorted_files.iter().take(effective_limit) {
    let display_path = make_relative_path(&file.path, workspace_root);
    println!("  {}", display_path);
  }

  if !show_all && count > effective_limit {
    let remaining = count - effective_limit;
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      remaining
    );
  }
}

/// Print the list of files that had headers added.
pub fn print_added_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() || files.is_empty() {
    return;
  }

  let count = files.len();
  let header = format!(
    "{} Added header to {} {}:",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    count,
    if count == 1 { "file" } else { "files" }
  );
  println!("{}", header);

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    let display_path = make_relative_path(&file.path, workspace_root);
    println!("  {}", display_path);
  }

  if !show_all && count > limit {
    let remaining = count - limit;
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      remaining
    );
  }
}

/// Print the list of files that had headers replaced.
pub fn print_replaced_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() || files.is_empty() {
    return;
  }

  let count = files.len();
  let header = format!(
    "{} Replaced header in {} {}:",
    symbols::REPLACED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    count,
    if count == 1 { "file" } else { "files" }
  );
  println!("{}", header);

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in files.iter().take(limit) {
    let display_path = make_relative_path(&file.path, workspace_root);
    println!("  {}", display_path);
  }

  if !show_all && count > limit {
    let remaining = count - limit;
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      remaining
    );
  }
}

/// Print the success message when all files have the expected header.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have license headers.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print the processing summary.
///
/// Format: "Summary: X OK, Y missing, Z ignored"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &RunSummary) {
  if is_quiet() {
    return;
  }

  let ok_count = summary.files_ok;
  let missing_count = summary.files_missing;
  let ignored_count = summary.files_ignored;

  let ok_str = ok_count.if_supports_color(Stream::Stdout, |s| s.cyan());
  let missing_str = if missing_count > 0 {
    missing_count.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    missing_count
      .if_supports_color(Stream::Stdout, |s| s.cyan())
      .to_string()
  };
  let ignored_str = ignored_count.if_supports_color(Stream::Stdout, |s| s.dimmed());

  let mut summary_line = format!(
    "Summary: {} OK, {} missing, {} ignored",
    ok_str, missing_str, ignored_str
  );

  if summary.files_errored > 0 {
    let errored_str = summary.files_errored.if_supports_color(Stream::Stdout, |s| s.red());
    summary_line.push_str(&format!(
      ", {} {}",
      errored_str,
      if summary.files_errored == 1 { "error" } else { "errors" }
    ));
  }

  // Show timing in verbose mode
  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{}", summary_line);
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Print verbose per-file status during processing.
/// Only shown in verbose mode.
pub fn print_file_status_verbose(path: &Path, status: FileStatus, workspace_root: Option<&Path>) {
  if !is_verbose() {
    return;
  }

  let display_path = make_relative_path(path, workspace_root);
  let (symbol, message) = match status {
    FileStatus::HasHeader => (
      symbols::SUCCESS
        .if_supports_color(Stream::Stdout, |s| s.green())
        .to_string(),
      display_path,
    ),
    FileStatus::MissingHeader => (
      symbols::FAILURE
        .if_supports_color(Stream::Stdout, |s| s.red())
        .to_string(),
      format!("{} (missing header)", display_path),
    ),
    FileStatus::StaleHeader => (
      symbols::REPLACED
        .if_supports_color(Stream::Stdout, |s| s.yellow())
        .to_string(),
      format!("{} (stale header)", display_path),
    ),
    FileStatus::HeaderAdded => (
      symbols::SUCCESS
        .if_supports_color(Stream::Stdout, |s| s.green())
        .to_string(),
      format!("{} (added)", display_path),
    ),
    FileStatus::HeaderReplaced => (
      symbols::REPLACED
        .if_supports_color(Stream::Stdout, |s| s.yellow())
        .to_string(),
      format!("{} (replaced)", display_path),
    ),
    FileStatus::Ignored(reason) => (
      symbols::IGNORED
        .if_supports_color(Stream::Stdout, |s| s.dimmed())
        .to_string(),
      format!(
        "{} (ignored: {})",
        display_path.if_supports_color(Stream::Stdout, |s| s.dimmed()),
        reason
      ),
    ),
  };

  println!("  {} {}", symbol, message);
}

/// Status of a file for verbose output.
pub enum FileStatus<'a> {
  /// File already has the expected header
  HasHeader,
  /// File is missing a header
  MissingHeader,
  /// File carries a header that does not match the expected one
  StaleHeader,
  /// A header was added to the file
  HeaderAdded,
  /// The file's header was replaced
  HeaderReplaced,
  /// File was ignored with a reason
  Ignored(&'a str),
}

/// Categorize file reports into different groups for output.
pub struct CategorizedReports<'a> {
  /// Files missing headers (not ignored, no header)
  pub missing: Vec<&'a FileReport>,
  /// Files that had headers added
  pub added: Vec<&'a FileReport>,
  /// Files that had headers replaced (or need replacing in check mode)
  pub replaced: Vec<&'a FileReport>,
  /// Files that already had the expected header
  pub ok: Vec<&'a FileReport>,
  /// Files that were ignored
  pub ignored: Vec<&'a FileReport>,
  /// Files that could not be processed
  pub errored: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut missing = Vec::new();
    let mut added = Vec::new();
    let mut replaced = Vec::new();
    let mut ok = Vec::new();
    let mut ignored = Vec::new();
    let mut errored = Vec::new();

    for report in reports {
      if report.ignored {
        ignored.push(report);
        continue;
      }

      if report.error.is_some() {
        errored.push(report);
        continue;
      }

      match &report.action_taken {
        Some(FileAction::Added) => added.push(report),
        Some(FileAction::Replaced) => replaced.push(report),
        Some(FileAction::NoChange) => ok.push(report),
        Some(FileAction::Skipped) => ignored.push(report),
        None => {
          if report.has_header {
            ok.push(report);
          } else {
            missing.push(report);
          }
        }
      }
    }

    Self {
      missing,
      added,
      replaced,
      ok,
      ignored,
      errored,
    }
  }
}

/// Make a path relative to the workspace root for display.
///
/// Paths outside the root come out in `../` form rather than absolute.
fn make_relative_path(path: &Path, workspace_root: Option<&Path>) -> String {
  if let Some(root) = workspace_root {
    pathdiff::diff_paths(path, root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|| path.to_string_lossy().to_string())
  } else {
    path.to_string_lossy().to_string()
  }
}

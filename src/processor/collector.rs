//! # Candidate Collection
//!
//! Expands the patterns given on the command line into the list of files a
//! run will consider. Files are taken as-is, directories are walked
//! recursively, and anything else is treated as a glob pattern.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use crate::ignore::DEFAULT_IGNORED_DIRS;

/// Expand patterns into a deduplicated, sorted list of candidate files.
///
/// Overlapping patterns (e.g. `src` and `src/main.rs` both given) yield each
/// file once. The result is sorted so reports come out in a stable order.
///
/// # Errors
///
/// Returns an error when a pattern is neither an existing path nor a valid
/// glob.
pub fn collect_candidates(patterns: &[String]) -> Result<Vec<PathBuf>> {
  let mut all_files = Vec::new();

  for pattern in patterns {
    let maybe_path = PathBuf::from(pattern);
    if maybe_path.is_file() {
      all_files.push(maybe_path);
    } else if maybe_path.is_dir() {
      all_files.extend(walk_directory(&maybe_path));
    } else {
      let entries = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

      for entry in entries {
        match entry {
          Ok(path) => {
            if path.is_file() {
              all_files.push(path);
            } else if path.is_dir() {
              all_files.extend(walk_directory(&path));
            }
          }
          Err(e) => {
            eprintln!("Error with glob pattern: {}", e);
          }
        }
      }
    }
  }

  let mut files: Vec<PathBuf> = all_files.into_iter().collect::<HashSet<_>>().into_iter().collect();
  files.sort();
  Ok(files)
}

/// Walk a directory recursively and collect all regular files.
///
/// Subdirectories on the built-in skip list are pruned without descending.
/// The walk root itself is exempt so an explicitly named directory is always
/// honored. Symlinks are not followed.
pub fn walk_directory(dir: &Path) -> Vec<PathBuf> {
  debug!("Scanning directory: {}", dir.display());
  let start_time = std::time::Instant::now();

  let mut files = Vec::new();
  let walker = WalkDir::new(dir).follow_links(false).into_iter();
  for entry in walker.filter_entry(|entry| entry.depth() == 0 || !is_pruned_dir(entry)) {
    match entry {
      Ok(entry) => {
        if entry.file_type().is_file() {
          files.push(entry.into_path());
        }
      }
      Err(e) => {
        eprintln!("Error reading directory entry: {}", e);
      }
    }
  }

  debug!(
    "Found {} files in {}ms",
    files.len(),
    start_time.elapsed().as_millis()
  );

  files
}

fn is_pruned_dir(entry: &walkdir::DirEntry) -> bool {
  entry.file_type().is_dir()
    && entry
      .file_name()
      .to_str()
      .is_some_and(|name| DEFAULT_IGNORED_DIRS.contains(&name))
}

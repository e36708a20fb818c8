#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// The header template used by most end-to-end tests.
pub const TEMPLATE: &str = "Licensed under MIT\n";

/// Writes a file under `root`, creating parent directories as needed, and
/// returns its full path.
pub fn write_file(root: &Path, rel: &str, content: &str) -> Result<PathBuf> {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Reads a file to a string with path context on failure.
pub fn read_file(path: &Path) -> Result<String> {
  fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Creates a workspace directory holding a `HEADER.txt` template and returns
/// (workspace, template path).
pub fn setup_workspace(template: &str) -> Result<(tempfile::TempDir, PathBuf)> {
  let dir = tempfile::tempdir()?;
  let template_path = write_file(dir.path(), "HEADER.txt", template)?;
  Ok((dir, template_path))
}

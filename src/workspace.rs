//! # Workspace Module
//!
//! This module defines the workspace root that licenser operates on. The root
//! anchors config discovery and the paths shown in reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::DEFAULT_CONFIG_FILENAME;

/// Workspace root selection.
pub enum Workspace {
  /// Workspace rooted at a directory carrying a project marker.
  Project { root: PathBuf },
  /// Workspace rooted at a plain directory.
  Directory { root: PathBuf },
}

impl Workspace {
  pub fn root(&self) -> &Path {
    match self {
      Self::Project { root } | Self::Directory { root } => root.as_path(),
    }
  }

  pub const fn is_project(&self) -> bool {
    matches!(self, Self::Project { .. })
  }
}

/// Resolve the current workspace based on the current directory and patterns.
///
/// Marker discovery wins; otherwise the first existing pattern picks the
/// root, and the current directory is the fallback.
pub fn resolve_workspace(patterns: &[String]) -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;

  if let Some(root) = discover_project_root(&current_dir) {
    return Ok(Workspace::Project { root });
  }

  if let Some(root) = resolve_workspace_from_patterns(patterns, &current_dir) {
    return Ok(Workspace::Directory { root });
  }

  Ok(Workspace::Directory { root: current_dir })
}

/// Walk up from `start` looking for a project marker.
///
/// A directory containing a `.licenser.toml` file or a `.git` entry is taken
/// as the project root. `.git` may be a directory or, for worktrees, a file.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
  let mut dir = Some(start);
  while let Some(current) = dir {
    if current.join(DEFAULT_CONFIG_FILENAME).is_file() || current.join(".git").exists() {
      return Some(current.to_path_buf());
    }
    dir = current.parent();
  }
  None
}

fn resolve_workspace_from_patterns(patterns: &[String], current_dir: &Path) -> Option<PathBuf> {
  for pattern in patterns {
    let candidate = PathBuf::from(pattern);
    if candidate.exists() {
      if candidate.is_dir() {
        return Some(abs_path_or_current(&candidate, current_dir));
      }

      if candidate.is_file()
        && let Some(parent) = candidate.parent()
      {
        return Some(abs_path_or_current(parent, current_dir));
      }
    }
  }

  None
}

fn abs_path_or_current(path: &Path, current_dir: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    current_dir.join(path)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_discover_project_root_config_marker() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILENAME), "").expect("write marker");
    let nested = temp_dir.path().join("a/b");
    std::fs::create_dir_all(&nested).expect("create nested dirs");

    let root = discover_project_root(&nested).expect("marker should be found");
    assert_eq!(root, temp_dir.path());
  }

  #[test]
  fn test_discover_project_root_git_marker() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp_dir.path().join(".git")).expect("create .git");
    let nested = temp_dir.path().join("src");
    std::fs::create_dir_all(&nested).expect("create nested dir");

    let root = discover_project_root(&nested).expect("marker should be found");
    assert_eq!(root, temp_dir.path());
  }

  #[test]
  fn test_discover_project_root_nearest_marker_wins() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp_dir.path().join(".git")).expect("create .git");
    let inner = temp_dir.path().join("vendored");
    std::fs::create_dir_all(&inner).expect("create inner dir");
    std::fs::write(inner.join(DEFAULT_CONFIG_FILENAME), "").expect("write marker");

    let root = discover_project_root(&inner).expect("marker should be found");
    assert_eq!(root, inner);
  }

  #[test]
  fn test_patterns_pick_directory_root() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let dir = temp_dir.path().join("project");
    std::fs::create_dir(&dir).expect("create dir");

    let patterns = vec![dir.to_string_lossy().to_string()];
    let root = resolve_workspace_from_patterns(&patterns, temp_dir.path()).expect("pattern should resolve");
    assert_eq!(root, dir);
  }

  #[test]
  fn test_patterns_pick_file_parent() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let file = temp_dir.path().join("main.rs");
    std::fs::write(&file, "fn main() {}\n").expect("write file");

    let patterns = vec![file.to_string_lossy().to_string()];
    let root = resolve_workspace_from_patterns(&patterns, temp_dir.path()).expect("pattern should resolve");
    assert_eq!(root, temp_dir.path());
  }
}

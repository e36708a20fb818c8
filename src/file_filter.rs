//! # File Filter Module
//!
//! This module contains components for filtering files based on various
//! criteria such as ignore patterns and extension allow/deny lists.

use std::path::Path;

use anyhow::Result;

use crate::config::ExtensionConfig;
use crate::ignore::IgnoreManager;
use crate::verbose_log;

/// Result of a file filtering operation.
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
pub trait FileFilter: Send + Sync {
  /// Determines whether a file should be processed.
  ///
  /// # Parameters
  ///
  /// * `path` - The path to the file to check
  ///
  /// # Returns
  ///
  /// A `FilterResult` indicating whether the file should be processed and why
  /// not if applicable.
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

/// Filter that excludes files matching ignore patterns.
pub struct IgnoreFilter {
  ignore_manager: IgnoreManager,
}

impl IgnoreFilter {
  /// Creates a new IgnoreFilter with the given IgnoreManager.
  pub const fn new(ignore_manager: IgnoreManager) -> Self {
    Self { ignore_manager }
  }

  /// Creates a new IgnoreFilter from a list of ignore patterns.
  pub fn from_patterns(patterns: Vec<String>) -> Result<Self> {
    let ignore_manager = IgnoreManager::new(patterns)?;
    Ok(Self { ignore_manager })
  }
}

impl FileFilter for IgnoreFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.ignore_manager.is_ignored(path) {
      verbose_log!("Skipping: {} (matches ignore pattern)", path.display());
      Ok(FilterResult::skip("Matches ignore pattern"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Filter that includes or excludes files by extension.
///
/// Extension entries match as filename suffixes, so compound entries like
/// "min.js" or "pb.go" work alongside plain ones like "rs".
pub struct ExtensionFilter {
  include: Option<Vec<String>>,
  exclude: Vec<String>,
}

impl ExtensionFilter {
  /// Creates a new ExtensionFilter from the configuration section.
  pub fn new(config: &ExtensionConfig) -> Self {
    Self {
      include: config.include.clone().map(normalize_extensions),
      exclude: normalize_extensions(config.exclude.clone()),
    }
  }

  /// Creates a new ExtensionFilter from explicit lists. Empty lists produce
  /// a filter that lets everything through.
  pub fn from_cli(include: Vec<String>, exclude: Vec<String>) -> Self {
    Self {
      include: if include.is_empty() {
        None
      } else {
        Some(normalize_extensions(include))
      },
      exclude: normalize_extensions(exclude),
    }
  }

  fn matches(extensions: &[String], file_name: &str) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(&format!(".{}", ext)))
  }
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
  extensions.into_iter().map(|ext| ext.to_lowercase()).collect()
}

impl FileFilter for ExtensionFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
      return Ok(FilterResult::process());
    };
    let file_name = file_name.to_lowercase();

    if let Some(include) = &self.include {
      if Self::matches(include, &file_name) {
        return Ok(FilterResult::process());
      }
      return Ok(FilterResult::skip("Extension not in include list"));
    }

    if Self::matches(&self.exclude, &file_name) {
      return Ok(FilterResult::skip("Extension in exclude list"));
    }

    Ok(FilterResult::process())
  }
}

/// Filter that combines multiple filters.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Creates a new CompositeFilter with the given filters.
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }

  /// Adds a filter to this CompositeFilter.
  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Constructs a CompositeFilter covering the common ignore sources.
///
/// The ignore manager is seeded with CLI patterns and then loads
/// .licenserignore files from `dir` up to `workspace_root`.
///
/// # Parameters
///
/// * `ignore_patterns` - Glob patterns for files to ignore
/// * `dir` - Directory being processed
/// * `workspace_root` - Root of the workspace for ignore traversal
pub fn create_default_filter(
  ignore_patterns: Vec<String>,
  dir: &Path,
  workspace_root: &Path,
) -> Result<CompositeFilter> {
  let mut ignore_manager = IgnoreManager::new(ignore_patterns)?;
  ignore_manager.load_ignore_files(dir, workspace_root)?;

  let filters: Vec<Box<dyn FileFilter>> = vec![Box::new(IgnoreFilter::new(ignore_manager))];
  Ok(CompositeFilter::new(filters))
}

//! # Processor Module
//!
//! Orchestrates a check or update run over a set of files.
//!
//! The module is organized into two parts:
//! - [`collector`] - Expands command-line patterns into candidate files
//! - The [`Processor`] struct - Filters candidates, compiles one prepared
//!   header per comment style in play, and processes files in parallel
//!   batches, producing one [`FileReport`] per file
//!
//! Per-file failures are isolated: a file that cannot be read, decoded, or
//! written is recorded in its report and the rest of the run continues.

mod collector;

pub use collector::{collect_candidates, walk_directory};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::diff::DiffOptions;
use crate::encoding::Charset;
use crate::file_filter::{CompositeFilter, ExtensionFilter, FileFilter, create_default_filter};
use crate::header::{CommentHeaderFormat, FormatRegistry, HeaderStatus, HeaderTemplate, PreparedHeader, TemplateData};
use crate::output::{FileStatus, print_file_status_verbose};
use crate::report::{FileAction, FileReport};

/// Skip reason recorded for files whose extension resolves to no style.
const NO_STYLE_REASON: &str = "No comment style defined for extension";

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub registry: FormatRegistry,
  pub template: HeaderTemplate,
  pub template_data: TemplateData,
  pub workspace_root: PathBuf,

  // Behavior flags
  pub check_only: bool,
  pub dry_run: bool,

  // Optional components
  pub charset: Charset,
  pub ignore_patterns: Vec<String>,
  pub diff: Option<DiffOptions>,
  pub extension_filter: Option<ExtensionFilter>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     check_only: true,
  ///     ..ProcessorConfig::new(registry, template, template_data, workspace_root)
  /// }
  /// ```
  pub fn new(
    registry: FormatRegistry,
    template: HeaderTemplate,
    template_data: TemplateData,
    workspace_root: PathBuf,
  ) -> Self {
    Self {
      registry,
      template,
      template_data,
      workspace_root,
      check_only: false,
      dry_run: false,
      charset: Charset::utf8(),
      ignore_patterns: vec![],
      diff: None,
      extension_filter: None,
    }
  }
}

/// Processor for running header operations over files.
///
/// The `Processor` is responsible for:
/// - Expanding patterns into candidate files
/// - Filtering out ignored, symlinked, and unsupported files
/// - Compiling the header template once per comment style in play
/// - Checking or rewriting each file in parallel using Rayon
/// - Showing diffs for pending rewrites
/// - Collecting one report per file
pub struct Processor {
  /// Root of the current workspace.
  workspace_root: PathBuf,

  /// Comment style registry used to resolve a format per file
  registry: FormatRegistry,

  /// Raw header template compiled per format on demand
  template: HeaderTemplate,

  /// Data substituted into variable template lines
  template_data: TemplateData,

  /// Charset used for every file read and write
  charset: Charset,

  /// Whether to only check for headers without modifying files
  check_only: bool,

  /// Whether to compute and report updates without writing them
  dry_run: bool,

  /// Destinations for diffs of pending rewrites
  diff: DiffOptions,

  /// File filter for determining which files to process
  file_filter: CompositeFilter,

  /// Collection of file reports for this run
  pub file_reports: Arc<Mutex<Vec<FileReport>>>,
}

impl Processor {
  /// Batch size for processing files to reduce overhead.
  const BATCH_SIZE: usize = 8;

  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if any of the ignore patterns are invalid or the
  /// workspace's ignore files cannot be read.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    let mut file_filter =
      create_default_filter(config.ignore_patterns, &config.workspace_root, &config.workspace_root)?;

    if let Some(extension_filter) = config.extension_filter {
      file_filter.add_filter(Box::new(extension_filter));
    }

    let diff = config.diff.unwrap_or_else(|| DiffOptions::new(false, None));

    Ok(Self {
      workspace_root: config.workspace_root,
      registry: config.registry,
      template: config.template,
      template_data: config.template_data,
      charset: config.charset,
      check_only: config.check_only,
      dry_run: config.dry_run,
      diff,
      file_filter,
      file_reports: Arc::new(Mutex::new(Vec::new())),
    })
  }

  /// Processes a list of file or directory patterns.
  ///
  /// This is the main entry point for a run. Patterns may be individual
  /// files, directories (walked recursively), or glob patterns.
  ///
  /// # Returns
  ///
  /// `true` if any file is in violation: missing or stale in check mode,
  /// pending a rewrite in dry-run mode, or failed with an error. A
  /// completed (non-dry-run) update run reports fixed files as conforming.
  ///
  /// # Errors
  ///
  /// Returns an error if a glob pattern is invalid or the header template
  /// cannot be compiled for a comment style the run needs.
  pub fn process(&self, patterns: &[String]) -> Result<bool> {
    let files = collector::collect_candidates(patterns)?;
    self.process_files(files)
  }

  /// Processes a pre-collected list of files.
  pub fn process_files(&self, files: Vec<PathBuf>) -> Result<bool> {
    if files.is_empty() {
      debug!("No files to process");
      return Ok(false);
    }

    let mut local_reports = Vec::with_capacity(files.len());

    // Filter candidates and resolve each survivor's comment style.
    let filter_start = std::time::Instant::now();
    let mut work_items: Vec<(PathBuf, Arc<CommentHeaderFormat>)> = Vec::with_capacity(files.len());
    for path in files {
      if let Some(format) = self.admit_file(path, &mut local_reports) {
        work_items.push(format);
      }
    }
    debug!(
      "Filtered to {} files to process in {}ms",
      work_items.len(),
      filter_start.elapsed().as_millis()
    );

    if work_items.is_empty() {
      debug!("No files to process after filtering");
      self.merge_reports(local_reports);
      return Ok(false);
    }

    // Compile the template once per comment style in play, before any file
    // is touched. A template that cannot be rendered under a needed style
    // is a configuration error and aborts the run.
    let mut prepared_by_style: HashMap<String, Arc<PreparedHeader>> = HashMap::new();
    for (_, format) in &work_items {
      let name = format.name().to_string();
      if prepared_by_style.contains_key(&name) {
        continue;
      }
      let prepared = PreparedHeader::compile(&self.template, Arc::clone(format), &self.template_data)
        .with_context(|| format!("Failed to prepare header for style '{name}'"))?;
      prepared_by_style.insert(name, Arc::new(prepared));
    }

    let work: Vec<(PathBuf, Arc<PreparedHeader>)> = work_items
      .into_iter()
      .map(|(path, format)| {
        let prepared = Arc::clone(&prepared_by_style[format.name()]);
        (path, prepared)
      })
      .collect();

    let files_len = work.len();
    let process_start = std::time::Instant::now();

    // Batch processing: process files in chunks using rayon
    let batches: Vec<Vec<(PathBuf, Arc<PreparedHeader>)>> =
      work.chunks(Self::BATCH_SIZE).map(|chunk| chunk.to_vec()).collect();

    debug!(
      "Processing {} files in {} batches (batch size: {})",
      files_len,
      batches.len(),
      Self::BATCH_SIZE
    );

    let batch_reports: Vec<Vec<FileReport>> = batches
      .into_par_iter()
      .map(|batch| self.process_file_batch(batch))
      .collect();

    for reports in batch_reports {
      local_reports.extend(reports);
    }

    debug!(
      "Processed {} files in {}ms",
      files_len,
      process_start.elapsed().as_millis()
    );

    let has_violation = local_reports
      .iter()
      .any(|report| !report.ignored && !report.has_header);

    self.merge_reports(local_reports);
    Ok(has_violation)
  }

  /// Admit one candidate through the filters, or record why it was skipped.
  ///
  /// Returns the file paired with its resolved comment style when it should
  /// be processed, `None` when a skip report was recorded (or the file
  /// cannot be examined at all).
  fn admit_file(&self, path: PathBuf, reports: &mut Vec<FileReport>) -> Option<(PathBuf, Arc<CommentHeaderFormat>)> {
    // Skip symlinks - use symlink_metadata to check without following
    match std::fs::symlink_metadata(&path) {
      Ok(metadata) => {
        if metadata.file_type().is_symlink() {
          trace!("Skipping: {} (symlink)", path.display());
          reports.push(self.skipped_report(&path, "Symlink".to_string()));
          return None;
        }
      }
      Err(_) => {
        // Can't stat the file, skip it
        return None;
      }
    }

    match self.file_filter.should_process(&path) {
      Ok(result) => {
        if !result.should_process {
          let reason = result.reason.unwrap_or_else(|| "Unknown reason".to_string());
          trace!("Skipping: {} ({})", path.display(), reason);
          reports.push(self.skipped_report(&path, reason));
          return None;
        }
      }
      Err(_) => return None,
    }

    match self.registry.resolve(&path) {
      Some(format) => Some((path, format)),
      None => {
        trace!("Skipping: {} ({})", path.display(), NO_STYLE_REASON);
        reports.push(self.skipped_report(&path, NO_STYLE_REASON.to_string()));
        None
      }
    }
  }

  fn skipped_report(&self, path: &Path, reason: String) -> FileReport {
    print_file_status_verbose(path, FileStatus::Ignored(&reason), Some(&self.workspace_root));
    FileReport {
      path: path.to_path_buf(),
      has_header: false,
      action_taken: Some(FileAction::Skipped),
      ignored: true,
      ignored_reason: Some(reason),
      error: None,
    }
  }

  /// Process a batch of files, recording per-file errors in the reports.
  fn process_file_batch(&self, batch: Vec<(PathBuf, Arc<PreparedHeader>)>) -> Vec<FileReport> {
    let mut batch_reports = Vec::with_capacity(batch.len());

    for (path, prepared) in batch {
      match self.process_single_file(&path, &prepared) {
        Ok(report) => batch_reports.push(report),
        Err(e) => {
          eprintln!("Error processing {}: {:#}", path.display(), e);
          batch_reports.push(FileReport {
            path,
            has_header: false,
            action_taken: None,
            ignored: false,
            ignored_reason: None,
            error: Some(format!("{e:#}")),
          });
        }
      }
    }

    batch_reports
  }

  /// Process a single file under its prepared header.
  fn process_single_file(&self, path: &Path, prepared: &PreparedHeader) -> Result<FileReport> {
    let document = self.charset.read(path)?;
    let status = prepared.inspect_content(document.text());

    if status == HeaderStatus::Ok {
      print_file_status_verbose(path, FileStatus::HasHeader, Some(&self.workspace_root));
      let action = if self.check_only { None } else { Some(FileAction::NoChange) };
      return Ok(self.conforming_report(path, action));
    }

    // rewrite() returns a replacement for every non-conforming head.
    let Some(replacement) = prepared.rewrite(document.text()) else {
      return Ok(self.conforming_report(path, None));
    };

    if self.diff.enabled() {
      self.diff.emit(path, document.text(), &replacement)?;
    }

    let action = match status {
      HeaderStatus::Missing => FileAction::Added,
      _ => FileAction::Replaced,
    };

    if self.check_only || self.dry_run {
      let file_status = match status {
        HeaderStatus::Missing => FileStatus::MissingHeader,
        _ => FileStatus::StaleHeader,
      };
      print_file_status_verbose(path, file_status, Some(&self.workspace_root));

      // In check mode a missing header carries no action; a stale one is
      // reported as needing replacement. Dry-run reports the action that
      // a real run would take. Either way the file is left untouched and
      // counts as a violation.
      let action_taken = match (self.check_only, action) {
        (true, FileAction::Added) => None,
        (_, action) => Some(action),
      };
      return Ok(FileReport {
        path: path.to_path_buf(),
        has_header: false,
        action_taken,
        ignored: false,
        ignored_reason: None,
        error: None,
      });
    }

    self.charset.write(path, &replacement, document.has_bom())?;

    let file_status = match action {
      FileAction::Added => FileStatus::HeaderAdded,
      _ => FileStatus::HeaderReplaced,
    };
    print_file_status_verbose(path, file_status, Some(&self.workspace_root));

    Ok(FileReport {
      path: path.to_path_buf(),
      has_header: true,
      action_taken: Some(action),
      ignored: false,
      ignored_reason: None,
      error: None,
    })
  }

  fn conforming_report(&self, path: &Path, action_taken: Option<FileAction>) -> FileReport {
    FileReport {
      path: path.to_path_buf(),
      has_header: true,
      action_taken,
      ignored: false,
      ignored_reason: None,
      error: None,
    }
  }

  fn merge_reports(&self, local_reports: Vec<FileReport>) {
    if local_reports.is_empty() {
      return;
    }
    let mut reports = self.file_reports.lock().expect("mutex poisoned");
    reports.extend(local_reports);
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  const TEMPLATE: &str = "Licensed under MIT";

  fn test_processor(root: &Path, check_only: bool, dry_run: bool) -> Processor {
    let config = ProcessorConfig {
      check_only,
      dry_run,
      ..ProcessorConfig::new(
        FormatRegistry::builtin().unwrap(),
        HeaderTemplate::new(TEMPLATE),
        TemplateData::new(None),
        root.to_path_buf(),
      )
    };
    Processor::new(config).unwrap()
  }

  fn reports(processor: &Processor) -> Vec<FileReport> {
    processor.file_reports.lock().unwrap().clone()
  }

  #[test]
  fn test_update_adds_headers() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.rs");
    fs::write(&file, "fn main() {}\n").unwrap();

    let processor = test_processor(dir.path(), false, false);
    let violation = processor.process(&[dir.path().to_string_lossy().to_string()]).unwrap();

    assert!(!violation);
    assert_eq!(
      fs::read_to_string(&file).unwrap(),
      "// Licensed under MIT\n\nfn main() {}\n"
    );

    let reports = reports(&processor);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].has_header);
    assert_eq!(reports[0].action_taken, Some(FileAction::Added));
  }

  #[test]
  fn test_update_replaces_stale_header() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("lib.rs");
    fs::write(&file, "// Licensed under GPL\n\nfn lib() {}\n").unwrap();

    let processor = test_processor(dir.path(), false, false);
    processor.process(&[file.to_string_lossy().to_string()]).unwrap();

    assert_eq!(
      fs::read_to_string(&file).unwrap(),
      "// Licensed under MIT\n\nfn lib() {}\n"
    );
    let reports = reports(&processor);
    assert_eq!(reports[0].action_taken, Some(FileAction::Replaced));
  }

  #[test]
  fn test_update_leaves_conforming_file_alone() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ok.rs");
    let content = "// Licensed under MIT\n\nfn ok() {}\n";
    fs::write(&file, content).unwrap();

    let processor = test_processor(dir.path(), false, false);
    let violation = processor.process(&[file.to_string_lossy().to_string()]).unwrap();

    assert!(!violation);
    assert_eq!(fs::read_to_string(&file).unwrap(), content);
    let reports = reports(&processor);
    assert_eq!(reports[0].action_taken, Some(FileAction::NoChange));
  }

  #[test]
  fn test_check_mode_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.rs");
    let stale = dir.path().join("stale.rs");
    let ok = dir.path().join("ok.rs");
    fs::write(&missing, "fn a() {}\n").unwrap();
    fs::write(&stale, "// Licensed under GPL\n\nfn b() {}\n").unwrap();
    fs::write(&ok, "// Licensed under MIT\n\nfn c() {}\n").unwrap();

    let processor = test_processor(dir.path(), true, false);
    let violation = processor.process(&[dir.path().to_string_lossy().to_string()]).unwrap();

    assert!(violation);
    assert_eq!(fs::read_to_string(&missing).unwrap(), "fn a() {}\n");
    assert_eq!(fs::read_to_string(&stale).unwrap(), "// Licensed under GPL\n\nfn b() {}\n");

    let reports = reports(&processor);
    let by_name = |name: &str| {
      reports
        .iter()
        .find(|r| r.path.file_name().unwrap() == name)
        .unwrap()
        .clone()
    };
    assert!(!by_name("missing.rs").has_header);
    assert_eq!(by_name("missing.rs").action_taken, None);
    assert!(!by_name("stale.rs").has_header);
    assert_eq!(by_name("stale.rs").action_taken, Some(FileAction::Replaced));
    assert!(by_name("ok.rs").has_header);
  }

  #[test]
  fn test_dry_run_leaves_files_untouched() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.rs");
    fs::write(&file, "fn main() {}\n").unwrap();

    let processor = test_processor(dir.path(), false, true);
    let violation = processor.process(&[file.to_string_lossy().to_string()]).unwrap();

    assert!(violation);
    assert_eq!(fs::read_to_string(&file).unwrap(), "fn main() {}\n");
    let reports = reports(&processor);
    assert!(!reports[0].has_header);
    assert_eq!(reports[0].action_taken, Some(FileAction::Added));
  }

  #[test]
  fn test_unsupported_extension_is_skipped() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.bin");
    fs::write(&file, "payload").unwrap();

    let processor = test_processor(dir.path(), true, false);
    let violation = processor.process(&[file.to_string_lossy().to_string()]).unwrap();

    assert!(!violation);
    let reports = reports(&processor);
    assert!(reports[0].ignored);
    assert_eq!(reports[0].ignored_reason.as_deref(), Some(NO_STYLE_REASON));
  }

  #[test]
  fn test_ignore_pattern_skips_file() {
    let dir = TempDir::new().unwrap();
    let kept = dir.path().join("keep.rs");
    let dropped = dir.path().join("generated.rs");
    fs::write(&kept, "fn keep() {}\n").unwrap();
    fs::write(&dropped, "fn generated() {}\n").unwrap();

    let config = ProcessorConfig {
      check_only: true,
      ignore_patterns: vec!["generated.rs".to_string()],
      ..ProcessorConfig::new(
        FormatRegistry::builtin().unwrap(),
        HeaderTemplate::new(TEMPLATE),
        TemplateData::new(None),
        dir.path().to_path_buf(),
      )
    };
    let processor = Processor::new(config).unwrap();
    processor.process(&[dir.path().to_string_lossy().to_string()]).unwrap();

    let reports = reports(&processor);
    let dropped_report = reports
      .iter()
      .find(|r| r.path.file_name().unwrap() == "generated.rs")
      .unwrap();
    assert!(dropped_report.ignored);
    assert_eq!(reports.iter().filter(|r| !r.ignored).count(), 1);
  }

  #[test]
  fn test_unreadable_file_is_isolated() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.rs");
    let fine = dir.path().join("fine.rs");
    fs::write(&broken, [0x66, 0x6e, 0xff, 0xff]).unwrap();
    fs::write(&fine, "fn fine() {}\n").unwrap();

    let processor = test_processor(dir.path(), false, false);
    let violation = processor.process(&[dir.path().to_string_lossy().to_string()]).unwrap();

    // The broken file is a violation; the other file is still processed.
    assert!(violation);
    assert_eq!(
      fs::read_to_string(&fine).unwrap(),
      "// Licensed under MIT\n\nfn fine() {}\n"
    );

    let reports = reports(&processor);
    let broken_report = reports
      .iter()
      .find(|r| r.path.file_name().unwrap() == "broken.rs")
      .unwrap();
    assert!(broken_report.error.is_some());
    assert!(!broken_report.ignored);
  }

  #[test]
  fn test_check_then_update_then_check() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("cycle.py");
    fs::write(&file, "#!/usr/bin/env python3\nprint()\n").unwrap();
    let pattern = vec![file.to_string_lossy().to_string()];

    let checker = test_processor(dir.path(), true, false);
    assert!(checker.process(&pattern).unwrap());

    let updater = test_processor(dir.path(), false, false);
    assert!(!updater.process(&pattern).unwrap());
    assert_eq!(
      fs::read_to_string(&file).unwrap(),
      "#!/usr/bin/env python3\n\n# Licensed under MIT\n\nprint()\n"
    );

    let recheck = test_processor(dir.path(), true, false);
    assert!(!recheck.process(&pattern).unwrap());
  }
}

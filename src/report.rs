//! # Report Module
//!
//! This module captures the outcome of header processing per file and can
//! write the collected results as a machine-readable JSON report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Information about a processed file for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  /// Whether the file carries the expected header
  pub has_header: bool,
  /// Action taken on the file, if any
  pub action_taken: Option<FileAction>,
  /// Whether the file was ignored
  pub ignored: bool,
  /// Reason the file was ignored, if applicable
  pub ignored_reason: Option<String>,
  /// Error encountered while processing the file, if any
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Possible actions taken on a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
  /// A header was inserted into a file that had none
  Added,
  /// A stale header was replaced (or needs replacing in check mode)
  Replaced,
  /// No action was needed (file already had the expected header)
  #[serde(rename = "none")]
  NoChange,
  /// File was skipped for some other reason
  Skipped,
}

/// Helper module for serializing/deserializing PathBuf
mod path_serialization {
  use std::path::PathBuf;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &std::path::Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
  }
}

/// Write a JSON report of the run to `output_path`.
///
/// The report carries a summary object followed by a per-file array. Files
/// appear in the order they were processed.
///
/// # Parameters
///
/// * `output_path` - The path where the report will be saved
/// * `files` - List of file reports to include
/// * `summary` - Processing summary information
pub fn write_json_report(output_path: &Path, files: &[FileReport], summary: &RunSummary) -> Result<()> {
  use serde_json::{Map, Value, json, to_string_pretty};

  // Manually build files to ensure correct key format
  let mut files_array = Vec::new();
  for file in files {
    let mut file_map = Map::new();
    file_map.insert(
      "path".to_string(),
      Value::String(file.path.to_string_lossy().to_string()),
    );
    file_map.insert("has_header".to_string(), Value::Bool(file.has_header));

    // Handle action
    let action_str = if file.ignored {
      "ignored".to_string()
    } else if let Some(action) = &file.action_taken {
      match action {
        FileAction::Added => "added".to_string(),
        FileAction::Replaced => "replaced".to_string(),
        FileAction::NoChange => "none".to_string(),
        FileAction::Skipped => "skipped".to_string(),
      }
    } else {
      "none".to_string()
    };
    file_map.insert("action".to_string(), Value::String(action_str));

    // Add ignore reason if applicable
    if let Some(ref reason) = file.ignored_reason
      && file.ignored
    {
      file_map.insert("ignored_reason".to_string(), Value::String(reason.clone()));
    }

    if let Some(ref error) = file.error {
      file_map.insert("error".to_string(), Value::String(error.clone()));
    }

    files_array.push(Value::Object(file_map));
  }

  let report = json!({
      "summary": summary,
      "files": files_array
  });

  let content = to_string_pretty(&report)?;

  fs::write(output_path, content).with_context(|| format!("Failed to write report to {}", output_path.display()))
}

/// Summary of the processing results
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  /// Total number of files processed
  pub total_files: usize,
  /// Number of files carrying the expected header
  pub files_ok: usize,
  /// Number of files missing or carrying a stale header
  pub files_missing: usize,
  /// Number of files ignored
  pub files_ignored: usize,
  /// Number of headers added
  pub headers_added: usize,
  /// Number of headers replaced
  pub headers_replaced: usize,
  /// Number of files that could not be processed
  pub files_errored: usize,
  /// Total processing time
  #[serde(skip_serializing)]
  pub processing_time: std::time::Duration,
  /// Processing time in seconds for serialization
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
  /// Timestamp when the report was generated
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<i64>,
}

impl RunSummary {
  /// Create a new RunSummary initialized to zero
  pub fn new(processing_time: std::time::Duration) -> Self {
    Self {
      total_files: 0,
      files_ok: 0,
      files_missing: 0,
      files_ignored: 0,
      headers_added: 0,
      headers_replaced: 0,
      files_errored: 0,
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      timestamp: Some(Local::now().timestamp()),
    }
  }

  /// Create a RunSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: std::time::Duration) -> Self {
    let mut summary = Self::new(processing_time);

    summary.total_files = files.len();

    for file in files {
      if file.ignored {
        summary.files_ignored += 1;
        continue;
      }

      if file.error.is_some() {
        summary.files_errored += 1;
        continue;
      }

      if file.has_header {
        summary.files_ok += 1;
      } else {
        summary.files_missing += 1;
      }

      if let Some(action) = &file.action_taken {
        match action {
          FileAction::Added => summary.headers_added += 1,
          FileAction::Replaced => summary.headers_replaced += 1,
          _ => {}
        }
      }
    }

    summary
  }
}

//! # Check and Update Commands
//!
//! This module implements the two subcommands. Both share the same argument
//! set and run pipeline; they differ only in whether non-conforming files are
//! rewritten.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::{DEFAULT_CONFIG_FILENAME, load_config};
use crate::diff::DiffOptions;
use crate::encoding::Charset;
use crate::file_filter::ExtensionFilter;
use crate::header::{FormatRegistry, HeaderTemplate, TemplateData};
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::{
  CategorizedReports, print_added_files, print_all_files_ok, print_blank_line, print_hint, print_missing_files,
  print_replaced_files, print_stale_files, print_start_message, print_summary,
};
use crate::processor::{Processor, ProcessorConfig, collect_candidates};
use crate::report::{FileReport, RunSummary, write_json_report};
use crate::verbose_log;
use crate::workspace::resolve_workspace;

/// Arguments shared by the check and update commands
#[derive(Args, Debug, Default)]
pub struct RunArgs {
  /// File or directory patterns to process. Directories are processed
  /// recursively. Defaults to the current directory.
  #[arg(required = false)]
  pub patterns: Vec<String>,

  /// Path to config file (default: .licenser.toml in workspace root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Header template file to use
  #[arg(long, short = 'f', value_name = "FILE")]
  pub license_file: Option<PathBuf>,

  /// Copyright year(s) substituted into the template
  #[arg(long)]
  pub year: Option<String>,

  /// Encoding used to read and write files (e.g. utf-8, windows-1252)
  #[arg(long, value_name = "LABEL")]
  pub encoding: Option<String>,

  /// File patterns to ignore (supports glob patterns)
  #[arg(long, short = 'i')]
  pub ignore: Vec<String>,

  /// Only process files with these extensions (repeatable, case-insensitive)
  #[arg(long, value_name = "EXT")]
  pub include_ext: Vec<String>,

  /// Exclude files with these extensions (repeatable, case-insensitive)
  #[arg(long, value_name = "EXT")]
  pub exclude_ext: Vec<String>,

  /// Show a diff of each pending change
  #[arg(long)]
  pub diff: bool,

  /// Save the diffs of all pending changes to a file
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Generate a JSON report of header status and save to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Increase verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl RunArgs {
  /// Validate the arguments and return an error if invalid
  fn validate(&self) -> Result<(), String> {
    if let Some(label) = self.encoding.as_deref()
      && Charset::resolve(label).is_err()
    {
      return Err(format!("Unknown encoding label '{label}'"));
    }
    Ok(())
  }
}

/// Arguments for the update command
#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
  #[command(flatten)]
  pub run: RunArgs,

  /// Compute and report changes without writing them
  #[arg(long)]
  pub dry_run: bool,
}

/// Run the check command with the given arguments
pub fn run_check(args: RunArgs) -> Result<()> {
  run(args, true, false)
}

/// Run the update command with the given arguments
pub fn run_update(args: UpdateArgs) -> Result<()> {
  run(args.run, false, args.dry_run)
}

/// Shared pipeline behind both subcommands.
fn run(args: RunArgs, check_only: bool, dry_run: bool) -> Result<()> {
  // Validate arguments
  if let Err(e) = args.validate() {
    eprintln!("ERROR: {e}");
    process::exit(1);
  }

  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  // Set verbose mode for output formatting and info_log! macro
  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  if dry_run {
    info_log!("Dry run: computing changes without writing files");
  }

  let patterns = if args.patterns.is_empty() {
    vec![".".to_string()]
  } else {
    args.patterns
  };

  let workspace = resolve_workspace(&patterns)?;
  let workspace_root = workspace.root().to_path_buf();
  if workspace.is_project() {
    verbose_log!("Using project root: {}", workspace_root.display());
  }

  // Load configuration file if present
  let config = load_config(args.config.as_deref(), &workspace_root, args.no_config)?;
  if config.is_some() {
    debug!("Using configuration file overrides");
  }

  let mut registry = FormatRegistry::builtin()?;
  if let Some(ref config) = config {
    config
      .apply(&mut registry)
      .with_context(|| "Failed to apply configured styles")?;
  }

  // The template may come from the CLI or the config; without either there
  // is nothing to compare files against.
  let template_path = args
    .license_file
    .clone()
    .or_else(|| config.as_ref().and_then(|c| c.header_file()));
  let Some(template_path) = template_path else {
    eprintln!("ERROR: No header template: pass --license-file or set [header] file in {DEFAULT_CONFIG_FILENAME}");
    process::exit(1);
  };
  let template = HeaderTemplate::load(&template_path)?;

  let year = args
    .year
    .clone()
    .or_else(|| config.as_ref().and_then(|c| c.header.year.clone()));
  let template_data = TemplateData::new(year);

  let charset = match args.encoding.as_deref() {
    Some(label) => Charset::resolve(label)?,
    None => config.as_ref().and_then(|c| c.charset()).unwrap_or(Charset::utf8()),
  };

  // Extension lists from the CLI replace the configured ones entirely
  let extension_filter = if !args.include_ext.is_empty() || !args.exclude_ext.is_empty() {
    Some(ExtensionFilter::from_cli(args.include_ext, args.exclude_ext))
  } else {
    config
      .as_ref()
      .filter(|c| c.has_extension_filter())
      .map(|c| ExtensionFilter::new(&c.extensions))
  };
  if extension_filter.is_some() {
    debug!("Extension filtering is active");
  }

  let processor_config = ProcessorConfig {
    check_only,
    dry_run,
    charset,
    ignore_patterns: args.ignore,
    diff: Some(DiffOptions::new(args.diff, args.save_diff)),
    extension_filter,
    ..ProcessorConfig::new(registry, template, template_data, workspace_root.clone())
  };
  let processor = Processor::new(processor_config)?;

  // Collect candidates up front so the start message can show a count
  let files = collect_candidates(&patterns)?;

  print_start_message(files.len(), !check_only && !dry_run);

  // Short-circuit if no files to process
  if files.is_empty() {
    print_blank_line();
    print_all_files_ok();
    return Ok(());
  }

  // Start timing
  let start_time = Instant::now();

  let has_violation = processor.process_files(files)?;

  let elapsed = start_time.elapsed();

  // Take the reports out of the processor to avoid a clone
  let file_reports = std::mem::take(&mut *processor.file_reports.lock().expect("mutex poisoned"));

  let summary = RunSummary::from_reports(&file_reports, elapsed);
  let categorized = CategorizedReports::from_reports(&file_reports);

  print_blank_line();

  // A file that would get a header sits in `missing` in check mode; in dry
  // run it carries the pending action instead.
  let would_change =
    !categorized.missing.is_empty() || !categorized.added.is_empty() || !categorized.replaced.is_empty();

  if check_only || dry_run {
    let pending_missing: Vec<&FileReport> = categorized.missing.iter().chain(&categorized.added).copied().collect();
    let has_missing = !pending_missing.is_empty();
    let has_stale = !categorized.replaced.is_empty();

    if !would_change && categorized.errored.is_empty() {
      print_all_files_ok();
    } else {
      // Split the limit between lists if both have content
      let limit = if has_missing && has_stale { Some(10) } else { None };

      if has_missing {
        print_missing_files(&pending_missing, Some(&workspace_root), limit);
      }
      if has_stale {
        if has_missing {
          print_blank_line();
        }
        print_stale_files(&categorized.replaced, Some(&workspace_root), limit);
      }
    }
    // When only errors remain the failures were already logged, so neither
    // the success message nor a file list is shown
  } else {
    // Update mode: show what was changed
    if !categorized.added.is_empty() {
      print_added_files(&categorized.added, Some(&workspace_root));
    }
    if !categorized.replaced.is_empty() {
      if !categorized.added.is_empty() {
        print_blank_line();
      }
      print_replaced_files(&categorized.replaced, Some(&workspace_root));
    }
    // Only show success if nothing was changed and no failures occurred
    if !would_change && categorized.errored.is_empty() {
      print_all_files_ok();
    }
  }

  // Print summary
  print_blank_line();
  print_summary(&summary);

  // Print hint if there are pending changes this run did not apply
  if (check_only || dry_run) && would_change {
    print_blank_line();
    let hint = if check_only {
      "Run 'licenser update' to fix these files."
    } else {
      "Run 'licenser update' without --dry-run to apply these changes."
    };
    print_hint(hint);
  }

  // Generate JSON report if requested
  if let Some(ref output_path) = args.report_json {
    if let Err(e) = write_json_report(output_path, &file_reports, &summary) {
      eprintln!("Error generating JSON report: {}", e);
    } else {
      info_log!("Generated JSON report at {}", output_path.display());
    }
  }

  // Exit with non-zero code when any file is missing or stale in a run that
  // did not fix it, or when a file could not be processed
  if has_violation {
    process::exit(1);
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate_accepts_known_encoding() {
    let args = RunArgs {
      encoding: Some("windows-1252".to_string()),
      ..RunArgs::default()
    };
    assert!(args.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_unknown_encoding() {
    let args = RunArgs {
      encoding: Some("klingon".to_string()),
      ..RunArgs::default()
    };
    let err = args.validate().expect_err("should fail");
    assert!(err.contains("klingon"));
  }

  #[test]
  fn test_validate_accepts_missing_encoding() {
    assert!(RunArgs::default().validate().is_ok());
  }
}

//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing with `check` and `update` subcommands
//! that share a common set of arguments.

mod run;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
pub use run::{RunArgs, UpdateArgs, run_check, run_update};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Version string shown in `--version` and the help banner.
///
/// Includes the short git hash embedded at build time when one was available.
fn build_version() -> String {
  match option_env!("GIT_HASH") {
    Some(hash) if !hash.is_empty() => format!("{} ({hash})", env!("CARGO_PKG_VERSION")),
    _ => env!("CARGO_PKG_VERSION").to_string(),
  }
}

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version = build_version(),
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Check license headers without modifying files
  licenser check --license-file LICENSE.txt src/

  # Add or replace license headers
  licenser update --license-file custom.txt --year 2023 include/ src/

  # Preview the changes an update would make
  licenser update --dry-run --diff --license-file LICENSE.txt src/

  # Save the pending changes to a consolidated diff file
  licenser update --dry-run --save-diff changes.diff --license-file LICENSE.txt src/

  # Process files declared in a .licenser.toml config
  licenser check .

  # Generate a JSON report of header status
  licenser check --report-json report.json --license-file LICENSE.txt src/

  # Ignore specific files or patterns
  licenser check --ignore \"**/vendor/**\" --ignore \"**/*.json\" --license-file LICENSE.txt src/
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Check files for the expected license header without modifying them
  Check(RunArgs),
  /// Add or replace license headers in files
  Update(UpdateArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cli_parses_check_subcommand() {
    let cli = Cli::try_parse_from(["licenser", "check", "src/"]).expect("should parse");
    match cli.command {
      Command::Check(args) => assert_eq!(args.patterns, vec!["src/".to_string()]),
      Command::Update(_) => panic!("expected check subcommand"),
    }
  }

  #[test]
  fn test_cli_parses_update_with_dry_run() {
    let cli = Cli::try_parse_from(["licenser", "update", "--dry-run", "."]).expect("should parse");
    match cli.command {
      Command::Update(args) => {
        assert!(args.dry_run);
        assert_eq!(args.run.patterns, vec![".".to_string()]);
      }
      Command::Check(_) => panic!("expected update subcommand"),
    }
  }

  #[test]
  fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["licenser", "src/"]).is_err());
  }

  #[test]
  fn test_cli_rejects_quiet_with_verbose() {
    assert!(Cli::try_parse_from(["licenser", "check", "-q", "-v", "src/"]).is_err());
  }

  #[test]
  fn test_cli_dry_run_only_on_update() {
    assert!(Cli::try_parse_from(["licenser", "check", "--dry-run", "src/"]).is_err());
  }

  #[test]
  fn test_build_version_mentions_package_version() {
    assert!(build_version().starts_with(env!("CARGO_PKG_VERSION")));
  }
}

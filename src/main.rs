//! # licenser
//!
//! A tool that keeps source files carrying an up-to-date license header.

use anyhow::Result;
use licenser::cli::{Cli, Command, run_check, run_update};

fn main() -> Result<()> {
  let cli = Cli::parse_args();

  match cli.command {
    Command::Check(args) => run_check(args),
    Command::Update(args) => run_update(args),
  }
}

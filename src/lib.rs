//! # licenser
//!
//! A tool that keeps source files carrying an up-to-date license header by scanning directory patterns recursively.
//!
//! `licenser` detects whether each file begins with the expected header, tolerating shebang lines
//! and XML declarations above it and year drift inside it, and can rewrite non-conforming files in
//! place. Replacement content is computed in full before anything is written, so files are never
//! left half-modified.
//!
//! ## Features
//!
//! * Recursively scan directories and add license headers to source files
//! * Automatic detection of file types and appropriate comment formatting
//! * Check mode to verify headers without modifying files, dry-run mode to preview an update
//! * Stale-header replacement: a recognizable but non-matching header is swapped, not duplicated
//! * Ignore patterns, `.licenserignore` files, and extension include/exclude filtering
//! * Custom comment styles and extension mappings via `.licenser.toml`
//! * Non-UTF-8 encodings with BOM preservation
//!
//! ## Usage as a Library
//!
//! This crate can be used as a library in your Rust projects:
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use licenser::encoding::Charset;
//! use licenser::header::{FormatRegistry, HeaderTemplate, PreparedHeader, TemplateData, UpdateOutcome};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = FormatRegistry::builtin()?;
//!     let format = registry
//!         .resolve(Path::new("src/main.rs"))
//!         .expect("a comment style for .rs files");
//!
//!     // Compile the template once, then run it against any number of files
//!     let template = HeaderTemplate::load(Path::new("HEADER.txt"))?;
//!     let prepared = PreparedHeader::compile(&template, format, &TemplateData::new(None))?;
//!
//!     match prepared.update(Path::new("src/main.rs"), &Charset::utf8())? {
//!         UpdateOutcome::Changed => println!("Header added"),
//!         UpdateOutcome::Unchanged => println!("Header already in place"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`header`] - The matching/update engine: formats, template compiler, prepared headers
//! * [`processor`] - Batch processing of files and directories
//! * [`config`] - `.licenser.toml` loading and validation
//! * [`logging`] - Logging utilities for verbose output
//!
//! [`header`]: crate::header
//! [`processor`]: crate::processor
//! [`config`]: crate::config
//! [`logging`]: crate::logging

pub mod cli;
pub mod config;
pub mod diff;
pub mod encoding;
pub mod file_filter;
pub mod header;
pub mod ignore;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
pub mod workspace;

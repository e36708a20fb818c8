//! # Configuration Module
//!
//! This module provides configuration support for licenser, allowing users to
//! point at the header template, define custom comment styles, map extensions
//! and filenames to styles, and control extension filtering.
//!
//! Configuration can be specified in a `.licenser.toml` file or via the
//! `LICENSER_CONFIG` environment variable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::encoding::Charset;
use crate::header::{CommentHeaderFormat, FormatRegistry, HeaderError};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licenser.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LICENSER_CONFIG";

/// The `[header]` table: where the template lives and how files are decoded.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct HeaderConfig {
  /// Path to the header template file. Relative paths are resolved against
  /// the directory containing the config file.
  #[serde(default)]
  pub file: Option<PathBuf>,

  /// Value substituted for the year variable when rendering the template.
  /// Defaults to the current year when unset.
  #[serde(default)]
  pub year: Option<String>,

  /// Encoding label used to decode and encode processed files
  /// (e.g. "utf-8", "windows-1252", "utf-16le").
  #[serde(default)]
  pub encoding: Option<String>,
}

/// User-defined comment style configuration.
///
/// A style with only `prefix` is a line style; one with `open` and `close`
/// wraps the header in block markers. The derived start/end/skip patterns can
/// be overridden with explicit regexes.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct StyleConfig {
  /// The line that opens a block comment (e.g. "/*").
  #[serde(default)]
  pub open: Option<String>,

  /// The prefix for each content line (e.g. "// " or " * ").
  #[serde(default)]
  pub prefix: String,

  /// The line that closes a block comment (e.g. " */").
  #[serde(default)]
  pub close: Option<String>,

  /// Explicit pattern recognizing the first header line.
  #[serde(default)]
  pub start: Option<String>,

  /// Explicit pattern marking the last header line.
  #[serde(default)]
  pub end: Option<String>,

  /// Pattern for lines the header scan treats as transparent
  /// (shebangs, XML declarations).
  #[serde(default)]
  pub skip: Option<String>,
}

impl StyleConfig {
  /// Build the comment header format this configuration describes.
  pub fn build(&self, name: &str) -> Result<CommentHeaderFormat, HeaderError> {
    let mut format = match (self.open.as_deref(), self.close.as_deref()) {
      (Some(open), Some(close)) => CommentHeaderFormat::block(name, open, &self.prefix, close)?,
      (None, None) => CommentHeaderFormat::line(name, &self.prefix)?,
      _ => {
        return Err(HeaderError::InvalidStyle {
          style: name.to_string(),
          reason: "open and close markers must be configured together".to_string(),
        });
      }
    };

    if let Some(pattern) = self.start.as_deref() {
      format = format.with_start(pattern)?;
    }
    if let Some(pattern) = self.end.as_deref() {
      format = format.with_end(pattern)?;
    }
    if let Some(pattern) = self.skip.as_deref() {
      format = format.with_skip(pattern)?;
    }

    Ok(format)
  }
}

/// Configuration for extension-based file filtering.
///
/// If `include` is specified, only files with those extensions will be
/// processed. If only `exclude` is specified, all files except those with the
/// excluded extensions will be processed.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct ExtensionConfig {
  /// If specified, only process files with these extensions.
  /// All other extensions will be excluded.
  #[serde(default)]
  pub include: Option<Vec<String>>,

  /// Extensions to exclude from processing.
  /// Ignored if `include` is specified.
  #[serde(default)]
  pub exclude: Vec<String>,
}

/// Main configuration struct for licenser.
///
/// This struct is loaded from a `.licenser.toml` file and contains all
/// user-configurable options for the header template, comment styles, style
/// mappings, and extension filtering.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
  /// Header template settings.
  #[serde(default)]
  pub header: HeaderConfig,

  /// Extension-based file filtering configuration.
  #[serde(default)]
  pub extensions: ExtensionConfig,

  /// Custom comment styles, keyed by style name.
  #[serde(default)]
  pub styles: HashMap<String, StyleConfig>,

  /// Extension-to-style mappings. Keys are file extensions without the
  /// leading dot (e.g. "xyz", "tpl").
  #[serde(default)]
  pub mapping: HashMap<String, String>,

  /// Filename-to-style mappings. Keys are exact filenames
  /// (e.g. "Justfile", "BUILD").
  #[serde(default)]
  pub files: HashMap<String, String>,

  /// Where this config was loaded from, for resolving relative paths.
  #[serde(skip)]
  origin: Option<PathBuf>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A style or mapping entry is invalid.
  #[error("Invalid style configuration for '{name}': {message}")]
  InvalidStyle { name: String, message: String },

  /// The configured encoding label is not recognized.
  #[error("Unknown encoding label '{label}' in [header] section")]
  UnknownEncoding { label: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read or
  /// parsed.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;
    config.origin = Some(path.to_path_buf());

    config.validate()?;

    // Normalize keys to lowercase for case-insensitive matching
    let config = config.normalize();

    verbose_log!(
      "Loaded {} custom styles, {} mappings",
      config.styles.len(),
      config.mapping.len() + config.files.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Custom styles have either a prefix or a matched open/close pair
  /// - Mapping and filter entries don't include the leading dot
  /// - The encoding label, if set, is recognized
  fn validate(&self) -> Result<(), ConfigError> {
    for (name, style) in &self.styles {
      if style.open.is_some() != style.close.is_some() {
        return Err(ConfigError::InvalidStyle {
          name: name.clone(),
          message: "open and close markers must be configured together".to_string(),
        });
      }

      if style.open.is_none() && style.prefix.trim().is_empty() {
        return Err(ConfigError::InvalidStyle {
          name: name.clone(),
          message: "line styles need a non-empty prefix".to_string(),
        });
      }
    }

    for extension in self.mapping.keys() {
      if extension.starts_with('.') {
        return Err(ConfigError::InvalidStyle {
          name: extension.clone(),
          message: "extension should not include the leading dot".to_string(),
        });
      }
    }

    // Validate extension filter entries
    if let Some(include) = &self.extensions.include {
      for extension in include {
        if extension.starts_with('.') {
          return Err(ConfigError::InvalidStyle {
            name: extension.clone(),
            message: "extension in include list should not include the leading dot".to_string(),
          });
        }
      }
    }

    for extension in &self.extensions.exclude {
      if extension.starts_with('.') {
        return Err(ConfigError::InvalidStyle {
          name: extension.clone(),
          message: "extension in exclude list should not include the leading dot".to_string(),
        });
      }
    }

    if let Some(label) = &self.header.encoding
      && Charset::resolve(label).is_err()
    {
      return Err(ConfigError::UnknownEncoding { label: label.clone() });
    }

    Ok(())
  }

  /// Register the configured styles and mappings on a format registry.
  ///
  /// Custom styles are registered first so that mappings can reference them;
  /// a style sharing a name with a builtin replaces it.
  pub fn apply(&self, registry: &mut FormatRegistry) -> Result<(), HeaderError> {
    for (name, style) in &self.styles {
      registry.register_style(style.build(name)?);
    }

    for (extension, style) in &self.mapping {
      registry.map_extension(extension, style)?;
    }

    for (filename, style) in &self.files {
      registry.map_filename(filename, style)?;
    }

    Ok(())
  }

  /// Path to the configured header template, resolved against the config
  /// file's directory when relative.
  pub fn header_file(&self) -> Option<PathBuf> {
    let file = self.header.file.as_ref()?;
    if file.is_absolute() {
      return Some(file.clone());
    }
    match self.origin.as_ref().and_then(|origin| origin.parent()) {
      Some(dir) => Some(dir.join(file)),
      None => Some(file.clone()),
    }
  }

  /// The configured charset, if any.
  ///
  /// `validate()` has already checked the label, so resolution cannot fail
  /// for a loaded config.
  pub fn charset(&self) -> Option<Charset> {
    let label = self.header.encoding.as_deref()?;
    Charset::resolve(label).ok()
  }

  /// Check if the configuration has any extension filtering.
  pub const fn has_extension_filter(&self) -> bool {
    self.extensions.include.is_some() || !self.extensions.exclude.is_empty()
  }

  /// Normalize mapping keys to lowercase for case-insensitive matching.
  ///
  /// This ensures that config keys like "Justfile" or "CMakeLists.txt" will
  /// match the lowercased filenames used during lookup. Style names are left
  /// untouched.
  fn normalize(self) -> Self {
    let mapping = self.mapping.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

    let files = self.files.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

    Self {
      header: self.header,
      extensions: self.extensions,
      styles: self.styles,
      mapping,
      files,
      origin: self.origin,
    }
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `LICENSER_CONFIG` environment variable
/// 3. `.licenser.toml` in the workspace root
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  // 1. Explicit path from CLI takes highest priority
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  // 2. Check environment variable
  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  // 3. Check workspace root
  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or return `None`.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
/// * `no_config` - If true, skip config file discovery and use defaults
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, workspace_root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}

//! Ignore-pattern coverage: CLI globs, `.licenserignore` chains and the
//! built-in directory skip list.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::tempdir;

use licenser::header::{FormatRegistry, HeaderTemplate, TemplateData};
use licenser::ignore::{IGNORE_ENV_VAR, IgnoreManager};
use licenser::processor::{Processor, ProcessorConfig};

#[test]
fn test_licenserignore_basic() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(temp_path.join(".licenserignore"), "*.json\n*.md\nvendor/\n")?;

  fs::write(temp_path.join("test.rs"), "// Test Rust file")?;
  fs::write(temp_path.join("test.json"), "{}")?;
  fs::write(temp_path.join("test.md"), "# Test Markdown file")?;
  fs::create_dir(temp_path.join("vendor"))?;
  fs::write(temp_path.join("vendor").join("test.rs"), "// Test vendor file")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(temp_path, temp_path)?;

  assert!(
    !manager.is_ignored(&temp_path.join("test.rs")),
    "Rust file should not be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("test.json")),
    "JSON file should be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("test.md")),
    "Markdown file should be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("vendor").join("test.rs")),
    "Vendor file should be ignored"
  );

  Ok(())
}

#[test]
fn test_licenserignore_with_cli_patterns() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(temp_path.join(".licenserignore"), "*.json\n")?;

  fs::write(temp_path.join("test.rs"), "// Test Rust file")?;
  fs::write(temp_path.join("test.json"), "{}")?;
  fs::write(temp_path.join("test.md"), "# Test Markdown file")?;

  let mut manager = IgnoreManager::new(vec!["*.md".to_string()])?;
  manager.load_ignore_files(temp_path, temp_path)?;

  assert!(
    !manager.is_ignored(&temp_path.join("test.rs")),
    "Rust file should not be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("test.json")),
    "JSON file should be ignored by .licenserignore"
  );
  assert!(
    manager.is_ignored(&temp_path.join("test.md")),
    "Markdown file should be ignored by CLI pattern"
  );

  Ok(())
}

#[test]
fn test_cli_directory_shorthand_patterns() -> Result<()> {
  let manager = IgnoreManager::new(vec!["build/".to_string(), "dist".to_string()])?;

  assert!(manager.is_ignored(Path::new("build/gen.rs")));
  assert!(manager.is_ignored(Path::new("/work/project/build/gen.rs")));
  assert!(manager.is_ignored(Path::new("dist")));
  assert!(manager.is_ignored(Path::new("dist/bundle.js")));
  assert!(manager.is_ignored(Path::new("/work/project/dist/bundle.js")));
  assert!(!manager.is_ignored(Path::new("src/main.rs")));

  Ok(())
}

#[test]
fn test_cli_wildcard_matches_absolute_paths() -> Result<()> {
  let manager = IgnoreManager::new(vec!["*.lock".to_string()])?;

  assert!(manager.is_ignored(Path::new("Cargo.lock")));
  assert!(manager.is_ignored(Path::new("/work/project/Cargo.lock")));
  assert!(!manager.is_ignored(Path::new("/work/project/Cargo.toml")));

  Ok(())
}

#[test]
fn test_global_ignore_file() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  let global_ignore_path = temp_path.join("global_ignore");
  fs::write(&global_ignore_path, "*.generated\n")?;

  // SAFETY: test-only env mutation; the variable is removed below.
  unsafe {
    env::set_var(IGNORE_ENV_VAR, &global_ignore_path);
  }

  fs::write(temp_path.join(".licenserignore"), "*.json\n")?;

  fs::write(temp_path.join("test.rs"), "// Test Rust file")?;
  fs::write(temp_path.join("test.json"), "{}")?;
  fs::write(temp_path.join("schema.generated"), "// generated code")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(temp_path, temp_path)?;

  // SAFETY: test-only env mutation; clears the variable set above.
  unsafe {
    env::remove_var(IGNORE_ENV_VAR);
  }

  assert!(
    !manager.is_ignored(&temp_path.join("test.rs")),
    "Rust file should not be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("test.json")),
    "JSON file should be ignored by .licenserignore"
  );
  assert!(
    manager.is_ignored(&temp_path.join("schema.generated")),
    "Generated file should be ignored by the global ignore file"
  );

  Ok(())
}

#[test]
fn test_hierarchical_licenserignore() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(temp_path.join(".licenserignore"), "*.json\n")?;
  fs::create_dir(temp_path.join("subdir"))?;
  fs::write(temp_path.join("subdir").join(".licenserignore"), "*.txt\n")?;

  fs::write(temp_path.join("test.txt"), "text at the root")?;
  fs::write(temp_path.join("subdir").join("test.rs"), "// Rust file in subdir")?;
  fs::write(temp_path.join("subdir").join("test.json"), "{}")?;
  fs::write(temp_path.join("subdir").join("test.txt"), "text in subdir")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(&temp_path.join("subdir"), temp_path)?;

  assert!(
    !manager.is_ignored(&temp_path.join("subdir").join("test.rs")),
    "Rust file in subdir should not be ignored"
  );
  assert!(
    manager.is_ignored(&temp_path.join("subdir").join("test.json")),
    "JSON file in subdir should be ignored (inherited from the root)"
  );
  assert!(
    manager.is_ignored(&temp_path.join("subdir").join("test.txt")),
    "Text file in subdir should be ignored (from the subdir ignore file)"
  );

  Ok(())
}

#[test]
fn test_gitignore_style_patterns() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(
    temp_path.join(".licenserignore"),
    concat!(
      "# Comment line\n",
      "*.json\n",
      "!important.json\n",
      "/root_only.txt\n",
      "docs/*.md\n",
      "*.min.*\n",
    ),
  )?;

  fs::write(temp_path.join("test.json"), "{}")?;
  fs::write(temp_path.join("important.json"), "{}")?;
  fs::write(temp_path.join("root_only.txt"), "root level")?;
  fs::create_dir(temp_path.join("subdir"))?;
  fs::write(temp_path.join("subdir").join("root_only.txt"), "nested")?;
  fs::create_dir(temp_path.join("docs"))?;
  fs::write(temp_path.join("docs").join("readme.md"), "# Documentation")?;
  fs::write(temp_path.join("script.min.js"), "// minified")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(temp_path, temp_path)?;

  assert!(manager.is_ignored(&temp_path.join("test.json")));
  assert!(
    !manager.is_ignored(&temp_path.join("important.json")),
    "negation pattern should re-include the file"
  );
  assert!(manager.is_ignored(&temp_path.join("root_only.txt")));
  assert!(
    !manager.is_ignored(&temp_path.join("subdir").join("root_only.txt")),
    "anchored pattern should only match at the root"
  );
  assert!(manager.is_ignored(&temp_path.join("docs").join("readme.md")));
  assert!(manager.is_ignored(&temp_path.join("script.min.js")));

  Ok(())
}

#[test]
fn test_relative_paths_resolve_against_root() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(temp_path.join(".licenserignore"), "*.json\n")?;
  fs::write(temp_path.join("test.json"), "{}")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(temp_path, temp_path)?;

  assert!(
    manager.is_ignored(Path::new("test.json")),
    "relative paths should be matched against the workspace root"
  );

  Ok(())
}

#[test]
fn test_default_dirs_are_always_ignored() -> Result<()> {
  let manager = IgnoreManager::new(vec![])?;

  assert!(manager.is_ignored(Path::new("target/debug/build.rs")));
  assert!(manager.is_ignored(Path::new("node_modules/pkg/index.js")));
  assert!(manager.is_ignored(Path::new(".git/hooks/pre-commit")));
  assert!(!manager.is_ignored(Path::new("src/main.rs")));

  Ok(())
}

#[test]
fn test_default_dirs_scoped_to_workspace_root() -> Result<()> {
  let temp_dir = tempdir()?;
  // A workspace living under a directory named like a skip-list entry
  let root = temp_dir.path().join("target").join("project");
  fs::create_dir_all(&root)?;
  fs::write(root.join("main.rs"), "fn main() {}\n")?;

  let mut manager = IgnoreManager::new(vec![])?;
  manager.load_ignore_files(&root, &root)?;

  assert!(
    !manager.is_ignored(&root.join("main.rs")),
    "an ancestor directory outside the workspace must not ignore the tree"
  );
  assert!(
    manager.is_ignored(&root.join("target").join("gen.rs")),
    "a skip-list directory inside the workspace is still ignored"
  );

  Ok(())
}

#[test]
fn test_processor_skips_licenserignore_matches() -> Result<()> {
  let temp_dir = tempdir()?;
  let temp_path = temp_dir.path();

  fs::write(temp_path.join(".licenserignore"), "*.py\n")?;
  fs::write(temp_path.join("test.rs"), "fn main() {}\n")?;
  fs::write(temp_path.join("test.py"), "print()\n")?;

  let config = ProcessorConfig {
    check_only: true,
    ..ProcessorConfig::new(
      FormatRegistry::builtin()?,
      HeaderTemplate::new("Licensed under MIT"),
      TemplateData::new(None),
      temp_path.to_path_buf(),
    )
  };
  let processor = Processor::new(config)?;

  let has_violation = processor.process(&[temp_path.to_string_lossy().to_string()])?;
  assert!(has_violation, "the Rust file is missing its header");

  let reports = processor.file_reports.lock().expect("mutex poisoned");
  let python = reports
    .iter()
    .find(|r| r.path.ends_with("test.py"))
    .expect("python file should be reported");
  assert!(python.ignored, "python file should be skipped via .licenserignore");

  let rust = reports
    .iter()
    .find(|r| r.path.ends_with("test.rs"))
    .expect("rust file should be reported");
  assert!(!rust.ignored);
  assert!(!rust.has_header);

  Ok(())
}

//! # Encoding Layer
//!
//! Reads and writes file contents under a declared character encoding. The
//! engine never guesses encodings: the charset comes from configuration, and
//! bytes that do not decode under it are an error carrying the file path.
//!
//! A byte-order mark matching the declared encoding is stripped on read,
//! remembered, and written back on update so round-trips do not move the
//! file between BOM conventions. Writes go through a temporary file in the
//! target directory followed by a rename, so a file is never observable in a
//! partially-written state.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use tempfile::NamedTempFile;

/// A resolved character encoding used for all file reads and writes in a run.
#[derive(Debug, Clone, Copy)]
pub struct Charset {
  encoding: &'static Encoding,
}

impl Default for Charset {
  fn default() -> Self {
    Self::utf8()
  }
}

/// Decoded file content plus what we need to write it back faithfully.
#[derive(Debug)]
pub struct Document {
  text: String,
  bom: bool,
}

impl Document {
  /// The decoded text, BOM excluded.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Whether the file carried a byte-order mark for the declared encoding.
  pub const fn has_bom(&self) -> bool {
    self.bom
  }
}

impl Charset {
  /// The default charset.
  pub const fn utf8() -> Self {
    Self { encoding: UTF_8 }
  }

  /// Resolve a charset from a WHATWG encoding label (e.g. "utf-8",
  /// "windows-1252", "utf-16le").
  pub fn resolve(label: &str) -> Result<Self> {
    let trimmed = label.trim();
    let encoding =
      Encoding::for_label(trimmed.as_bytes()).ok_or_else(|| anyhow!("unknown encoding label '{trimmed}'"))?;
    Ok(Self { encoding })
  }

  /// Canonical name of the underlying encoding.
  pub fn name(&self) -> &'static str {
    self.encoding.name()
  }

  /// Read and strictly decode a file.
  pub fn read(&self, path: &Path) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (bom, payload) = match Encoding::for_bom(&bytes) {
      Some((encoding, len)) if encoding == self.encoding => (true, &bytes[len..]),
      _ => (false, bytes.as_slice()),
    };

    let (text, had_errors) = self.encoding.decode_without_bom_handling(payload);
    if had_errors {
      bail!("File {} is not valid {}", path.display(), self.name());
    }

    Ok(Document {
      text: text.into_owned(),
      bom,
    })
  }

  /// Encode and write a full replacement for a file, atomically.
  pub fn write(&self, path: &Path, text: &str, bom: bool) -> Result<()> {
    let payload = self
      .encode(text)
      .with_context(|| format!("Failed to encode {} as {}", path.display(), self.name()))?;

    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    let mut tmp =
      NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    if bom {
      tmp
        .write_all(self.bom_bytes())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    }
    tmp
      .write_all(&payload)
      .with_context(|| format!("Failed to write file: {}", path.display()))?;

    // Keep the original file mode across the rename.
    if let Ok(metadata) = fs::metadata(path) {
      let _ = fs::set_permissions(tmp.path(), metadata.permissions());
    }

    tmp
      .persist(path)
      .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
  }

  /// Encode text for this charset.
  ///
  /// encoding_rs maps the UTF-16 flavors to UTF-8 on its encode side, so
  /// those are serialized directly here.
  fn encode(&self, text: &str) -> Result<Vec<u8>> {
    if self.encoding == UTF_16LE {
      Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    } else if self.encoding == UTF_16BE {
      Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
    } else {
      let (bytes, _, unmappable) = self.encoding.encode(text);
      if unmappable {
        bail!("content contains characters not representable in {}", self.name());
      }
      Ok(bytes.into_owned())
    }
  }

  fn bom_bytes(&self) -> &'static [u8] {
    if self.encoding == UTF_16LE {
      b"\xff\xfe"
    } else if self.encoding == UTF_16BE {
      b"\xfe\xff"
    } else if self.encoding == UTF_8 {
      b"\xef\xbb\xbf"
    } else {
      &[]
    }
  }
}

//! Records flowing into and out of a collection run.

use std::path::{Path, PathBuf};

/// One file handed to the collector by the host pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
  /// Location of the file; used for manifest detection and URI resolution.
  pub path: PathBuf,
  /// Raw contents, or `None` for placeholder entries that are passed through untouched.
  pub contents: Option<Vec<u8>>,
  pub(crate) modified: bool,
}

impl AssetFile {
  /// File with contents.
  pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
    Self {
      path: path.into(),
      contents: Some(contents.into()),
      modified: false,
    }
  }

  /// Placeholder without contents, such as a directory entry.
  pub fn empty(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      contents: None,
      modified: false,
    }
  }

  /// Path of the file.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns `true` for placeholder entries.
  pub fn is_null(&self) -> bool {
    self.contents.is_none()
  }

  /// Returns `true` when a run produced these contents instead of passing the input through.
  pub fn is_modified(&self) -> bool {
    self.modified
  }

  /// Contents as text; `None` for placeholders and for bytes that are not valid UTF-8.
  pub fn text(&self) -> Option<&str> {
    self
      .contents
      .as_deref()
      .and_then(|bytes| std::str::from_utf8(bytes).ok())
  }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
  /// Inputs recognised as manifests.
  pub manifests: usize,
  /// Distinct entries in the canonical mapping.
  pub entries: usize,
  /// Inputs queued for rewriting, placeholders included.
  pub pending: usize,
  /// Compiled substitutions.
  pub patterns: usize,
}

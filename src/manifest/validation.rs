//! Decide whether an input file is a revision manifest.

use std::path::Path;

use regex::Regex;
use serde_json::Value;

use crate::asset_paths::basename;
use crate::error::{CollectorError, CollectorResult};
use crate::options::CollectorOptions;

/// Validated `original → revisioned` pairs from one manifest file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionManifest {
  entries: Vec<(String, String)>,
}

impl RevisionManifest {
  /// Entries in the order they appeared in the file.
  pub fn entries(&self) -> &[(String, String)] {
    &self.entries
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` for a manifest without entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<(String, String)> for RevisionManifest {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

impl IntoIterator for RevisionManifest {
  type Item = (String, String);
  type IntoIter = std::vec::IntoIter<(String, String)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

/// Inspect one input and return its mapping when it is a revision manifest.
///
/// Only `.json` files are considered. Unparsable JSON is fatal, since guessing would either
/// drop a manifest or rewrite one as content. Anything that parses but fails the structural
/// check yields `Ok(None)` and should be treated as a file to rewrite.
pub fn read_manifest(
  path: &Path,
  contents: &[u8],
  options: &CollectorOptions,
  rev_suffix: &Regex,
) -> CollectorResult<Option<RevisionManifest>> {
  if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
    return Ok(None);
  }

  let value: Value = if contents.is_empty() {
    Value::Object(serde_json::Map::new())
  } else {
    serde_json::from_slice(contents).map_err(|source| CollectorError::MalformedManifest {
      path: path.to_path_buf(),
      source,
    })?
  };

  let Value::Object(object) = value else {
    return Ok(None);
  };

  let mut entries = Vec::with_capacity(object.len());
  for (key, value) in object {
    let Value::String(revisioned) = value else {
      return Ok(None);
    };
    if !is_revision_of(&key, &revisioned, options, rev_suffix) {
      return Ok(None);
    }
    entries.push((key, revisioned));
  }

  Ok(Some(RevisionManifest { entries }))
}

/// A value is a revision of its key when stripping the first suffix match from its basename
/// gives back the key's basename, directly or after extension remapping.
fn is_revision_of(
  key: &str,
  revisioned: &str,
  options: &CollectorOptions,
  rev_suffix: &Regex,
) -> bool {
  let clean = rev_suffix.replace(basename(revisioned), "");
  let original = basename(key);
  clean == original || clean == options.map_extname(original)
}

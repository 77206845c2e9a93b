//! Merge accepted manifests into a single mapping.

use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::validation::RevisionManifest;

/// One `original → revisioned` pair of the canonical mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  /// Project-relative path of the source asset.
  pub original: String,
  /// Path of the revisioned asset.
  pub revisioned: String,
}

/// Union of every accepted manifest.
///
/// Keys keep the position of their first insertion; a later manifest that repeats a key
/// overwrites only its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalMapping {
  entries: Vec<ManifestEntry>,
  index: BTreeMap<String, usize>,
}

impl CanonicalMapping {
  /// Create an empty mapping.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or overwrite one entry.
  pub fn insert(&mut self, original: String, revisioned: String) {
    match self.index.get(&original) {
      Some(&position) => self.entries[position].revisioned = revisioned,
      None => {
        self.index.insert(original.clone(), self.entries.len());
        self.entries.push(ManifestEntry {
          original,
          revisioned,
        });
      }
    }
  }

  /// Merge a validated manifest; its values win over existing ones.
  pub fn merge(&mut self, manifest: RevisionManifest) {
    for (original, revisioned) in manifest {
      self.insert(original, revisioned);
    }
  }

  /// Revisioned path recorded for `original`.
  pub fn get(&self, original: &str) -> Option<&str> {
    self
      .index
      .get(original)
      .map(|&position| self.entries[position].revisioned.as_str())
  }

  /// Entries in first-insertion order.
  pub fn entries(&self) -> &[ManifestEntry] {
    &self.entries
  }

  /// Number of distinct original paths.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no manifest contributed any entry.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Serialise as a tab-indented JSON object.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    self.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
  }
}

impl Serialize for CanonicalMapping {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for entry in &self.entries {
      map.serialize_entry(&entry.original, &entry.revisioned)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for CanonicalMapping {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut mapping = Self::new();
    for (original, value) in raw {
      let serde_json::Value::String(revisioned) = value else {
        return Err(serde::de::Error::custom(format!(
          "manifest value for `{original}` is not a string"
        )));
      };
      mapping.insert(original, revisioned);
    }
    Ok(mapping)
  }
}

impl FromIterator<(String, String)> for CanonicalMapping {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    let mut mapping = Self::new();
    for (original, revisioned) in iter {
      mapping.insert(original, revisioned);
    }
    mapping
  }
}

//! Configuration file loader for collection runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{CollectorError, CollectorResult};
use crate::options::{CollectorOptions, DEFAULT_EXT_MAP, DEFAULT_REV_SUFFIX, ReplacementStrategy};

/// File name searched for by [`CollectorConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "rev-collector.json";

/// Discoverable configuration mirroring [`CollectorOptions`].
///
/// Computed replacement strategies cannot be expressed in JSON, so directory replacements
/// loaded from a file are always literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
  /// Pattern describing the revision hash suffix.
  pub rev_suffix: String,
  /// Extension remapping, e.g. `".scss": ".css"`.
  pub ext_map: BTreeMap<String, String>,
  /// Directory URI references are resolved against.
  pub base_dir: PathBuf,
  /// Source directory to replacement directory, in file order.
  #[serde(deserialize_with = "ordered_rules")]
  pub dir_replacements: Vec<(String, String)>,
  /// Where to emit the aggregated manifest, if anywhere.
  pub collected_manifest: Option<PathBuf>,
  /// Also match references that already carry a revision suffix.
  pub replace_reved: bool,
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      rev_suffix: DEFAULT_REV_SUFFIX.into(),
      ext_map: DEFAULT_EXT_MAP
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect(),
      base_dir: PathBuf::from("."),
      dir_replacements: Vec::new(),
      collected_manifest: None,
      replace_reved: true,
    }
  }
}

impl CollectorConfig {
  /// Load `rev-collector.json` from `dir`, falling back to defaults when it does not exist.
  pub fn discover(dir: &Path) -> CollectorResult<Self> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Ok(Self::from_path(&candidate)?.unwrap_or_default())
  }

  /// Read configuration from a specific JSON file.
  ///
  /// A missing file yields `Ok(None)`; a file that exists but does not parse is an error,
  /// since silently falling back would change how references are rewritten.
  pub fn from_path(path: &Path) -> CollectorResult<Option<Self>> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
      Err(source) => {
        return Err(CollectorError::Io {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    serde_json::from_str(&content)
      .map(Some)
      .map_err(|source| CollectorError::Config {
        path: path.to_path_buf(),
        source,
      })
  }

  /// Convert the configuration into run options.
  pub fn into_options(self) -> CollectorOptions {
    CollectorOptions {
      rev_suffix: self.rev_suffix,
      ext_map: self.ext_map,
      base_dir: self.base_dir,
      dir_replacements: Vec::new(),
      collected_manifest: self.collected_manifest,
      replace_reved: self.replace_reved,
    }
    .with_literal_dir_replacements(self.dir_replacements)
  }
}

/// Read a JSON object of rules without losing the order its keys were written in.
fn ordered_rules<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Vec<(String, String)>, D::Error> {
  let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
  raw
    .into_iter()
    .map(|(source, target)| match target {
      serde_json::Value::String(target) => Ok((source, target)),
      _ => Err(serde::de::Error::custom(format!(
        "dir replacement for `{source}` is not a string"
      ))),
    })
    .collect()
}

impl CollectorOptions {
  fn with_literal_dir_replacements(self, rules: Vec<(String, String)>) -> Self {
    rules.into_iter().fold(self, |options, (source, target)| {
      options.with_dir_replacement(source, ReplacementStrategy::Literal(target))
    })
  }
}

//! Options steering manifest detection and reference rewriting.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::asset_paths::close_dir_by_sep;

/// Default pattern matching the hash suffix inserted by the revisioning step.
pub const DEFAULT_REV_SUFFIX: &str = "-[0-9a-f]{8,10}-?";

/// Source extensions that compile to a different output extension.
pub const DEFAULT_EXT_MAP: &[(&str, &str)] =
  &[(".scss", ".css"), (".less", ".css"), (".jsx", ".js")];

/// Computes the full replacement for a relocated asset from its revisioned path.
pub type ComputeReplacement = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How a directory replacement rule renders the relocated reference.
#[derive(Clone)]
pub enum ReplacementStrategy {
  /// Prefix the revisioned path with this directory.
  Literal(String),
  /// Derive the whole replacement from the revisioned path.
  Computed(ComputeReplacement),
}

impl ReplacementStrategy {
  /// Build a computed strategy from a closure.
  pub fn computed<F>(compute: F) -> Self
  where
    F: Fn(&str) -> String + Send + Sync + 'static,
  {
    Self::Computed(Arc::new(compute))
  }

  /// Produce the replacement text for one revisioned path.
  pub fn render(&self, revisioned: &str) -> String {
    match self {
      Self::Literal(dir) => format!("{}{}", close_dir_by_sep(dir), revisioned),
      Self::Computed(compute) => compute(revisioned),
    }
  }
}

impl fmt::Debug for ReplacementStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(dir) => f.debug_tuple("Literal").field(dir).finish(),
      Self::Computed(_) => f.write_str("Computed(..)"),
    }
  }
}

impl From<&str> for ReplacementStrategy {
  fn from(dir: &str) -> Self {
    Self::Literal(dir.to_string())
  }
}

impl From<String> for ReplacementStrategy {
  fn from(dir: String) -> Self {
    Self::Literal(dir)
  }
}

/// Relocates references found below `source_dir`.
#[derive(Debug, Clone)]
pub struct DirReplacement {
  /// Directory prefix matched in front of each asset reference.
  pub source_dir: String,
  /// Replacement applied to the matched prefix and asset path.
  pub strategy: ReplacementStrategy,
}

/// Full option set for a collection run.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
  /// Pattern describing the revision hash suffix in file names.
  pub rev_suffix: String,
  /// Extension remapping applied when comparing keys with revisioned values.
  pub ext_map: BTreeMap<String, String>,
  /// Directory URI references are resolved against; relative values are taken from the
  /// process working directory.
  pub base_dir: PathBuf,
  /// Optional relocation rules, applied in order.
  pub dir_replacements: Vec<DirReplacement>,
  /// When set, the aggregated manifest is emitted as an extra output at this path.
  pub collected_manifest: Option<PathBuf>,
  /// Also match references that already carry a revision suffix.
  pub replace_reved: bool,
}

impl Default for CollectorOptions {
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

impl CollectorOptions {
  /// Override the revision suffix pattern.
  pub fn with_rev_suffix(mut self, pattern: impl Into<String>) -> Self {
    self.rev_suffix = pattern.into();
    self
  }

  /// Add or replace one extension mapping.
  pub fn with_ext_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
    self.ext_map.insert(from.into(), to.into());
    self
  }

  /// Override the base directory for URI resolution.
  pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.base_dir = dir.into();
    self
  }

  /// Append a directory replacement rule.
  pub fn with_dir_replacement(
    mut self,
    source_dir: impl Into<String>,
    strategy: impl Into<ReplacementStrategy>,
  ) -> Self {
    self.dir_replacements.push(DirReplacement {
      source_dir: source_dir.into(),
      strategy: strategy.into(),
    });
    self
  }

  /// Emit the aggregated manifest at `path`.
  pub fn with_collected_manifest(mut self, path: impl Into<PathBuf>) -> Self {
    self.collected_manifest = Some(path.into());
    self
  }

  /// Toggle matching of already revisioned references.
  pub fn with_replace_reved(mut self, enabled: bool) -> Self {
    self.replace_reved = enabled;
    self
  }

  /// Apply the extension map to the final extension of `filename`.
  pub fn map_extname(&self, filename: &str) -> String {
    let ext = crate::asset_paths::extname(filename);
    match self.ext_map.get(ext) {
      Some(mapped) if !ext.is_empty() => {
        format!("{}{}", &filename[..filename.len() - ext.len()], mapped)
      }
      _ => filename.to_string(),
    }
  }
}

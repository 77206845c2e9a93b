//! Error types raised while collecting manifests and rewriting references.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that abort a collection run.
///
/// Inputs that merely look like manifests but fail validation are not errors; they are
/// rewritten like any other file.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
  /// A `.json` input could not be parsed, so the run cannot tell whether it is a manifest.
  #[error("malformed manifest {}: {source}", path.display())]
  MalformedManifest {
    /// Path of the offending input.
    path: PathBuf,
    /// Underlying JSON error.
    source: serde_json::Error,
  },

  /// The configured revision suffix is not a valid pattern.
  #[error("invalid revision suffix pattern `{pattern}`: {source}")]
  InvalidRevisionSuffix {
    /// Pattern text as configured.
    pattern: String,
    /// Underlying regex error.
    source: regex::Error,
  },

  /// A pattern compiled from a manifest entry was rejected by the regex engine.
  #[error("failed to compile pattern for manifest key `{key}`: {source}")]
  InvalidPattern {
    /// Manifest key the pattern was derived from.
    key: String,
    /// Underlying regex error.
    source: regex::Error,
  },

  /// The collected manifest snapshot could not be serialised.
  #[error("failed to serialise collected manifest: {0}")]
  Snapshot(#[source] serde_json::Error),

  /// A configuration file exists but could not be parsed.
  #[error("invalid configuration {}: {source}", path.display())]
  Config {
    /// Path of the configuration file.
    path: PathBuf,
    /// Underlying JSON error.
    source: serde_json::Error,
  },

  /// Reading an input or the process working directory failed.
  #[error("io error at {}: {source}", path.display())]
  Io {
    /// Path involved in the failed operation.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
}

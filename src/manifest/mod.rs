//! Manifest detection and aggregation.

mod aggregate;
mod validation;

pub use aggregate::{CanonicalMapping, ManifestEntry};
pub use validation::{RevisionManifest, read_manifest};

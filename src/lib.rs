#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod collector;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod options;
pub mod pattern;
pub mod rewrite;
pub mod uri;

pub use collector::RevCollector;
pub use config::CollectorConfig;
pub use error::{CollectorError, CollectorResult};
pub use manifest::CanonicalMapping;
pub use models::{AssetFile, CollectionSummary};
pub use options::{CollectorOptions, DirReplacement, ReplacementStrategy};
pub use uri::{FileSystem, PathOracle};

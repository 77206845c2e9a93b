//! `rev-collector` — rewrite asset references to their revisioned filenames.
//!
//! # Usage
//!
//! ```text
//! rev-collector build/rev-manifest.json build/         # rewrite build/ in place
//! rev-collector build/ --out-dir dist                   # write results below dist/
//! rev-collector build/ --dir-replacement src=/static    # relocate src/ references
//! rev-collector build/ --collected-manifest rev.json    # also emit the merged manifest
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rev_collector::{AssetFile, CollectorConfig, ReplacementStrategy, RevCollector};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
  name = "rev-collector",
  version,
  about = "Point asset references at their revisioned filenames"
)]
struct Cli {
  /// Manifests and files to rewrite; directories are walked recursively.
  #[arg(required = true)]
  inputs: Vec<PathBuf>,

  /// Configuration file (defaults to `rev-collector.json` in the working directory).
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory URI references are resolved against.
  #[arg(short, long)]
  base_dir: Option<PathBuf>,

  /// Pattern describing the revision hash suffix.
  #[arg(long)]
  rev_suffix: Option<String>,

  /// Also write the merged manifest to this path.
  #[arg(long)]
  collected_manifest: Option<PathBuf>,

  /// Relocate references below SRC to DST. Can be given multiple times.
  #[arg(long = "dir-replacement", value_name = "SRC=DST", value_parser = parse_dir_replacement)]
  dir_replacements: Vec<(String, String)>,

  /// Only rewrite references to unrevisioned paths.
  #[arg(long)]
  no_replace_reved: bool,

  /// Write results below this directory instead of rewriting inputs in place.
  #[arg(short, long)]
  out_dir: Option<PathBuf>,

  /// Log level used when `RUST_LOG` is not set.
  #[arg(long, default_value = "warn")]
  log_level: String,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_tracing(&cli.log_level);

  let working_dir = std::env::current_dir().context("failed to read working directory")?;
  let config = match &cli.config {
    Some(path) => CollectorConfig::from_path(path)?
      .ok_or_else(|| anyhow!("config file not found at {}", path.display()))?,
    None => CollectorConfig::discover(&working_dir)?,
  };

  // CLI args override config file values.
  let mut options = config.into_options();
  if let Some(dir) = cli.base_dir {
    options.base_dir = dir;
  }
  if let Some(pattern) = cli.rev_suffix {
    options.rev_suffix = pattern;
  }
  if let Some(path) = cli.collected_manifest {
    options.collected_manifest = Some(path);
  }
  if cli.no_replace_reved {
    options.replace_reved = false;
  }
  for (source, target) in cli.dir_replacements {
    options = options.with_dir_replacement(source, ReplacementStrategy::Literal(target));
  }

  let mut collector = RevCollector::new(options)?;
  debug!(base_dir = %collector.base_dir().display(), "resolving references");
  for input in &cli.inputs {
    for path in collect_input_files(input)? {
      let contents =
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
      collector.push(AssetFile::new(path, contents))?;
    }
  }

  let (files, summary) = collector.finish_with_summary()?;
  let mut written = 0;
  for file in &files {
    if write_output(file, cli.out_dir.as_deref())? {
      written += 1;
    }
  }

  info!(
    manifests = summary.manifests,
    entries = summary.entries,
    written,
    "done"
  );
  Ok(())
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the CLI value.
fn setup_tracing(level: &str) {
  use tracing_subscriber::EnvFilter;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn parse_dir_replacement(value: &str) -> Result<(String, String), String> {
  let (source, target) = value
    .split_once('=')
    .ok_or_else(|| format!("expected SRC=DST, got `{value}`"))?;
  Ok((source.to_string(), target.to_string()))
}

/// Expand an input into the files below it, skipping hidden entries, in sorted order.
fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>> {
  if !input.is_dir() {
    return Ok(vec![input.to_path_buf()]);
  }

  let mut files = Vec::new();
  let mut entries: Vec<_> = fs::read_dir(input)
    .with_context(|| format!("failed to read directory {}", input.display()))?
    .collect::<std::io::Result<_>>()
    .with_context(|| format!("failed to list {}", input.display()))?;
  entries.sort_by_key(|entry| entry.file_name());

  for entry in entries {
    if entry.file_name().to_string_lossy().starts_with('.') {
      continue;
    }
    let path = entry.path();
    if entry.file_type()?.is_dir() {
      files.extend(collect_input_files(&path)?);
    } else {
      files.push(path);
    }
  }
  Ok(files)
}

/// Write one output file, returning whether anything was written.
///
/// In-place runs only touch files whose contents changed; with an output directory every
/// file with contents is copied so the tree is complete.
fn write_output(file: &AssetFile, out_dir: Option<&Path>) -> Result<bool> {
  let Some(contents) = &file.contents else {
    return Ok(false);
  };

  let destination = match out_dir {
    Some(root) => root.join(strip_to_relative(file.path())),
    None if file.is_modified() => file.path().to_path_buf(),
    None => {
      debug!(path = %file.path().display(), "unchanged, not rewritten");
      return Ok(false);
    }
  };
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(&destination, contents)
    .with_context(|| format!("failed to write {}", destination.display()))?;
  debug!(path = %destination.display(), "wrote output");
  Ok(true)
}

/// Drop root and prefix components so absolute inputs land inside the output directory.
fn strip_to_relative(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|component| matches!(component, std::path::Component::Normal(_)))
    .collect()
}

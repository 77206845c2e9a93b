//! Two-phase collection run: classify inputs, then rewrite every pending file.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::asset_paths::normalize_lexically;
use crate::error::{CollectorError, CollectorResult};
use crate::manifest::{CanonicalMapping, read_manifest};
use crate::models::{AssetFile, CollectionSummary};
use crate::options::CollectorOptions;
use crate::pattern::compile_patterns;
use crate::rewrite::ContentRewriter;
use crate::uri::{FileSystem, PathOracle, UriNormalizer};

/// Accumulates manifests and pending files, then rewrites references once all inputs are in.
///
/// Pattern compilation needs the complete mapping, so every pending file is buffered until
/// [`RevCollector::finish`] is called.
pub struct RevCollector<P: PathOracle = FileSystem> {
  options: CollectorOptions,
  rev_suffix: Regex,
  working_dir: PathBuf,
  base_dir: PathBuf,
  oracle: P,
  mapping: CanonicalMapping,
  pending: Vec<AssetFile>,
  manifests: usize,
}

impl RevCollector<FileSystem> {
  /// Create a collector that resolves URI references against the real filesystem.
  pub fn new(options: CollectorOptions) -> CollectorResult<Self> {
    Self::with_oracle(options, FileSystem)
  }
}

impl<P: PathOracle> RevCollector<P> {
  /// Create a collector probing paths through `oracle`, relative to the process working
  /// directory.
  pub fn with_oracle(options: CollectorOptions, oracle: P) -> CollectorResult<Self> {
    let working_dir = std::env::current_dir().map_err(|source| CollectorError::Io {
      path: PathBuf::from("."),
      source,
    })?;
    Self::with_working_dir(options, oracle, working_dir)
  }

  /// Create a collector that treats relative paths as relative to `working_dir`.
  pub fn with_working_dir(
    options: CollectorOptions,
    oracle: P,
    working_dir: impl Into<PathBuf>,
  ) -> CollectorResult<Self> {
    let rev_suffix =
      Regex::new(&options.rev_suffix).map_err(|source| CollectorError::InvalidRevisionSuffix {
        pattern: options.rev_suffix.clone(),
        source,
      })?;
    let working_dir = working_dir.into();
    let base_dir = normalize_lexically(&working_dir.join(&options.base_dir));

    Ok(Self {
      options,
      rev_suffix,
      working_dir,
      base_dir,
      oracle,
      mapping: CanonicalMapping::new(),
      pending: Vec::new(),
      manifests: 0,
    })
  }

  /// Absolute directory URI references are resolved against.
  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  /// Mapping aggregated from the manifests seen so far.
  pub fn mapping(&self) -> &CanonicalMapping {
    &self.mapping
  }

  /// Classify one input: manifests are merged, everything else is queued for rewriting.
  ///
  /// Fails only when a `.json` input cannot be parsed.
  pub fn push(&mut self, file: AssetFile) -> CollectorResult<()> {
    let Some(contents) = file.contents.as_deref() else {
      debug!(path = %file.path().display(), "queued placeholder");
      self.pending.push(file);
      return Ok(());
    };

    match read_manifest(file.path(), contents, &self.options, &self.rev_suffix)? {
      Some(manifest) => {
        debug!(path = %file.path().display(), entries = manifest.len(), "merged manifest");
        self.manifests += 1;
        self.mapping.merge(manifest);
      }
      None => {
        debug!(path = %file.path().display(), "queued for rewriting");
        self.pending.push(file);
      }
    }
    Ok(())
  }

  /// Push every input and finish the run.
  pub fn collect<I>(mut self, files: I) -> CollectorResult<Vec<AssetFile>>
  where
    I: IntoIterator<Item = AssetFile>,
  {
    for file in files {
      self.push(file)?;
    }
    self.finish()
  }

  /// Rewrite all pending files and release them.
  pub fn finish(self) -> CollectorResult<Vec<AssetFile>> {
    self.finish_with_summary().map(|(files, _)| files)
  }

  /// Like [`RevCollector::finish`], also reporting what the run did.
  ///
  /// The collected manifest, when configured, comes first; pending files follow in arrival
  /// order.
  pub fn finish_with_summary(self) -> CollectorResult<(Vec<AssetFile>, CollectionSummary)> {
    let rewriter = ContentRewriter::new(compile_patterns(&self.mapping, &self.options)?);
    let normalizer = UriNormalizer::new(&self.base_dir, &self.oracle);

    let summary = CollectionSummary {
      manifests: self.manifests,
      entries: self.mapping.len(),
      pending: self.pending.len(),
      patterns: rewriter.len(),
    };

    let mut output = Vec::with_capacity(self.pending.len() + 1);
    if let Some(path) = &self.options.collected_manifest {
      let json = self
        .mapping
        .to_json_pretty()
        .map_err(CollectorError::Snapshot)?;
      let mut snapshot = AssetFile::new(path.clone(), json);
      snapshot.modified = true;
      output.push(snapshot);
    }

    for mut file in self.pending {
      let absolute = normalize_lexically(&self.working_dir.join(file.path()));
      let file_dir = absolute.parent().unwrap_or(self.base_dir.as_path());
      let rewritten = match file.contents.as_deref().map(std::str::from_utf8) {
        None => None,
        Some(Err(_)) => {
          debug!(path = %file.path().display(), "passing through non-UTF-8 contents");
          None
        }
        Some(Ok(text)) => {
          let rewritten = rewriter.rewrite(&normalizer.normalize(text, file_dir));
          (rewritten != text).then_some(rewritten)
        }
      };
      if let Some(rewritten) = rewritten {
        file.contents = Some(rewritten.into_bytes());
        file.modified = true;
      }
      output.push(file);
    }

    info!(
      manifests = summary.manifests,
      entries = summary.entries,
      pending = summary.pending,
      patterns = summary.patterns,
      "rewrote asset references"
    );
    Ok((output, summary))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;
  use std::fs;
  use tempfile::tempdir;

  const WORKDIR: &str = "/project";

  fn collector(options: CollectorOptions) -> RevCollector<BTreeSet<PathBuf>> {
    RevCollector::with_working_dir(options, BTreeSet::new(), WORKDIR).unwrap()
  }

  fn run(options: CollectorOptions, files: Vec<AssetFile>) -> Vec<AssetFile> {
    collector(options).collect(files).unwrap()
  }

  fn text(file: &AssetFile) -> String {
    file.text().map(str::to_string).unwrap_or_default()
  }

  #[test]
  fn merges_manifests_in_arrival_order() {
    let mut collector = collector(CollectorOptions::default());
    collector
      .push(AssetFile::new(
        "one.json",
        r#"{"a.css": "a-11111111.css", "b.js": "b-22222222.js"}"#,
      ))
      .unwrap();
    collector
      .push(AssetFile::new(
        "two.json",
        r#"{"a.css": "a-33333333.css", "c.png": "c-44444444.png"}"#,
      ))
      .unwrap();

    let mapping = collector.mapping();
    assert_eq!(mapping.len(), 3);
    assert_eq!(mapping.get("a.css"), Some("a-33333333.css"));
    assert_eq!(mapping.get("b.js"), Some("b-22222222.js"));
    assert_eq!(mapping.get("c.png"), Some("c-44444444.png"));
  }

  #[test]
  fn non_manifest_json_is_rewritten_instead_of_merged() {
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new("rev.json", r#"{"app.css": "app-a1b2c3d4.css"}"#),
      AssetFile::new("config.json", r#"{"theme": "/app.css", "version": "1.0"}"#),
    ]);

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].path, PathBuf::from("config.json"));
    assert_eq!(
      text(&output[0]),
      r#"{"theme": "/app-a1b2c3d4.css", "version": "1.0"}"#
    );
  }

  #[test]
  fn rewrites_reference_without_touching_longer_names() {
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new("rev-manifest.json", r#"{"css/app.css": "css/app-a1b2c3d4.css"}"#),
      AssetFile::new(
        "index.html",
        "<link href=\"css/app.css\">\n<a href=\"css/app.css.bak\">backup</a>",
      ),
    ]);

    let html = text(&output[0]);
    assert!(html.contains(r#"<link href="css/app-a1b2c3d4.css">"#));
    assert!(html.contains(r#"<a href="css/app.css.bak">"#));
  }

  #[test]
  fn source_maps_are_rewritten_before_their_scripts() {
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new(
        "rev.json",
        r#"{"script.js": "script-abc12345.js", "script.js.map": "script-abc12345.js.map"}"#,
      ),
      AssetFile::new(
        "page.html",
        r#"<script src="script.js"></script><link rel="map" href="script.js.map">"#,
      ),
    ]);

    let html = text(&output[0]);
    assert!(html.contains(r#"src="script-abc12345.js""#));
    assert!(html.contains(r#"href="script-abc12345.js.map""#));
    assert!(!html.contains(".map.map"));
  }

  #[test]
  fn second_run_over_output_changes_nothing() {
    let manifest = r#"{
      "css/app.css": "css/app-a1b2c3d4.css",
      "js/app.jsx": "js/app-0a1b2c3d.js",
      "logo.png": "img/logo-a1b2c3d4.png"
    }"#;
    let page = r#"<link href="css/app.css"><script src="js/app.jsx"></script><img src="logo.png">"#;

    let first = run(CollectorOptions::default(), vec![
      AssetFile::new("rev.json", manifest),
      AssetFile::new("index.html", page),
    ]);
    let second = run(CollectorOptions::default(), vec![
      AssetFile::new("rev.json", manifest),
      AssetFile::new("index.html", text(&first[0])),
    ]);

    assert_eq!(
      text(&first[0]),
      concat!(
        r#"<link href="css/app-a1b2c3d4.css"><script src="js/app-0a1b2c3d.js"></script>"#,
        r#"<img src="img/logo-a1b2c3d4.png">"#
      )
    );
    assert!(first[0].is_modified());
    assert_eq!(second[0].contents, first[0].contents);
    assert!(!second[0].is_modified());
  }

  #[test]
  fn directory_rules_relocate_matching_references_only() {
    let options = CollectorOptions::default().with_dir_replacement("src/", "dist/");
    let output = run(options, vec![
      AssetFile::new("rev.json", r#"{"app.css": "app-a1b2c3d4.css"}"#),
      AssetFile::new(
        "index.html",
        r#"<link href="src/app.css"><link href="vendor/app.css">"#,
      ),
    ]);

    assert_eq!(
      text(&output[0]),
      r#"<link href="dist/app-a1b2c3d4.css"><link href="vendor/app.css">"#
    );
  }

  #[test]
  fn placeholders_pass_through_in_arrival_order() {
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new("a.html", "'app.css'"),
      AssetFile::empty("assets"),
      AssetFile::new("rev.json", r#"{"app.css": "app-a1b2c3d4.css"}"#),
      AssetFile::new("b.html", "\"app.css\""),
    ]);

    let paths: Vec<_> = output.iter().map(|file| file.path.clone()).collect();
    assert_eq!(paths, vec![
      PathBuf::from("a.html"),
      PathBuf::from("assets"),
      PathBuf::from("b.html"),
    ]);
    assert!(output[1].is_null());
    assert_eq!(text(&output[0]), "'app-a1b2c3d4.css'");
  }

  #[test]
  fn binary_contents_pass_through_byte_for_byte() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0xfe, 0x00, 0x80];
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new("rev.json", r#"{"app.css": "app-a1b2c3d4.css"}"#),
      AssetFile::new("img/logo.png", png.clone()),
    ]);

    assert_eq!(output[0].contents.as_deref(), Some(png.as_slice()));
    assert!(!output[0].is_modified());
  }

  #[test]
  fn unmatched_text_passes_through_unchanged() {
    let page = "<p>caf\u{e9} \u{2014} no assets here</p>\r\n<a href=\"/other.css\">";
    let output = run(CollectorOptions::default(), vec![
      AssetFile::new("rev.json", r#"{"app.css": "app-a1b2c3d4.css"}"#),
      AssetFile::new("index.html", page),
    ]);

    assert_eq!(output[0].contents.as_deref(), Some(page.as_bytes()));
    assert!(!output[0].is_modified());
  }

  #[test]
  fn malformed_manifest_aborts_the_run() {
    let result = collector(CollectorOptions::default()).collect(vec![
      AssetFile::new("index.html", "<p>ok</p>"),
      AssetFile::new("rev.json", "{\"app.css\": "),
    ]);
    match result {
      Err(CollectorError::MalformedManifest { path, .. }) => {
        assert_eq!(path, PathBuf::from("rev.json"))
      }
      other => panic!("expected malformed manifest error, got {other:?}"),
    }
  }

  #[test]
  fn invalid_revision_suffix_is_rejected_up_front() {
    let options = CollectorOptions::default().with_rev_suffix("-[0-9a-f");
    let result = RevCollector::with_working_dir(options, BTreeSet::<PathBuf>::new(), WORKDIR);
    assert!(matches!(result, Err(CollectorError::InvalidRevisionSuffix { .. })));
  }

  #[test]
  fn collected_manifest_is_emitted_first_and_round_trips() {
    let options = CollectorOptions::default().with_collected_manifest("rev/collected.json");
    let mut collector = collector(options);
    for file in [
      AssetFile::new("a.json", r#"{"a.css": "a-11111111.css"}"#),
      AssetFile::new("b.json", r#"{"b.js": "b-22222222.js", "a.css": "a-33333333.css"}"#),
      AssetFile::new("index.html", "<p></p>"),
    ] {
      collector.push(file).unwrap();
    }
    let (output, summary) = collector.finish_with_summary().unwrap();

    assert_eq!(summary.manifests, 2);
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.pending, 1);
    assert_eq!(output.len(), 2);
    assert_eq!(output[0].path, PathBuf::from("rev/collected.json"));

    let snapshot = text(&output[0]);
    assert!(snapshot.starts_with("{\n\t\""));
    let parsed: CanonicalMapping = serde_json::from_str(&snapshot).unwrap();
    let expected: CanonicalMapping = [
      ("a.css".to_string(), "a-33333333.css".to_string()),
      ("b.js".to_string(), "b-22222222.js".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(parsed, expected);
  }

  #[test]
  fn resolves_relative_references_on_disk_before_rewriting() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("img")).unwrap();
    fs::create_dir_all(root.join("pages")).unwrap();
    fs::write(root.join("img/logo.png"), b"png").unwrap();

    let options = CollectorOptions::default().with_base_dir(root);
    let output = RevCollector::new(options)
      .unwrap()
      .collect(vec![
        AssetFile::new(
          root.join("rev.json"),
          r#"{"img/logo.png": "img/logo-a1b2c3d4.png"}"#,
        ),
        AssetFile::new(
          root.join("pages/about.html"),
          "<img src=\"../img/logo.png\">\n<img src=\"../img/missing.png\">",
        ),
      ])
      .unwrap();

    assert_eq!(
      text(&output[0]),
      "<img src=\"/img/logo-a1b2c3d4.png\">\n<img src=\"../img/missing.png\">"
    );
  }

  #[test]
  fn missing_relative_reference_is_left_unmodified() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pages")).unwrap();

    let options = CollectorOptions::default().with_base_dir(root);
    let page = r#"<img src="../img/logo.png">"#;
    let output = RevCollector::new(options)
      .unwrap()
      .collect(vec![AssetFile::new(root.join("pages/index.html"), page)])
      .unwrap();

    assert_eq!(text(&output[0]), page);
  }
}

//! Normalise filesystem-resolvable URI references to root-relative form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::asset_paths::{generate_uri_candidates, should_skip_uri, to_root_relative};

/// Answers whether a path exists, so resolution can run against a real or simulated tree.
pub trait PathOracle {
  /// Returns `true` when `path` names an existing file or directory.
  fn exists(&self, path: &Path) -> bool;
}

/// Oracle backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl PathOracle for FileSystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }
}

impl PathOracle for BTreeSet<PathBuf> {
  fn exists(&self, path: &Path) -> bool {
    self.contains(path)
  }
}

impl<P: PathOracle + ?Sized> PathOracle for &P {
  fn exists(&self, path: &Path) -> bool {
    (**self).exists(path)
  }
}

/// Reference extractors: the regex, and how many bytes to trim from each end of a match.
///
/// The scans are greedy and line-bound rather than markup aware; two attributes on one line
/// extract as a single reference that will usually fail to resolve.
fn reference_extractors() -> &'static [(Regex, usize, usize)] {
  static EXTRACTORS: OnceLock<Vec<(Regex, usize, usize)>> = OnceLock::new();
  EXTRACTORS
    .get_or_init(|| {
      vec![
        (Regex::new(r#"href=["'].+["']"#).expect("invalid href regex"), 6, 1),
        (Regex::new(r#"src=["'].+["']"#).expect("invalid src regex"), 5, 1),
        (Regex::new(r#"url\(["'].+["']\)"#).expect("invalid url() regex"), 5, 2),
      ]
    })
    .as_slice()
}

/// Extract `href="…"`, `src="…"` and `url("…")` references in scan order, without duplicates.
pub fn extract_references(content: &str) -> Vec<&str> {
  let mut seen = BTreeSet::new();
  let mut references = Vec::new();
  for (pattern, head, tail) in reference_extractors() {
    for found in pattern.find_iter(content) {
      let text = found.as_str();
      let uri = &text[*head..text.len() - tail];
      if seen.insert(uri) {
        references.push(uri);
      }
    }
  }
  references
}

/// Rewrites references that resolve on disk to `/`-rooted paths below the base directory.
#[derive(Debug, Clone)]
pub struct UriNormalizer<'a, P: PathOracle> {
  base_dir: &'a Path,
  oracle: &'a P,
}

impl<'a, P: PathOracle> UriNormalizer<'a, P> {
  /// Create a normaliser resolving against an absolute `base_dir`.
  pub fn new(base_dir: &'a Path, oracle: &'a P) -> Self {
    Self { base_dir, oracle }
  }

  /// Root-relative form of `uri` when one of its candidate locations exists.
  pub fn resolve(&self, uri: &str, file_dir: &Path) -> Option<String> {
    if should_skip_uri(uri) {
      return None;
    }

    let found = generate_uri_candidates(uri, file_dir, self.base_dir)
      .into_iter()
      .find(|candidate| self.oracle.exists(candidate))?;
    let relative = found.strip_prefix(self.base_dir).ok()?;
    Some(to_root_relative(relative))
  }

  /// Rewrite the first occurrence of each resolvable reference in `content`.
  pub fn normalize(&self, content: &str, file_dir: &Path) -> String {
    let replacements: Vec<(String, String)> = extract_references(content)
      .into_iter()
      .filter_map(|uri| {
        self
          .resolve(uri, file_dir)
          .map(|resolved| (uri.to_string(), resolved))
      })
      .collect();

    let mut output = content.to_string();
    for (uri, resolved) in replacements {
      debug!(%uri, %resolved, "normalised reference");
      output = output.replacen(&uri, &resolved, 1);
    }
    output
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE: &str = "/project";
  const PAGE_DIR: &str = "/project/pages/blog";

  fn tree(paths: &[&str]) -> BTreeSet<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
  }

  #[test]
  fn extracts_each_reference_kind() {
    let content = "<a href=\"one.html\">\n<img src='two.png'>\nbody { background: url(\"three.jpg\") }";
    assert_eq!(extract_references(content), vec!["one.html", "two.png", "three.jpg"]);
  }

  #[test]
  fn extraction_is_greedy_within_a_line() {
    let content = r#"<link href="a.css" rel="stylesheet">"#;
    assert_eq!(extract_references(content), vec![r#"a.css" rel="stylesheet"#]);
  }

  #[test]
  fn unquoted_url_is_not_extracted() {
    assert!(extract_references("background: url(img/bg.png)").is_empty());
  }

  #[test]
  fn resolves_parent_references_next_to_the_file() {
    let oracle = tree(&["/project/pages/img/logo.png"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    assert_eq!(
      normalizer.resolve("../img/logo.png", Path::new(PAGE_DIR)),
      Some("/pages/img/logo.png".to_string())
    );
  }

  #[test]
  fn missing_parent_reference_is_left_unmodified() {
    let oracle = tree(&["/project/img/logo.png"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    let content = r#"<img src="../img/logo.png">"#;
    assert_eq!(normalizer.normalize(content, Path::new(PAGE_DIR)), content);
  }

  #[test]
  fn undotted_references_resolve_against_base() {
    let oracle = tree(&["/project/css/app.css"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    assert_eq!(
      normalizer.normalize(r#"<link href='css/app.css'>"#, Path::new(PAGE_DIR)),
      r#"<link href='/css/app.css'>"#
    );
  }

  #[test]
  fn dotted_references_fall_back_to_base() {
    let oracle = tree(&["/project/js/app.js"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    assert_eq!(
      normalizer.resolve("./js/app.js", Path::new(PAGE_DIR)),
      Some("/js/app.js".to_string())
    );

    let local = tree(&["/project/pages/blog/js/app.js", "/project/js/app.js"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &local);
    assert_eq!(
      normalizer.resolve("./js/app.js", Path::new(PAGE_DIR)),
      Some("/pages/blog/js/app.js".to_string())
    );
  }

  #[test]
  fn references_outside_the_base_are_left_alone() {
    let oracle = tree(&["/shared/app.css"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    assert_eq!(normalizer.resolve("../../../shared/app.css", Path::new(PAGE_DIR)), None);
  }

  #[test]
  fn external_references_never_touch_the_oracle() {
    struct Panicking;
    impl PathOracle for Panicking {
      fn exists(&self, path: &Path) -> bool {
        panic!("unexpected probe for {}", path.display());
      }
    }

    let normalizer = UriNormalizer::new(Path::new(BASE), &Panicking);
    let content = r#"<script src="https://cdn.example.com/lib.js"></script>"#;
    assert_eq!(normalizer.normalize(content, Path::new(PAGE_DIR)), content);
  }

  #[test]
  fn only_the_first_occurrence_is_rewritten() {
    let oracle = tree(&["/project/css/app.css"]);
    let normalizer = UriNormalizer::new(Path::new(BASE), &oracle);
    let content = "<link href=\"css/app.css\">\n<!-- css/app.css -->";
    assert_eq!(
      normalizer.normalize(content, Path::new(BASE)),
      "<link href=\"/css/app.css\">\n<!-- css/app.css -->"
    );
  }
}

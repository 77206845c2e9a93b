//! Apply compiled patterns to pending file contents.

use crate::pattern::CompiledPattern;

/// Ordered substitution pipeline shared by every pending file of a run.
#[derive(Debug, Clone, Default)]
pub struct ContentRewriter {
  patterns: Vec<CompiledPattern>,
}

impl ContentRewriter {
  /// Order `patterns` longest first.
  ///
  /// `script.js.map` has to be rewritten before `script.js`, otherwise the shorter pattern
  /// consumes the prefix of the longer reference. The sort is stable, so equally long
  /// patterns keep their compilation order.
  pub fn new(mut patterns: Vec<CompiledPattern>) -> Self {
    patterns.sort_by(|a, b| b.match_length().cmp(&a.match_length()));
    Self { patterns }
  }

  /// Build a rewriter that applies `patterns` exactly in the given order.
  pub fn in_order(patterns: Vec<CompiledPattern>) -> Self {
    Self { patterns }
  }

  /// Patterns in application order.
  pub fn patterns(&self) -> &[CompiledPattern] {
    &self.patterns
  }

  /// Number of patterns.
  pub fn len(&self) -> usize {
    self.patterns.len()
  }

  /// Returns `true` when there is nothing to substitute.
  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  /// Run every pattern over `text`; each pass sees the output of the previous one.
  pub fn rewrite(&self, text: &str) -> String {
    self
      .patterns
      .iter()
      .fold(text.to_string(), |current, pattern| pattern.apply(&current))
  }
}

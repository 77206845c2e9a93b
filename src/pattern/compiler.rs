//! Build the substitutions for every canonical mapping entry.

use regex::Regex;
use tracing::{debug, warn};

use super::delimiter::PrefixDelimiters;
use crate::asset_paths::{basename, close_dir_by_sep, dirname, escape_path_pattern, extname};
use crate::error::{CollectorError, CollectorResult};
use crate::manifest::CanonicalMapping;
use crate::options::CollectorOptions;

/// What a successful match is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Replacement {
  /// Keep the captured prefix delimiter and append the text.
  AfterDelimiter(String),
  /// Replace the whole match, directory prefix included.
  Whole(String),
}

impl Replacement {
  fn text(&self) -> &str {
    match self {
      Self::AfterDelimiter(text) | Self::Whole(text) => text,
    }
  }
}

/// One compiled substitution.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
  regex: Regex,
  match_length: usize,
  replacement: Replacement,
}

impl CompiledPattern {
  fn delimited(key: &str, pattern: &str, revisioned: &str) -> CollectorResult<Self> {
    let delimiters = PrefixDelimiters::for_pattern(pattern);
    let expression = format!("{}{}", delimiters.to_capture_group(), pattern);
    Ok(Self {
      regex: build_regex(key, &expression)?,
      match_length: pattern.chars().count(),
      replacement: Replacement::AfterDelimiter(revisioned.to_string()),
    })
  }

  fn relocated(
    key: &str,
    dir_pattern: &str,
    pattern: &str,
    replacement: String,
  ) -> CollectorResult<Self> {
    let expression = format!("{dir_pattern}{pattern}");
    Ok(Self {
      match_length: expression.chars().count(),
      regex: build_regex(key, &expression)?,
      replacement: Replacement::Whole(replacement),
    })
  }

  /// Length used to order substitutions, longest first.
  pub fn match_length(&self) -> usize {
    self.match_length
  }

  /// Full expression text handed to the regex engine.
  pub fn as_str(&self) -> &str {
    self.regex.as_str()
  }

  /// Replace every non-overlapping occurrence in `text`.
  ///
  /// A match directly followed by more file name characters (`app.css` inside
  /// `app.css.bak`) names a different file and is left alone. So is a match that completes
  /// an occurrence of the replacement itself, e.g. `/logo-a1b2c3d4.png` inside an earlier
  /// `img/logo-a1b2c3d4.png`.
  pub fn apply(&self, text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for captures in self.regex.captures_iter(text) {
      let Some(whole) = captures.get(0) else {
        continue;
      };
      if continues_file_name(&text[whole.end()..])
        || text[..whole.end()].ends_with(self.replacement.text())
      {
        continue;
      }

      output.push_str(&text[last..whole.start()]);
      match &self.replacement {
        Replacement::AfterDelimiter(revisioned) => {
          if let Some(delimiter) = captures.get(1) {
            output.push_str(delimiter.as_str());
          }
          output.push_str(revisioned);
        }
        Replacement::Whole(replacement) => output.push_str(replacement),
      }
      last = whole.end();
    }
    output.push_str(&text[last..]);
    output
  }
}

fn build_regex(key: &str, expression: &str) -> CollectorResult<Regex> {
  Regex::new(expression).map_err(|source| CollectorError::InvalidPattern {
    key: key.to_string(),
    source,
  })
}

fn is_file_name_char(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn continues_file_name(rest: &str) -> bool {
  let mut chars = rest.chars();
  match chars.next() {
    Some('.') => chars.next().is_some_and(is_file_name_char),
    Some(ch) => is_file_name_char(ch),
    None => false,
  }
}

/// Pattern matching `key` whether or not its name segments already carry a revision suffix.
///
/// The directory part is matched literally, every dot-separated segment of the stem accepts
/// an optional suffix, and a remappable extension matches both its source and output form.
pub fn revisioned_pattern(key: &str, options: &CollectorOptions) -> String {
  let ext = extname(key);
  let ext_pattern = match options.ext_map.get(ext) {
    Some(mapped) if !ext.is_empty() => format!(
      "({}|{})",
      escape_path_pattern(ext),
      escape_path_pattern(mapped)
    ),
    _ => escape_path_pattern(ext),
  };

  let dir = dirname(key);
  let dir_pattern = if dir == "." {
    String::new()
  } else {
    escape_path_pattern(&close_dir_by_sep(dir))
  };

  let name = basename(key);
  let stem = &name[..name.len() - ext.len()];
  let stem_pattern = stem
    .split('.')
    .map(|part| format!("{}({})?", escape_path_pattern(part), options.rev_suffix))
    .collect::<Vec<_>>()
    .join(r"\.");

  format!("{dir_pattern}{stem_pattern}{ext_pattern}")
}

/// Compile every mapping entry into its substitutions, in mapping order.
pub fn compile_patterns(
  mapping: &CanonicalMapping,
  options: &CollectorOptions,
) -> CollectorResult<Vec<CompiledPattern>> {
  let dir_rules: Vec<_> = options
    .dir_replacements
    .iter()
    .map(|rule| {
      (
        escape_path_pattern(&close_dir_by_sep(&rule.source_dir)),
        &rule.strategy,
      )
    })
    .collect();

  let mut compiled = Vec::new();
  for entry in mapping.entries() {
    if entry.original.is_empty() {
      warn!(revisioned = %entry.revisioned, "skipping manifest entry with an empty key");
      continue;
    }

    let mut patterns = vec![escape_path_pattern(&entry.original)];
    if options.replace_reved {
      patterns.push(revisioned_pattern(&entry.original, options));
    }

    if dir_rules.is_empty() {
      for pattern in &patterns {
        compiled.push(CompiledPattern::delimited(
          &entry.original,
          pattern,
          &entry.revisioned,
        )?);
      }
    } else {
      for (dir_pattern, strategy) in &dir_rules {
        let replacement = strategy.render(&entry.revisioned);
        for pattern in &patterns {
          compiled.push(CompiledPattern::relocated(
            &entry.original,
            dir_pattern,
            pattern,
            replacement.clone(),
          )?);
        }
      }
    }
  }

  debug!(
    entries = mapping.len(),
    patterns = compiled.len(),
    "compiled manifest patterns"
  );
  Ok(compiled)
}

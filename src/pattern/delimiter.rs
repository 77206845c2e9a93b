//! Boundary characters allowed in front of an undirected asset reference.

/// Characters that may directly precede a reference when no directory rules are configured.
///
/// A reference only counts when it starts right after a path separator, a quote, an opening
/// parenthesis or an `=`, so `app.js` is not found inside `myapp.js`. Patterns that already
/// contain parentheses or `=` do not get them added again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixDelimiters {
  chars: Vec<char>,
}

impl PrefixDelimiters {
  /// Derive the delimiter set for one escaped pattern.
  pub fn for_pattern(pattern: &str) -> Self {
    let mut chars = vec!['/', '\\', '\'', '"'];
    if pattern.contains(['\\', '/']) {
      chars.extend(['(', '=']);
    } else {
      if !pattern.contains(['(', ')']) {
        chars.push('(');
      }
      if !pattern.contains('=') {
        chars.push('=');
      }
    }
    Self { chars }
  }

  /// Characters in the set, in insertion order.
  pub fn chars(&self) -> &[char] {
    &self.chars
  }

  /// Render the set as a capturing character class.
  pub fn to_capture_group(&self) -> String {
    let mut group = String::from("([");
    for &ch in &self.chars {
      if matches!(ch, '\\' | ']' | '[' | '^' | '-') {
        group.push('\\');
      }
      group.push(ch);
    }
    group.push_str("])");
    group
  }
}

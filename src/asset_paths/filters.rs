use regex::Regex;

fn unresolvable_uri_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                Regex::new(r"(?i)^(mailto|tel|javascript):").expect("invalid pseudo-scheme regex"),
                Regex::new(r"^#").expect("invalid fragment regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a URI reference can be skipped without probing the filesystem.
///
/// External URLs, data URIs and in-page fragments never name a file below the base
/// directory, so resolving them would only cost a failed existence check.
pub fn should_skip_uri(value: &str) -> bool {
    value.trim().is_empty()
        || unresolvable_uri_patterns()
            .iter()
            .any(|pattern| pattern.is_match(value))
}

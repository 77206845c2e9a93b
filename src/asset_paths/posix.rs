/// Characters escaped by [`escape_path_pattern`].
const PATTERN_META: &[char] = &[
    '-', '[', ']', '{', '}', '(', ')', '*', '+', '?', '.', '^', '$', '|', '/', '\\',
];

/// Final segment of a `/`-separated path, ignoring trailing slashes.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "";
    }
    match trimmed.rfind('/') {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Parent portion of a `/`-separated path.
///
/// Returns `"."` for bare file names and `"/"` for direct children of the root, mirroring
/// the conventional `dirname` utility.
pub fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(index) => {
            let parent = trimmed[..index].trim_end_matches('/');
            if parent.is_empty() { "/" } else { parent }
        }
        None => ".",
    }
}

/// Extension of the final path segment including its leading dot.
///
/// Dot-files (`.env`) and names without a dot yield an empty string; a trailing dot
/// (`archive.`) yields `"."`.
pub fn extname(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(index) if index > 0 => &name[index..],
        _ => "",
    }
}

/// Terminate a non-empty directory string with a single `/`.
pub fn close_dir_by_sep(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

/// Escape every character that carries meaning inside a pattern or a path separator.
pub fn escape_path_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if PATTERN_META.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

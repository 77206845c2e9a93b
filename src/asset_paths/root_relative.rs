use std::path::{Component, Path, PathBuf};

/// Render a path relative to the base directory as a root-relative URI.
///
/// The generated value always uses forward slashes so that rewritten references work on
/// every platform, regardless of the native directory separator that was used when the
/// files were discovered on disk.
pub fn to_root_relative(relative: &Path) -> String {
    let joined = relative.to_string_lossy().replace('\\', "/");
    format!("/{}", joined.trim_start_matches('/'))
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` never climbs above a root or prefix component; on a relative path that runs out of
/// parents the component is preserved.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

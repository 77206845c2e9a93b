use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::root_relative::normalize_lexically;

/// Generate the filesystem locations a URI reference may point at, in probing order.
///
/// References climbing out with `..` are only meaningful next to the referencing file;
/// references without a leading dot are project-absolute and resolve against the base
/// directory; `./`-style references try the file's directory first and fall back to the
/// base directory.
pub fn generate_uri_candidates(uri: &str, file_dir: &Path, base_dir: &Path) -> Vec<PathBuf> {
    if uri.is_empty() {
        return Vec::new();
    }

    let mut builder = CandidateBuilder::new(uri, file_dir, base_dir);

    if uri.starts_with("..") {
        builder.add_file_relative();
    } else if !uri.starts_with('.') {
        builder.add_base_relative();
    } else {
        builder.add_file_relative();
        builder.add_base_relative();
    }

    builder.finish()
}

struct CandidateBuilder<'a> {
    relative: &'a str,
    file_dir: &'a Path,
    base_dir: &'a Path,
    seen: BTreeSet<PathBuf>,
    result: Vec<PathBuf>,
}

impl<'a> CandidateBuilder<'a> {
    fn new(uri: &'a str, file_dir: &'a Path, base_dir: &'a Path) -> Self {
        Self {
            // `Path::join` would discard the base for a rooted reference.
            relative: uri.trim_start_matches('/'),
            file_dir,
            base_dir,
            seen: BTreeSet::new(),
            result: Vec::new(),
        }
    }

    fn add_file_relative(&mut self) {
        self.push(normalize_lexically(&self.file_dir.join(self.relative)));
    }

    fn add_base_relative(&mut self) {
        self.push(normalize_lexically(&self.base_dir.join(self.relative)));
    }

    fn finish(self) -> Vec<PathBuf> {
        self.result
    }

    fn push(&mut self, candidate: PathBuf) {
        if self.seen.insert(candidate.clone()) {
            self.result.push(candidate);
        }
    }
}

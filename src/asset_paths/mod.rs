//! Helpers for slicing, escaping and resolving asset paths.
//!
//! Manifest keys and revisioned values are always treated as POSIX-style strings, regardless
//! of the host platform, so that a manifest produced on one machine rewrites the same way on
//! every other. Filesystem paths only appear when URI references are resolved against disk.

mod candidates;
mod filters;
mod posix;
mod root_relative;

pub use candidates::generate_uri_candidates;
pub use filters::should_skip_uri;
pub use posix::{basename, close_dir_by_sep, dirname, escape_path_pattern, extname};
pub use root_relative::{normalize_lexically, to_root_relative};

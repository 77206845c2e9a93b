//! Compile the canonical mapping into ordered text substitutions.

mod compiler;
mod delimiter;

pub use compiler::{CompiledPattern, compile_patterns, revisioned_pattern};
pub use delimiter::PrefixDelimiters;

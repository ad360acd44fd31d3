//! Plumbing commands
//!
//! - `hash-object`: compute a file's digest and optionally store its content
//! - `cat-file`: print stored content by digest

pub mod cat_file;
pub mod hash_object;

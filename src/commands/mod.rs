//! Command implementations
//!
//! Commands are `impl Repository` blocks, one per CLI verb, split the same way
//! git splits its own:
//!
//! - `plumbing`: direct access to stored content (hash-object, cat-file)
//! - `porcelain`: version control workflows (add, commit, branch, merge, ...)
//!
//! Commands mutate the loaded state only; persisting it is left to the caller so a
//! failed command never writes anything back.

pub mod plumbing;
pub mod porcelain;

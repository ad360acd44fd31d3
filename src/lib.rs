//! A minimal version control engine
//!
//! Content-addressed storage, a staging area and a commit graph with branches,
//! lowest-common-ancestor search and file-level three-way merge.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;

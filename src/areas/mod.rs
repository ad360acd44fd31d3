//! Core repository components
//!
//! - `database`: content-addressed object store
//! - `index`: staging area for the next commit
//! - `history`: commit graph, branch table and head
//! - `persistence`: loading and saving the three aggregates
//! - `repository`: the context value every command runs against
//! - `workspace`: working-tree listing and synchronisation

pub mod database;
pub mod history;
pub mod index;
pub mod persistence;
pub mod repository;
pub mod workspace;

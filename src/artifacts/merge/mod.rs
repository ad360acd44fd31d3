//! Merge algorithms
//!
//! - `ancestors`: lowest common ancestor search over all parent edges
//! - `reconcile`: three-way file-level reconciliation with conflict detection

pub mod ancestors;
pub mod reconcile;

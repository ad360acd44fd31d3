//! Engine data structures and algorithms
//!
//! - `branch`: validated branch names
//! - `merge`: lowest common ancestor search and three-way reconciliation
//! - `objects`: digests, stored content records and commits

pub mod branch;
pub mod merge;
pub mod objects;

//! Engine value types
//!
//! - **Digest**: content hash used as the key of stored content
//! - **ContentRecord**: the single stored copy behind a digest
//! - **Commit**: immutable snapshot with metadata and parent linkage
//!
//! The hash primitive itself sits behind the `ContentHasher` trait so callers and
//! tests can substitute it.

pub mod commit;
pub mod content_record;
pub mod digest;
pub mod hasher;

/// Length of a SHA-1 hash in hexadecimal format
pub const DIGEST_LENGTH: usize = 40;

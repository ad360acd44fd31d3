//! Stored content record (the "blob")
//!
//! A record ties a digest to the single stored copy of the bytes that produced it.
//! The origin location is informational only: it remembers the working-tree path
//! the content was last ingested from and plays no part in identity.

use crate::artifacts::objects::digest::Digest;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, new)]
pub struct ContentRecord {
    digest: Digest,
    /// Location of the stored copy, relative to the objects directory
    stored_location: PathBuf,
    /// Working-tree path that first produced this content
    origin_location: PathBuf,
}

impl ContentRecord {
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn stored_location(&self) -> &Path {
        &self.stored_location
    }

    pub fn origin_location(&self) -> &Path {
        &self.origin_location
    }
}

// Records with the same digest describe the same content wherever it came from.
impl PartialEq for ContentRecord {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for ContentRecord {}

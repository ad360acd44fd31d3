use crate::artifacts::objects::digest::Digest;
use sha1::{Digest as _, Sha1};

/// Content hash primitive
///
/// Must be deterministic: deduplication in the object store and commit identity
/// both rely on equal input producing an equal digest.
pub trait ContentHasher {
    fn hash(&self, bytes: &[u8]) -> Digest;

    /// Hash several byte slices as if they were concatenated
    fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        self.hash(&parts.concat())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Hasher;

impl ContentHasher for Sha1Hasher {
    fn hash(&self, bytes: &[u8]) -> Digest {
        let mut hasher = Sha1::new();
        hasher.update(bytes);

        let digest = hasher.finalize();
        Digest::from_hash_output(format!("{digest:x}"))
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }

        let digest = hasher.finalize();
        Digest::from_hash_output(format!("{digest:x}"))
    }
}

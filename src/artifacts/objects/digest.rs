//! Content digest (SHA-1 hash)
//!
//! Digests are 40-character hexadecimal strings. They key every stored copy in the
//! object store and every entry of a staging map or commit snapshot.
//!
//! ## Storage
//!
//! Stored copies live in `.twig/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::DIGEST_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content digest
///
/// Two digests compare equal exactly when the hashed bytes were equal (for all
/// practical purposes), which is what makes deduplication sound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Parse and validate a digest from a string
    ///
    /// # Arguments
    ///
    /// * `id` - 40-character hexadecimal string
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.len() != DIGEST_LENGTH {
            anyhow::bail!("Invalid digest length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid digest characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    // sha1 output formatted with `{:x}` is always 40 lowercase hex characters
    pub(crate) fn from_hash_output(hex: String) -> Self {
        Self(hex)
    }

    /// Convert to the relative path of the stored copy
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the digest
    pub fn to_short(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl TryFrom<String> for Digest {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_parse(value)
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.0
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Commit value types
//!
//! A commit is an immutable snapshot of the file-name to digest mapping together
//! with its metadata and parent linkage. Only the commit graph constructs commits;
//! everything else sees them through shared references.
//!
//! ## Identifiers
//!
//! A commit id is the hex SHA-1 of the commit metadata, truncated to a configured
//! width (`CommitIdWidth`). The default keeps 6 characters, which is short enough
//! to type but not collision resistant; the graph re-salts the derivation whenever
//! a truncated id is already taken so an existing commit is never shadowed.
//!
//! Metadata hashed, in order:
//! ```text
//! <timestamp rfc3339>\n
//! <author name> <author email>\n
//! <parent id or empty>\n
//! <second parent id or empty>\n
//! <message>\n
//! <file name> <digest>\n   (one line per snapshot entry, sorted by name)
//! <salt>
//! ```

use crate::artifacts::objects::DIGEST_LENGTH;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::hasher::ContentHasher;
use chrono::{DateTime, FixedOffset};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete tree state of a commit: file name to content digest
pub type Snapshot = BTreeMap<String, Digest>;

/// Number of hex characters kept from the commit digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct CommitIdWidth(usize);

impl CommitIdWidth {
    pub const MIN: usize = 6;
    pub const FULL: CommitIdWidth = CommitIdWidth(DIGEST_LENGTH);

    pub fn try_new(width: usize) -> anyhow::Result<Self> {
        if !(Self::MIN..=DIGEST_LENGTH).contains(&width) {
            anyhow::bail!(
                "commit id width must be between {} and {}, got {}",
                Self::MIN,
                DIGEST_LENGTH,
                width
            );
        }
        Ok(Self(width))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for CommitIdWidth {
    fn default() -> Self {
        CommitIdWidth(Self::MIN)
    }
}

impl TryFrom<usize> for CommitIdWidth {
    type Error = anyhow::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<CommitIdWidth> for usize {
    fn from(value: CommitIdWidth) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Parse a full commit id as typed by a user or read back from storage
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.is_empty() || id.len() > DIGEST_LENGTH {
            anyhow::bail!("Invalid commit id length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid commit id characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    fn truncate(digest: &Digest, width: CommitIdWidth) -> Self {
        Self(digest.as_ref()[..width.get()].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, at most 7 characters
    pub fn to_short(&self) -> &str {
        &self.0[..self.0.len().min(7)]
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_parse(value)
    }
}

impl From<CommitId> for String {
    fn from(value: CommitId) -> Self {
        value.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Format author name and email for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// Who made a commit and when
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Signature {
    pub author: Author,
    pub timestamp: DateTime<FixedOffset>,
}

impl Signature {
    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        readable_timestamp(&self.timestamp)
    }
}

fn readable_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    id: CommitId,
    timestamp: DateTime<FixedOffset>,
    message: String,
    author: Author,
    parent: Option<CommitId>,
    second_parent: Option<CommitId>,
    files: Snapshot,
    /// Longest parent-edge distance from the root commit
    generation: u32,
    /// Derived back-references, rebuilt from parent pointers after loading
    #[serde(skip)]
    children: Vec<CommitId>,
}

/// Everything about a commit except its identity
#[derive(Debug, Clone)]
pub(crate) struct CommitDraft {
    pub signature: Signature,
    pub message: String,
    pub parent: Option<CommitId>,
    pub second_parent: Option<CommitId>,
    pub files: Snapshot,
    pub generation: u32,
}

impl CommitDraft {
    /// Derive the truncated id for this draft with the given salt
    pub fn derive_id(
        &self,
        hasher: &dyn ContentHasher,
        width: CommitIdWidth,
        salt: u32,
    ) -> CommitId {
        let mut metadata = format!(
            "{}\n{} {}\n{}\n{}\n{}\n",
            self.signature.timestamp.to_rfc3339(),
            self.signature.author.name(),
            self.signature.author.email(),
            self.parent.as_ref().map(CommitId::as_ref).unwrap_or_default(),
            self.second_parent
                .as_ref()
                .map(CommitId::as_ref)
                .unwrap_or_default(),
            self.message,
        );
        for (name, digest) in &self.files {
            metadata.push_str(&format!("{name} {digest}\n"));
        }
        let salt = salt.to_string();

        let digest = hasher.hash_parts(&[metadata.as_bytes(), salt.as_bytes()]);
        CommitId::truncate(&digest, width)
    }

    pub fn into_commit(self, id: CommitId) -> Commit {
        Commit {
            id,
            timestamp: self.signature.timestamp,
            message: self.message,
            author: self.signature.author,
            parent: self.parent,
            second_parent: self.second_parent,
            files: self.files,
            generation: self.generation,
            children: Vec::new(),
        }
    }
}

impl Commit {
    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn readable_timestamp(&self) -> String {
        readable_timestamp(&self.timestamp)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn parent(&self) -> Option<&CommitId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&CommitId> {
        self.second_parent.as_ref()
    }

    /// All parent ids, first parent first
    pub fn parents(&self) -> impl Iterator<Item = &CommitId> {
        self.parent.iter().chain(self.second_parent.iter())
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    pub fn files(&self) -> &Snapshot {
        &self.files
    }

    pub fn digest_of(&self, file_name: &str) -> Option<&Digest> {
        self.files.get(file_name)
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn children(&self) -> &[CommitId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: CommitId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }
}

// Identity is the id alone; children are a derived index and never compared.
impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

//! Content-addressed object store
//!
//! Maps each digest to exactly one stored copy of the content that produced it.
//! Stored copies are zlib-compressed and laid out as `<objects>/<2 hex>/<38 hex>`.
//!
//! The store performs no reference counting: `remove` deletes whatever it is
//! asked to, and callers must make sure no commit still needs the digest.

use crate::artifacts::objects::content_record::ContentRecord;
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::hasher::ContentHasher;
use crate::errors::{EngineError, EngineResult};
use bytes::Bytes;
use fake::rand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ObjectStore {
    /// Directory holding the stored copies; supplied by the owner on load
    #[serde(skip)]
    path: PathBuf,
    records: BTreeMap<Digest, ContentRecord>,
}

impl ObjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ObjectStore {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_objects_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Store every item whose digest is not yet known
    ///
    /// Each item is the content bytes plus the working-tree location it came from.
    /// Returns the digest of every item, in input order, whether it was newly
    /// stored or deduplicated.
    pub fn ingest<I>(&mut self, hasher: &dyn ContentHasher, contents: I) -> EngineResult<Vec<Digest>>
    where
        I: IntoIterator<Item = (Bytes, PathBuf)>,
    {
        contents
            .into_iter()
            .map(|(content, origin)| self.ingest_one(hasher, content, origin))
            .collect()
    }

    fn ingest_one(
        &mut self,
        hasher: &dyn ContentHasher,
        content: Bytes,
        origin: PathBuf,
    ) -> EngineResult<Digest> {
        let digest = hasher.hash(&content);

        if self.records.contains_key(&digest) {
            debug!(digest = %digest, origin = %origin.display(), "content already stored");
            return Ok(digest);
        }

        let stored_location = digest.to_path();
        let object_path = self.path.join(&stored_location);

        // a copy may survive from an operation whose state was never saved
        if !object_path.exists() {
            self.write_object(&object_path, &content)?;
        }

        info!(digest = %digest, origin = %origin.display(), "stored new content");
        self.records.insert(
            digest.clone(),
            ContentRecord::new(digest.clone(), stored_location, origin),
        );

        Ok(digest)
    }

    pub fn lookup(&self, digest: &Digest) -> EngineResult<&ContentRecord> {
        self.records
            .get(digest)
            .ok_or_else(|| EngineError::ContentNotFound(digest.clone()))
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.records.contains_key(digest)
    }

    /// Load the stored bytes for a digest
    pub fn read(&self, digest: &Digest) -> EngineResult<Bytes> {
        let record = self.lookup(digest)?;
        self.read_object(&self.path.join(record.stored_location()))
    }

    /// Delete the stored copy and its record
    pub fn remove(&mut self, digest: &Digest) -> EngineResult<ContentRecord> {
        let record = self.lookup(digest)?;
        let object_path = self.path.join(record.stored_location());

        match std::fs::remove_file(&object_path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %object_path.display(), "stored copy already gone");
            }
            Err(err) => return Err(EngineError::storage(object_path, err)),
        }

        info!(digest = %digest, "removed stored content");
        self.records
            .remove(digest)
            .ok_or_else(|| EngineError::ContentNotFound(digest.clone()))
    }

    pub fn records(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn read_object(&self, object_path: &Path) -> EngineResult<Bytes> {
        let object_content =
            std::fs::read(object_path).map_err(|err| EngineError::storage(object_path, err))?;

        Self::decompress(&object_content).map_err(|err| EngineError::storage(object_path, err))
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> EngineResult<()> {
        let object_dir = object_path.parent().unwrap_or(&self.path);
        std::fs::create_dir_all(object_dir).map_err(|err| EngineError::storage(object_dir, err))?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let object_content =
            Self::compress(content).map_err(|err| EngineError::storage(object_path, err))?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .map_err(|err| EngineError::storage(&temp_object_path, err))?;

        file.write_all(&object_content)
            .map_err(|err| EngineError::storage(&temp_object_path, err))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path)
            .map_err(|err| EngineError::storage(object_path, err))
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

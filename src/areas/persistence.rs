//! Persisted engine state
//!
//! The three aggregates are saved as separate JSON documents under the metadata
//! directory:
//!
//! - `objects.json`: ObjectStore records (stored copies live under `objects/`)
//! - `stage.json`: StagingArea
//! - `history.json`: CommitGraph (commits, branch table, head)
//!
//! ## Locking
//!
//! Each document read holds a shared lock and each write an exclusive lock on that
//! one file, for the duration of that one access. Whole operations are not
//! serialized, so two processes mutating the same repository can still interleave.

use crate::areas::database::ObjectStore;
use crate::areas::history::CommitGraph;
use crate::areas::index::StagingArea;
use crate::artifacts::objects::commit::CommitIdWidth;
use anyhow::Context;
use file_guard::Lock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;

const OBJECTS_DOCUMENT: &str = "objects.json";
const STAGE_DOCUMENT: &str = "stage.json";
const HISTORY_DOCUMENT: &str = "history.json";
const OBJECTS_DIR: &str = "objects";

/// Everything a command loads, mutates and saves back
#[derive(Debug, Default)]
pub struct EngineState {
    pub objects: ObjectStore,
    pub staging: StagingArea,
    pub history: CommitGraph,
}

pub trait Persistence {
    /// Load all aggregates; missing documents load as empty aggregates
    fn load_all(&self) -> anyhow::Result<EngineState>;

    fn save_all(&self, state: &EngineState) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct JsonPersistence {
    /// Metadata directory, typically `<root>/.twig`
    path: Box<Path>,
    id_width: CommitIdWidth,
}

impl JsonPersistence {
    pub fn new(path: Box<Path>, id_width: CommitIdWidth) -> Self {
        JsonPersistence { path, id_width }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn objects_path(&self) -> PathBuf {
        self.path.join(OBJECTS_DIR)
    }

    /// Empty state wired to this repository's object directory
    pub fn empty_state(&self) -> EngineState {
        EngineState {
            objects: ObjectStore::new(self.objects_path()),
            staging: StagingArea::new(),
            history: CommitGraph::with_id_width(self.id_width),
        }
    }

    fn read_document<T>(&self, name: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let document_path = self.path.join(name);
        if !document_path.exists() {
            return Ok(None);
        }

        let mut document_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&document_path)
            .with_context(|| format!("failed to open {:?}", document_path))?;
        let mut lock = file_guard::lock(&mut document_file, Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut()
            .read_to_string(&mut content)
            .with_context(|| format!("failed to read {:?}", document_path))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        debug!(document = name, bytes = content.len(), "loaded");
        let document = serde_json::from_str(&content)
            .with_context(|| format!("corrupt document {:?}", document_path))?;

        Ok(Some(document))
    }

    fn write_document<T>(&self, name: &str, document: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let document_path = self.path.join(name);
        let content = serde_json::to_string_pretty(document)
            .with_context(|| format!("failed to serialize {name}"))?;

        let mut document_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&document_path)
            .with_context(|| format!("failed to open {:?}", document_path))?;
        let mut lock = file_guard::lock(&mut document_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut()
            .write_all(content.as_bytes())
            .with_context(|| format!("failed to write {:?}", document_path))?;

        debug!(document = name, bytes = content.len(), "saved");

        Ok(())
    }
}

impl Persistence for JsonPersistence {
    fn load_all(&self) -> anyhow::Result<EngineState> {
        let mut state = self.empty_state();

        if let Some(mut objects) = self.read_document::<ObjectStore>(OBJECTS_DOCUMENT)? {
            objects.set_objects_path(self.objects_path());
            state.objects = objects;
        }
        if let Some(staging) = self.read_document::<StagingArea>(STAGE_DOCUMENT)? {
            state.staging = staging;
        }
        if let Some(mut history) = self.read_document::<CommitGraph>(HISTORY_DOCUMENT)? {
            history.set_id_width(self.id_width);
            history.rebuild_children();
            history
                .verify()
                .with_context(|| format!("inconsistent {HISTORY_DOCUMENT}"))?;
            state.history = history;
        }

        Ok(state)
    }

    fn save_all(&self, state: &EngineState) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("failed to create {:?}", self.path))?;

        self.write_document(OBJECTS_DOCUMENT, &state.objects)?;
        self.write_document(STAGE_DOCUMENT, &state.staging)?;
        self.write_document(HISTORY_DOCUMENT, &state.history)?;

        Ok(())
    }
}

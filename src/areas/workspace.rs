use crate::areas::database::ObjectStore;
use crate::artifacts::objects::commit::Snapshot;
use crate::errors::{EngineError, EngineResult};
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const METADATA_DIR: &str = ".twig";

const IGNORED_PATHS: [&str; 3] = [METADATA_DIR, ".", ".."];

/// Rewrites working-tree files to match a commit snapshot
pub trait WorkingTreeSync {
    /// Overwrite every file named by `snapshot` with its stored content
    ///
    /// Files the snapshot does not name are left untouched.
    fn sync_to(&self, snapshot: &Snapshot, objects: &ObjectStore) -> EngineResult<()>;
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Regular files under `root_file_path` (the whole tree if `None`), relative to the workspace
    pub fn list_files(&self, root_file_path: Option<&Path>) -> EngineResult<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root_file_path.exists() {
            return Err(EngineError::storage(
                &root_file_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
            ));
        }

        let mut files = WalkDir::new(&root_file_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| self.check_if_not_ignored_file_path(entry.path()))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                let name_str = name.to_string_lossy();
                IGNORED_PATHS.contains(&name_str.as_ref())
            } else {
                false
            }
        })
    }

    fn check_if_not_ignored_file_path(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;

        if path.is_file() && !Self::is_ignored(relative) {
            Some(relative.to_path_buf())
        } else {
            None
        }
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> EngineResult<Bytes> {
        let file_path = self.path.join(file_path);

        std::fs::read(&file_path)
            .map(Bytes::from)
            .map_err(|err| EngineError::storage(file_path, err))
    }

    /// Snapshot key for a workspace-relative path, always `/`-separated
    pub fn file_name(file_path: &Path) -> String {
        file_path
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn write_file(&self, file_name: &str, content: &[u8]) -> EngineResult<()> {
        let file_path = self.path.join(file_name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| EngineError::storage(parent, err))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .map_err(|err| EngineError::storage(&file_path, err))?;

        file.write_all(content)
            .map_err(|err| EngineError::storage(&file_path, err))
    }
}

impl WorkingTreeSync for Workspace {
    fn sync_to(&self, snapshot: &Snapshot, objects: &ObjectStore) -> EngineResult<()> {
        for (file_name, digest) in snapshot {
            let content = objects.read(digest)?;
            self.write_file(file_name, &content)?;
            debug!(file = %file_name, digest = %digest.to_short(), "restored");
        }

        Ok(())
    }
}

use crate::areas::persistence::{EngineState, JsonPersistence, Persistence};
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::objects::hasher::{ContentHasher, Sha1Hasher};
use crate::config::Config;
use anyhow::Context;
use std::cell::{Ref, RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Everything a command needs, threaded explicitly instead of through globals
///
/// The state is loaded once when the repository is opened and written back only
/// by `save`, which callers invoke after a command succeeded.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    config: Config,
    hasher: Box<dyn ContentHasher>,
    persistence: Box<dyn Persistence>,
    workspace: Workspace,
    state: RefCell<EngineState>,
}

impl Repository {
    /// Set up a repository context rooted at `path` without loading any state
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create {:?}", path))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {:?}", path))?;

        let metadata_path = path.join(METADATA_DIR);
        let config = Config::load(&metadata_path)?;
        let persistence = JsonPersistence::new(
            metadata_path.into_boxed_path(),
            config.commit.id_width,
        );
        let state = persistence.empty_state();

        Ok(Repository {
            workspace: Workspace::new(path.clone().into_boxed_path()),
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            config,
            hasher: Box::new(Sha1Hasher),
            persistence: Box::new(persistence),
            state: RefCell::new(state),
        })
    }

    /// Open an initialized repository and load its state
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Self::new(path, writer)?;
        if !repository.is_initialized() {
            anyhow::bail!("Not in an initialized twig directory.");
        }

        repository.load()?;

        Ok(repository)
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata_path().is_dir()
    }

    pub fn load(&self) -> anyhow::Result<()> {
        *self.state.borrow_mut() = self.persistence.load_all()?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.persistence.save_all(&self.state.borrow())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hasher(&self) -> &dyn ContentHasher {
        self.hasher.as_ref()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn state(&self) -> Ref<'_, EngineState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, EngineState> {
        self.state.borrow_mut()
    }

    /// Workspace-relative path for a command-line argument
    pub fn relative_path(&self, arg: &str) -> anyhow::Result<PathBuf> {
        let candidate = Path::new(arg);
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            std::env::current_dir()?.join(candidate)
        };
        let absolute = absolute
            .canonicalize()
            .with_context(|| format!("No file with that name exists: {arg}"))?;

        absolute
            .strip_prefix(&self.path)
            .map(Path::to_path_buf)
            .with_context(|| format!("{arg} is outside the repository at {:?}", self.path))
    }
}

use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Snapshot;
use anyhow::Context;
use std::fs;
use std::io::Write;

pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            anyhow::bail!("A twig version-control system already exists in the current directory.");
        }

        let objects_path = self.state().objects.objects_path().to_path_buf();
        fs::create_dir_all(&objects_path)
            .with_context(|| format!("Failed to create {:?}", objects_path))?;

        let signature = self.config().signature();
        let root_id = self
            .state_mut()
            .history
            .commit(self.hasher(), signature, INITIAL_COMMIT_MESSAGE, Snapshot::new())?
            .id()
            .clone();

        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.metadata_path().display()
        )?;
        writeln!(self.writer(), "[{} (root-commit)] {}", root_id, INITIAL_COMMIT_MESSAGE)?;

        Ok(())
    }
}
